//! OData Client module
//!
//! Default HTTP implementation of [`EntityClient`] for OData v2 services.
//! Request bodies use the configured payload format; responses are always
//! requested and parsed as JSON.

use super::constants::{headers, APPLICATION_JSON};
use super::consumer::{EntityClient, EntityStream, PendingOperation};
use super::error::ODataError;
use super::format::{render_payload, FormatType, ODataVersion};
use super::json::{parse_entity_response, parse_feed, EntityPage};
use super::query::QueryRequest;
use crate::config::RuntimeConfig;
use crate::edm::OEntity;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Position in a paged feed
enum Cursor {
    Start,
    Next(String),
}

/// reqwest-backed entity client
#[derive(Debug, Clone)]
pub struct HttpEntityClient {
    endpoint: String,
    http_client: Client,
    format: FormatType,
    version: ODataVersion,
    extra_headers: Vec<(String, String)>,
}

impl HttpEntityClient {
    /// Create a new OData client
    ///
    /// # Arguments
    /// * `endpoint` - Service root URL (e.g., "https://host/service.svc/")
    /// * `format` - Payload format for request bodies
    /// * `version` - Protocol version sent in the version headers
    /// * `timeout` - Per-request timeout
    pub fn new(
        endpoint: impl Into<String>,
        format: FormatType,
        version: ODataVersion,
        timeout: Duration,
    ) -> Result<Self, ODataError> {
        let endpoint = endpoint.into();
        // Ensure endpoint ends with /
        let endpoint = if endpoint.ends_with('/') {
            endpoint
        } else {
            format!("{}/", endpoint)
        };

        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            endpoint,
            http_client,
            format,
            version,
            extra_headers: Vec::new(),
        })
    }

    /// Build a client from validated configuration
    pub fn from_runtime(config: &RuntimeConfig) -> Result<Self, ODataError> {
        let client = Self::new(
            config.service_uri.clone(),
            config.format,
            config.version,
            config.timeout,
        )?;
        Ok(client.with_headers(
            config
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        ))
    }

    /// Headers added to every request
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// Get endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn format(&self) -> FormatType {
        self.format
    }

    pub fn version(&self) -> ODataVersion {
        self.version
    }

    /// Absolute URL for a resource path or a server-provided link
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.endpoint, path.trim_start_matches('/'))
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, url)
            .header(headers::ACCEPT, APPLICATION_JSON)
            .header(headers::DATA_SERVICE_VERSION, self.version.as_str())
            .header(headers::MAX_DATA_SERVICE_VERSION, self.version.as_str());

        for (name, value) in &self.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn body_request(
        &self,
        method: Method,
        operation: &PendingOperation,
    ) -> Result<RequestBuilder, ODataError> {
        let url = self.url(&operation.resource_path());
        let body = render_payload(operation, self.format, self.version)?;

        tracing::debug!(
            "{} {} ({} properties)",
            method,
            url,
            operation.property_list().len()
        );

        Ok(self
            .request(method, &url)
            .header(headers::CONTENT_TYPE, self.format.content_type())
            .body(body))
    }

    /// Map non-success statuses to errors
    async fn check_status(response: Response) -> Result<Response, ODataError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                Err(ODataError::NotFound(body))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ODataError::ServerError(status.as_u16(), body))
            }
        }
    }

    /// Fetch one page of a query
    ///
    /// # Arguments
    /// * `request` - Query against an entity set
    /// * `next_link` - Optional next page URL from previous response
    pub async fn fetch_entity_page(
        &self,
        request: &QueryRequest,
        next_link: Option<&str>,
    ) -> Result<EntityPage, ODataError> {
        let url = match next_link {
            Some(link) => self.url(link),
            None => self.url(&request.to_path()),
        };

        tracing::debug!("Fetching: {}", url);

        let response = self.request(Method::GET, &url).send().await?;
        let response = Self::check_status(response).await?;

        let body: Value = response.json().await.map_err(|e| {
            ODataError::ParseError(format!("Failed to parse OData response: {}", e))
        })?;
        let mut page = parse_feed(&body)?;
        for entity in &mut page.entities {
            entity.entity_set = Some(request.entity_set().to_string());
        }

        tracing::debug!(
            "Fetched {} records, next_link: {:?}",
            page.entities.len(),
            page.next_link.is_some()
        );

        Ok(page)
    }
}

#[async_trait]
impl EntityClient for HttpEntityClient {
    async fn create_entity(&self, operation: PendingOperation) -> Result<OEntity, ODataError> {
        let response = self
            .body_request(Method::POST, &operation)?
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        let mut entity = if text.trim().is_empty() {
            // 204 or empty 201: echo what was sent
            OEntity::new(operation.property_list().to_vec())
        } else {
            let body: Value = serde_json::from_str(&text).map_err(|e| {
                ODataError::ParseError(format!("Failed to parse created entity: {}", e))
            })?;
            parse_entity_response(&body)?
        };
        entity.entity_set = Some(operation.entity_set().to_string());

        tracing::info!("Created entity in {}", operation.entity_set());
        Ok(entity)
    }

    async fn merge_entity(&self, operation: PendingOperation) -> Result<(), ODataError> {
        let response = self
            .body_request(Method::POST, &operation)?
            .header(headers::X_HTTP_METHOD, "MERGE")
            .send()
            .await?;
        Self::check_status(response).await?;

        tracing::info!("Updated {}", operation.resource_path());
        Ok(())
    }

    async fn delete_entity(&self, operation: PendingOperation) -> Result<(), ODataError> {
        let url = self.url(&operation.resource_path());
        tracing::debug!("DELETE {}", url);

        let response = self.request(Method::DELETE, &url).send().await?;
        Self::check_status(response).await?;

        tracing::info!("Deleted {}", operation.resource_path());
        Ok(())
    }

    fn query_entities(&self, request: QueryRequest) -> EntityStream<'_> {
        stream::try_unfold(Some(Cursor::Start), move |cursor| {
            let request = request.clone();
            async move {
                let next_link = match cursor {
                    None => return Ok::<_, ODataError>(None),
                    Some(Cursor::Start) => None,
                    Some(Cursor::Next(link)) => Some(link),
                };

                let page = self
                    .fetch_entity_page(&request, next_link.as_deref())
                    .await?;
                let cursor = page.next_link.map(Cursor::Next);
                let entities = stream::iter(page.entities.into_iter().map(Ok));
                Ok(Some((entities, cursor)))
            }
        })
        .try_flatten()
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{OEntityKey, OProperty, SimpleValue};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Requests = Arc<Mutex<Vec<String>>>;

    fn response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answer one connection per canned response, in order, recording each request
    async fn serve(responses: Vec<String>) -> (HttpEntityClient, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/svc.svc", listener.local_addr().unwrap());
        let requests: Requests = Arc::default();
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            for canned in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                recorded.lock().unwrap().push(request);
                socket.write_all(canned.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        (client(&endpoint), requests)
    }

    fn recorded(requests: &Requests) -> Vec<String> {
        requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.to_lowercase())
            .collect()
    }

    fn widget_create() -> PendingOperation {
        PendingOperation::create("Widgets").properties(vec![
            OProperty::simple("Name", SimpleValue::String("Widget".into())),
            OProperty::simple("Price", SimpleValue::Double(9.99)),
        ])
    }

    fn client(endpoint: &str) -> HttpEntityClient {
        HttpEntityClient::new(
            endpoint,
            FormatType::Json,
            ODataVersion::V2,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_normalized() {
        assert_eq!(
            client("https://example.com/svc.svc").endpoint(),
            "https://example.com/svc.svc/"
        );
        assert_eq!(
            client("https://example.com/svc.svc/").endpoint(),
            "https://example.com/svc.svc/"
        );
    }

    #[test]
    fn test_url_building() {
        let client = client("https://example.com/svc.svc");
        assert_eq!(
            client.url("Widgets(1)"),
            "https://example.com/svc.svc/Widgets(1)"
        );
        assert_eq!(
            client.url("/Widgets"),
            "https://example.com/svc.svc/Widgets"
        );
        assert_eq!(
            client.url("https://other.example.com/Widgets?$skiptoken=5"),
            "https://other.example.com/Widgets?$skiptoken=5"
        );
    }

    #[test]
    fn test_from_runtime_carries_settings() {
        let runtime = RuntimeConfig {
            service_uri: "https://example.com/svc.svc/".to_string(),
            format: FormatType::Atom,
            version: ODataVersion::V1,
            headers: [("sap-client".to_string(), "100".to_string())]
                .into_iter()
                .collect(),
            ..RuntimeConfig::default()
        };

        let client = HttpEntityClient::from_runtime(&runtime).unwrap();
        assert_eq!(client.format(), FormatType::Atom);
        assert_eq!(client.version(), ODataVersion::V1);
        assert_eq!(client.extra_headers.len(), 1);
    }

    #[tokio::test]
    async fn test_create_parses_returned_entity() {
        let body = r#"{"d":{"__metadata":{"type":"Shop.Widget"},"Id":5,"Name":"Widget"}}"#;
        let (client, requests) = serve(vec![response("201 Created", body)]).await;

        let entity = client.create_entity(widget_create()).await.unwrap();
        assert_eq!(entity.entity_set.as_deref(), Some("Widgets"));
        assert_eq!(
            entity.property("Id").and_then(|p| p.as_simple()),
            Some(&SimpleValue::Int32(5))
        );

        let requests = recorded(&requests);
        assert!(requests[0].starts_with("post /svc.svc/widgets "));
        assert!(requests[0].contains("dataserviceversion: 2.0"));
        assert!(requests[0].contains("maxdataserviceversion: 2.0"));
        assert!(requests[0].contains("\"name\":\"widget\""));
    }

    #[tokio::test]
    async fn test_create_with_empty_body_echoes_sent_properties() {
        let (client, _) = serve(vec![
            response("204 No Content", ""),
            response("201 Created", ""),
        ])
        .await;

        for _ in 0..2 {
            let entity = client.create_entity(widget_create()).await.unwrap();
            assert_eq!(entity.properties, widget_create().property_list().to_vec());
            assert_eq!(entity.entity_set.as_deref(), Some("Widgets"));
        }
    }

    #[tokio::test]
    async fn test_merge_tunnels_through_post() {
        let (client, requests) = serve(vec![response("204 No Content", "")]).await;

        let operation = PendingOperation::merge("Widgets", OEntityKey::new(SimpleValue::Int32(7)))
            .properties(vec![OProperty::simple("Price", SimpleValue::Double(1.5))]);
        client.merge_entity(operation).await.unwrap();

        let requests = recorded(&requests);
        assert!(requests[0].starts_with("post /svc.svc/widgets(7) "));
        assert!(requests[0].contains("x-http-method: merge"));
        assert!(requests[0].contains("dataserviceversion: 2.0"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (client, requests) = serve(vec![
            response("404 Not Found", "no such widget"),
            response("500 Internal Server Error", "boom"),
        ])
        .await;
        let key = || OEntityKey::new(SimpleValue::Int32(7));

        match client.delete_entity(PendingOperation::delete("Widgets", key())).await {
            Err(ODataError::NotFound(body)) => assert_eq!(body, "no such widget"),
            other => panic!("unexpected {:?}", other),
        }
        match client.delete_entity(PendingOperation::delete("Widgets", key())).await {
            Err(ODataError::ServerError(status, body)) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(recorded(&requests)[0].starts_with("delete /svc.svc/widgets(7) "));
    }

    #[tokio::test]
    async fn test_query_follows_next_links() {
        let first = r#"{"d":{"results":[{"Id":1},{"Id":2}],"__next":"Widgets?$skiptoken=2"}}"#;
        let second = r#"{"d":{"results":[{"Id":3}]}}"#;
        let (client, requests) = serve(vec![
            response("200 OK", first),
            response("200 OK", second),
        ])
        .await;

        let entities: Vec<OEntity> = client
            .query_entities(QueryRequest::new("Widgets").top(3))
            .try_collect()
            .await
            .unwrap();

        let ids: Vec<_> = entities
            .iter()
            .filter_map(|e| e.property("Id").and_then(|p| p.as_simple()).cloned())
            .collect();
        assert_eq!(
            ids,
            vec![SimpleValue::Int32(1), SimpleValue::Int32(2), SimpleValue::Int32(3)]
        );
        assert!(entities
            .iter()
            .all(|e| e.entity_set.as_deref() == Some("Widgets")));

        let requests = recorded(&requests);
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("get /svc.svc/widgets?$top=3 "));
        assert!(requests[1].starts_with("get /svc.svc/widgets?$skiptoken=2 "));
        assert!(requests[1].contains("accept: application/json"));
    }
}
