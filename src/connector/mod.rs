//! Entity operation façade
//!
//! Combines set name resolution, key extraction and property mapping, then
//! dispatches through an [`EntityClient`]. Bulk operations run sequentially
//! and stop at the first failure.

pub mod error;

pub use error::{ConnectorError, KeyError};

use crate::config::{Config, RuntimeConfig};
use crate::edm::{OEntity, OEntityKey};
use crate::mapping::{
    classify, AccessError, Classified, Describable, HostObject, PropertyMapper,
};
use crate::naming::NamingPolicy;
use crate::odata::{EntityClient, HttpEntityClient, PendingOperation, QueryOptions, QueryRequest};
use futures::TryStreamExt;

const SET_SUFFIX: &str = "Set";

/// Connector bound to one service
pub struct ODataConnector<C = HttpEntityClient> {
    config: RuntimeConfig,
    client: C,
    naming: Box<dyn NamingPolicy>,
}

impl ODataConnector<HttpEntityClient> {
    /// Open a connection using the default HTTP client
    pub fn connect(config: RuntimeConfig) -> Result<Self, ConnectorError> {
        let client = HttpEntityClient::from_runtime(&config)?;
        tracing::info!("Connected to {}", config.service_uri);
        Ok(Self::with_client(config, client))
    }

    /// Validate a raw config and connect
    pub fn from_config(config: &Config) -> Result<Self, ConnectorError> {
        Self::connect(config.to_runtime()?)
    }
}

impl<C: EntityClient> ODataConnector<C> {
    /// Build a connector around an existing client
    pub fn with_client(config: RuntimeConfig, client: C) -> Self {
        let naming = Box::new(config.naming_format);
        Self {
            config,
            client,
            naming,
        }
    }

    /// Replace the configured naming format with a custom policy
    pub fn with_naming(mut self, naming: impl NamingPolicy + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    /// Identifies this connection; the service root URI
    pub fn connection_identifier(&self) -> &str {
        &self.config.service_uri
    }

    pub fn disconnect(self) {
        tracing::info!("Disconnected from {}", self.config.service_uri);
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn mapper(&self) -> PropertyMapper<'_> {
        PropertyMapper::new(self.naming.as_ref()).with_max_depth(self.config.max_depth)
    }

    /// Explicit non-blank set name, else `{TypeName}Set`
    pub fn resolve_set_name(
        &self,
        object: &dyn HostObject,
        set_name: Option<&str>,
    ) -> Result<String, ConnectorError> {
        default_set_name(object.type_name(), set_name)
    }

    /// Read the key attribute of an object.
    ///
    /// The attribute is looked up by the given name first and then by its
    /// host translation, so both `id` and `Id` find an `id` attribute.
    pub fn extract_key(
        &self,
        object: &dyn HostObject,
        key_attribute: &str,
    ) -> Result<OEntityKey, ConnectorError> {
        if key_attribute.trim().is_empty() {
            return Err(ConnectorError::argument("key attribute name is blank"));
        }

        let type_name = object.type_name();
        let key_error = |attribute: &str| (attribute.to_string(), type_name.to_string());

        let value = match object.read_attribute(key_attribute) {
            Err(AccessError::NoSuchAttribute(_)) => {
                let host_name = self.naming.to_host(key_attribute);
                object.read_attribute(&host_name)
            }
            other => other,
        };

        let value = value.map_err(|source| {
            let (attribute, type_name) = key_error(key_attribute);
            match source {
                AccessError::NoSuchAttribute(_) => KeyError::Missing {
                    attribute,
                    type_name,
                },
                source => KeyError::Unreadable {
                    attribute,
                    type_name,
                    source,
                },
            }
        })?;

        match classify(value) {
            Classified::Simple(simple) => Ok(OEntityKey::new(simple)),
            Classified::Null => {
                let (attribute, type_name) = key_error(key_attribute);
                Err(KeyError::Null {
                    attribute,
                    type_name,
                }
                .into())
            }
            Classified::Complex(_) | Classified::Collection(_) => {
                let (attribute, type_name) = key_error(key_attribute);
                Err(KeyError::NotSimple {
                    attribute,
                    type_name,
                }
                .into())
            }
        }
    }

    /// Query an entity set and materialize every result as a `T`.
    ///
    /// The set defaults to `{TYPE_NAME}Set`. Only options that are set are
    /// sent.
    pub async fn get_as_objects<T: Describable>(
        &self,
        set_name: Option<&str>,
        options: QueryOptions,
    ) -> Result<Vec<T>, ConnectorError> {
        let set_name = default_set_name(T::TYPE_NAME, set_name)?;
        let request = build_request(&set_name, options);
        tracing::debug!("Querying {}", request.to_path());

        let mapper = self.mapper();
        let mut entities = self.client.query_entities(request);
        let mut objects = Vec::new();

        while let Some(entity) = entities.try_next().await? {
            objects.push(mapper.map_from_wire::<T>(entity.properties)?);
        }

        tracing::info!("Fetched {} {} objects from {}", objects.len(), T::TYPE_NAME, set_name);
        Ok(objects)
    }

    /// Create one entity and return it as confirmed by the service
    pub async fn create_from_object(
        &self,
        object: &dyn HostObject,
        set_name: Option<&str>,
    ) -> Result<OEntity, ConnectorError> {
        let set_name = self.resolve_set_name(object, set_name)?;
        self.create_in(object, &set_name).await
    }

    /// Create entities in input order.
    ///
    /// The set name is resolved once, from the first object. An empty input
    /// returns an empty list without resolving anything.
    pub async fn create_from_objects_list<T: HostObject>(
        &self,
        objects: &[T],
        set_name: Option<&str>,
    ) -> Result<Vec<OEntity>, ConnectorError> {
        let Some(first) = objects.first() else {
            return Ok(Vec::new());
        };

        let set_name = self.resolve_set_name(first, set_name)?;
        let mut created = Vec::with_capacity(objects.len());
        for object in objects {
            created.push(self.create_in(object, &set_name).await?);
        }

        tracing::info!("Created {} entities in {}", created.len(), set_name);
        Ok(created)
    }

    /// Merge the object's properties into the entity identified by its key
    pub async fn update_from_object(
        &self,
        object: &dyn HostObject,
        set_name: Option<&str>,
        key_attribute: &str,
    ) -> Result<(), ConnectorError> {
        let set_name = self.resolve_set_name(object, set_name)?;
        let key = self.extract_key(object, key_attribute)?;
        let properties = self.mapper().map_to_wire(object)?;

        let operation = PendingOperation::merge(set_name, key).properties(properties);
        self.client.merge_entity(operation).await?;
        Ok(())
    }

    /// Update each object in turn
    pub async fn update_from_objects<T: HostObject>(
        &self,
        objects: &[T],
        set_name: Option<&str>,
        key_attribute: &str,
    ) -> Result<(), ConnectorError> {
        for object in objects {
            self.update_from_object(object, set_name, key_attribute)
                .await?;
        }
        Ok(())
    }

    pub async fn delete_from_object(
        &self,
        object: &dyn HostObject,
        set_name: Option<&str>,
        key_attribute: &str,
    ) -> Result<(), ConnectorError> {
        let set_name = self.resolve_set_name(object, set_name)?;
        let key = self.extract_key(object, key_attribute)?;

        self.client
            .delete_entity(PendingOperation::delete(set_name, key))
            .await?;
        Ok(())
    }

    /// Render the create request for an object without sending it
    pub fn render_batch_payload(
        &self,
        object: &dyn HostObject,
        set_name: Option<&str>,
    ) -> Result<String, ConnectorError> {
        let set_name = self.resolve_set_name(object, set_name)?;
        let operation = self.pending_create(object, &set_name)?;
        Ok(self
            .client
            .render_payload(&operation, self.config.format, self.config.version)?)
    }

    fn pending_create(
        &self,
        object: &dyn HostObject,
        set_name: &str,
    ) -> Result<PendingOperation, ConnectorError> {
        let properties = self.mapper().map_to_wire(object)?;
        Ok(PendingOperation::create(set_name).properties(properties))
    }

    async fn create_in(
        &self,
        object: &dyn HostObject,
        set_name: &str,
    ) -> Result<OEntity, ConnectorError> {
        let operation = self.pending_create(object, set_name)?;
        Ok(self.client.create_entity(operation).await?)
    }
}

fn default_set_name(type_name: &str, set_name: Option<&str>) -> Result<String, ConnectorError> {
    if let Some(explicit) = set_name.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(explicit.to_string());
    }

    // Keep only the last path segment of qualified names
    let simple_name = type_name.rsplit("::").next().unwrap_or(type_name).trim();
    if simple_name.is_empty() {
        return Err(ConnectorError::argument(
            "cannot infer an entity set name from a blank type name",
        ));
    }
    Ok(format!("{}{}", simple_name, SET_SUFFIX))
}

fn build_request(set_name: &str, options: QueryOptions) -> QueryRequest {
    let QueryOptions {
        select,
        filter,
        top,
        skip,
        orderby,
        expand,
    } = options;

    let mut request = QueryRequest::new(set_name);
    if let Some(filter) = filter {
        request = request.filter(filter);
    }
    if let Some(orderby) = orderby {
        request = request.order_by(orderby);
    }
    if let Some(expand) = expand {
        request = request.expand(expand);
    }
    if let Some(select) = select {
        request = request.select(select);
    }
    if let Some(skip) = skip {
        request = request.skip(skip);
    }
    if let Some(top) = top {
        request = request.top(top);
    }
    request
}
