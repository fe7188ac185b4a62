//! Query requests against an entity set

/// System query options for OData requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub select: Option<String>,
    pub filter: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub orderby: Option<String>,
    pub expand: Option<String>,
}

impl QueryOptions {
    /// Build query string from options. Unset options are left out.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(ref filter) = self.filter {
            params.push(format!("$filter={}", filter));
        }

        if let Some(ref orderby) = self.orderby {
            params.push(format!("$orderby={}", orderby));
        }

        if let Some(ref expand) = self.expand {
            params.push(format!("$expand={}", expand));
        }

        if let Some(ref select) = self.select {
            params.push(format!("$select={}", select));
        }

        if let Some(skip) = self.skip {
            params.push(format!("$skip={}", skip));
        }

        if let Some(top) = self.top {
            params.push(format!("$top={}", top));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A query against one entity set, built up with chained options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    entity_set: String,
    options: QueryOptions,
}

impl QueryRequest {
    pub fn new(entity_set: impl Into<String>) -> Self {
        Self {
            entity_set: entity_set.into(),
            options: QueryOptions::default(),
        }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.options.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, orderby: impl Into<String>) -> Self {
        self.options.orderby = Some(orderby.into());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.options.expand = Some(expand.into());
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.options.select = Some(select.into());
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.options.skip = Some(skip);
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.options.top = Some(top);
        self
    }

    pub fn entity_set(&self) -> &str {
        &self.entity_set
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Relative path including the query string, e.g. `Widgets?$top=5`
    pub fn to_path(&self) -> String {
        format!("{}{}", self.entity_set, self.options.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_options_empty() {
        let options = QueryOptions::default();
        assert!(options.is_empty());
        assert_eq!(options.to_query_string(), "");
    }

    #[test]
    fn test_query_options_full() {
        let options = QueryOptions {
            select: Some("Name,Price".to_string()),
            filter: Some("Price gt 5".to_string()),
            top: Some(10),
            skip: None,
            orderby: Some("Name asc".to_string()),
            expand: None,
        };

        let query = options.to_query_string();
        assert!(query.starts_with('?'));
        assert!(query.contains("$select=Name,Price"));
        assert!(query.contains("$filter=Price gt 5"));
        assert!(query.contains("$top=10"));
        assert!(query.contains("$orderby=Name asc"));
        assert!(!query.contains("$skip"));
        assert!(!query.contains("$expand"));
    }

    #[test]
    fn test_request_builder() {
        let request = QueryRequest::new("Widgets")
            .filter("Price gt 5")
            .order_by("Name")
            .skip(20)
            .top(10);

        assert_eq!(request.entity_set(), "Widgets");
        assert_eq!(
            request.to_path(),
            "Widgets?$filter=Price gt 5&$orderby=Name&$skip=20&$top=10"
        );
        assert_eq!(QueryRequest::new("Widgets").to_path(), "Widgets");
    }
}
