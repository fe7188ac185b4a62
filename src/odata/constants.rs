//! Media types and header names used on the wire

pub const APPLICATION_ATOM_XML_CHARSET_UTF8: &str = "application/atom+xml;charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_JSON_CHARSET_UTF8: &str = "application/json;charset=utf-8";

pub mod headers {
    pub const X_HTTP_METHOD: &str = "X-HTTP-Method";
    pub const DATA_SERVICE_VERSION: &str = "DataServiceVersion";
    pub const MAX_DATA_SERVICE_VERSION: &str = "MaxDataServiceVersion";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const ACCEPT: &str = "Accept";
}

pub mod namespaces {
    pub const ATOM: &str = "http://www.w3.org/2005/Atom";
    pub const DATA_SERVICES: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";
    pub const METADATA: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
}
