//! OData module
//!
//! Entity client capability, payload formats and the default HTTP client

pub mod client;
pub mod constants;
pub mod consumer;
pub mod error;
pub mod format;
pub mod json;
pub mod query;

pub use client::HttpEntityClient;
pub use consumer::{EntityClient, EntityStream, OperationKind, PendingOperation};
pub use error::ODataError;
pub use format::{render_payload, FormatType, ODataVersion};
pub use json::{parse_entity_response, parse_feed, EntityPage};
pub use query::{QueryOptions, QueryRequest};
