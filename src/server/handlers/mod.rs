//! HTTP request handlers.

pub mod bulk;
pub mod query;
pub mod recipients;
pub mod render;
pub mod schema;
