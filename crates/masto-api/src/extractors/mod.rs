//! Axum extractors for request handling
//!
//! Custom extractors for the viewer, query strings, and wire ids in paths.

mod path;
mod query;
mod viewer;

pub use path::ForeignIdPath;
pub use query::QueryMap;
pub use viewer::{RequestCtx, Viewer};
