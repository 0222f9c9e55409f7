//! # masto-api
//!
//! Axum boundary for the Mastodon compatibility core: request extractors,
//! handler functions over the query services, and the JSON/`Link` responses.
//! Mounting the handlers on concrete routes is left to the hosting server.

pub mod extractors;
pub mod handlers;
pub mod response;
pub mod state;

pub use response::{ApiError, ApiResult, Paginated};
pub use state::AppState;
