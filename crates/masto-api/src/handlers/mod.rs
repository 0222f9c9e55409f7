//! Request handlers for the Mastodon read API
//!
//! Each handler builds a request context for the acting viewer, calls one
//! query service, and renders the result.

pub mod accounts;
pub mod notifications;
pub mod statuses;
pub mod timelines;
