//! Application state
//!
//! Holds the shared state for the Axum application: the service context
//! and, through it, the configuration.

use std::sync::Arc;

use masto_common::AppConfig;
use masto_core::{IdSpace, User};
use masto_service::{Page, RequestContext, ServiceContext};

use crate::response::Paginated;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext) -> Self {
        Self {
            service_context: Arc::new(service_context),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        self.service_context.config()
    }

    /// Wire id space of this instance
    pub fn id_space(&self) -> IdSpace {
        self.service_context.id_space()
    }

    /// Start a request on behalf of `viewer`
    pub fn request_context(&self, viewer: Option<User>) -> RequestContext {
        RequestContext::new(self.service_context.as_ref().clone(), viewer)
    }

    /// Absolute URL of an API path on this instance
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.config().instance.url.trim_end_matches('/'), path)
    }

    /// Wrap a page so its continuation links point back at `path`
    pub fn paginated<T>(&self, page: Page<T>, path: &str) -> Paginated<T> {
        Paginated::new(page, self.endpoint_url(path), self.id_space())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .finish()
    }
}
