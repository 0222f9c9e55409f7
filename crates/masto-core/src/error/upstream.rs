//! Failures reported by collaborators outside this process

use serde::Serialize;
use std::fmt;

/// Failure reported by an external collaborator (the entity store, a media proxy, ...)
///
/// Only what the collaborator actually returned is recorded; a transport
/// failure has neither status nor body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamFailure {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl UpstreamFailure {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status: None,
            body: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} responded with {}", self.service, status),
            None => write!(f, "{} unavailable", self.service),
        }
    }
}
