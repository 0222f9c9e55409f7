//! Domain errors - error types for the domain layer

use thiserror::Error;

use super::UpstreamFailure;
use crate::entities::NotificationType;
use crate::value_objects::{IdSpace, NativeId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(NativeId),

    #[error("Note not found: {0}")]
    NoteNotFound(NativeId),

    #[error("Notification not found: {0}")]
    NotificationNotFound(NativeId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Malformed {space} identifier: {input:?}")]
    MalformedIdentifier { space: IdSpace, input: String },

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("User is not the recipient of this notification")]
    NotRecipient,

    #[error("Global timeline is disabled")]
    TimelineDisabled,

    // =========================================================================
    // Conversion Errors
    // =========================================================================
    #[error("Notification type {0} is not supported")]
    UnsupportedNotificationType(NotificationType),

    #[error("Could not resolve {entity} {id}: {reason}")]
    EntityResolution {
        entity: &'static str,
        id: NativeId,
        reason: String,
    },

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Upstream error: {0}")]
    Upstream(UpstreamFailure),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::NoteNotFound(_) => "UNKNOWN_STATUS",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",

            // Validation
            Self::MalformedIdentifier { .. } => "MALFORMED_IDENTIFIER",
            Self::InvalidPagination(_) => "INVALID_PAGINATION",
            Self::ValidationError(_) => "VALIDATION_ERROR",

            // Authorization
            Self::NotRecipient => "NOT_RECIPIENT",
            Self::TimelineDisabled => "TIMELINE_DISABLED",

            // Conversion
            Self::UnsupportedNotificationType(_) => "UNSUPPORTED_NOTIFICATION_TYPE",
            Self::EntityResolution { .. } => "ENTITY_RESOLUTION_FAILED",

            // Infrastructure
            Self::Upstream(_) => "UPSTREAM_ERROR",
        }
    }

    /// Check if this is a "not found" error
    ///
    /// Someone else's notification counts as missing so its existence is not revealed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::NoteNotFound(_)
                | Self::NotificationNotFound(_)
                | Self::NotRecipient
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedIdentifier { .. } | Self::InvalidPagination(_) | Self::ValidationError(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::TimelineDisabled)
    }

    /// Check if the entity exists but cannot be expressed in the wire format
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedNotificationType(_))
    }

    /// The collaborator failure behind this error, if any
    pub fn upstream_failure(&self) -> Option<&UpstreamFailure> {
        match self {
            Self::Upstream(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<UpstreamFailure> for DomainError {
    fn from(failure: UpstreamFailure) -> Self {
        Self::Upstream(failure)
    }
}
