//! Domain error types

mod domain_error;
mod upstream;

pub use domain_error::DomainError;
pub use upstream::UpstreamFailure;
