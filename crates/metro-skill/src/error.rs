//! Error types for the skill engine.

use metro_client::ClientError;
use metro_core::error::MetroError;

/// Failures that escape a handler or interceptor.
///
/// Expected conditions (unresolved slot, unknown station, no matching route)
/// are answered in speech and never become a `SkillError`.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("Transit service failure: {0}")]
    Remote(#[from] ClientError),
    #[error("No handler can route request of type {request_type}")]
    UnroutableRequest { request_type: String },
    #[error("Persistence error: {0}")]
    Persistence(#[from] MetroError),
    #[error("No persistence adapter configured")]
    PersistenceUnavailable,
    #[error("Request carries no user id")]
    MissingUserId,
    #[error("Invalid request envelope: {0}")]
    InvalidEnvelope(String),
}
