//! Hooks that run around every handler invocation.

use async_trait::async_trait;

use crate::error::SkillError;
use crate::handler::HandlerInput;
use crate::response::Response;

/// Runs before handler selection.
///
/// A failure is routed to the error handlers and the handler chain is
/// skipped.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn process(&self, input: &mut HandlerInput<'_>) -> Result<(), SkillError>;
}

/// Runs after a response has been produced, including one produced by an
/// error handler.
///
/// A failure is logged; the response is still returned.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn process(
        &self,
        input: &mut HandlerInput<'_>,
        response: &Response,
    ) -> Result<(), SkillError>;
}
