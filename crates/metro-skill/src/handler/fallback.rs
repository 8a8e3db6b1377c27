//! Catch-all handlers.
//!
//! `FallbackHandler` answers the platform's own fallback intent.
//! `UnhandledHandler` accepts anything and must be registered last.

use async_trait::async_trait;
use tracing::warn;

use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler, FALLBACK_INTENT};
use crate::response::{Response, ResponseBuilder};

pub const FALLBACK: &str = "Sorry, I don't know about that. Please try again.";
pub const UNHANDLED: &str = "Sorry, I didn't understand that. Please try again.";

pub struct FallbackHandler;

#[async_trait]
impl RequestHandler for FallbackHandler {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent(&[FALLBACK_INTENT])
    }

    async fn handle(&self, _input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        Ok(ResponseBuilder::new()
            .speak(FALLBACK)
            .reprompt(FALLBACK)
            .get_response())
    }
}

pub struct UnhandledHandler;

#[async_trait]
impl RequestHandler for UnhandledHandler {
    fn name(&self) -> &'static str {
        "unhandled"
    }

    fn can_handle(&self, _input: &HandlerInput<'_>) -> bool {
        true
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        warn!(
            request_type = input.envelope.request_type(),
            "No specific handler for request"
        );
        Ok(ResponseBuilder::new()
            .speak(UNHANDLED)
            .reprompt(UNHANDLED)
            .get_response())
    }
}
