use tracing::debug;

use crate::error::SkillError;
use crate::handler::{ErrorHandler, HandlerInput};
use crate::response::{Response, ResponseBuilder};

pub const APOLOGY: &str = "Sorry, I had trouble doing what you asked. Please try again.";

/// Matches every error and apologises.
pub struct GenericErrorHandler;

impl ErrorHandler for GenericErrorHandler {
    fn can_handle(&self, _input: &HandlerInput<'_>, _error: &SkillError) -> bool {
        true
    }

    fn handle(&self, input: &mut HandlerInput<'_>, err: &SkillError) -> Response {
        debug!(
            request_type = input.envelope.request_type(),
            error = %err,
            "Answering with generic apology"
        );
        ResponseBuilder::new()
            .speak(APOLOGY)
            .reprompt(APOLOGY)
            .get_response()
    }
}
