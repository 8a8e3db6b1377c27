use async_trait::async_trait;
use tracing::{info, warn};

use crate::envelope::Request;
use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler};
use crate::response::{Response, ResponseBuilder};

/// Acknowledges the platform's end-of-session notice with an empty response.
pub struct SessionEndedHandler;

#[async_trait]
impl RequestHandler for SessionEndedHandler {
    fn name(&self) -> &'static str {
        "session_ended"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.envelope.is_session_ended_request()
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        if let Request::SessionEndedRequest(request) = &input.envelope.request {
            match &request.error {
                Some(error) => warn!(
                    reason = request.reason.as_deref().unwrap_or("unknown"),
                    error_type = %error.kind,
                    error_message = %error.message,
                    "Session ended with error"
                ),
                None => info!(
                    reason = request.reason.as_deref().unwrap_or("unknown"),
                    "Session ended"
                ),
            }
        }
        Ok(ResponseBuilder::new().get_response())
    }
}
