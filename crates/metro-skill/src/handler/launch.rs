//! Launch request handler.

use async_trait::async_trait;

use crate::envelope::Request;
use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler};
use crate::response::{Response, ResponseBuilder};

pub const WELCOME: &str =
    "Welcome, please state your starting station, line color, and direction.";

/// Greets the user when the skill is opened without an intent.
pub struct LaunchHandler;

#[async_trait]
impl RequestHandler for LaunchHandler {
    fn name(&self) -> &'static str {
        "launch"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        matches!(input.envelope.request, Request::LaunchRequest(_))
    }

    async fn handle(&self, _input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        Ok(ResponseBuilder::new()
            .speak(WELCOME)
            .reprompt(WELCOME)
            .get_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing::{input, intent_envelope, request_envelope};

    #[tokio::test]
    async fn test_launch_prompts_and_stays_open() {
        let envelope = request_envelope("LaunchRequest");
        let mut input = input(&envelope);
        assert!(LaunchHandler.can_handle(&input));

        let response = LaunchHandler.handle(&mut input).await.unwrap();
        assert_eq!(response.speech().as_deref(), Some(WELCOME));
        assert_eq!(response.reprompt_speech().as_deref(), Some(WELCOME));
        assert!(!response.ends_session());
    }

    #[test]
    fn test_launch_ignores_intents() {
        let envelope = intent_envelope("AMAZON.HelpIntent", &[]);
        assert!(!LaunchHandler.can_handle(&input(&envelope)));
    }
}
