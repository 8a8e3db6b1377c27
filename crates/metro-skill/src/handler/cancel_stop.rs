use async_trait::async_trait;

use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler, CANCEL_INTENT, STOP_INTENT};
use crate::response::{Response, ResponseBuilder};

/// Handles both cancel and stop; the skill treats them the same.
pub struct CancelAndStopHandler;

#[async_trait]
impl RequestHandler for CancelAndStopHandler {
    fn name(&self) -> &'static str {
        "cancel_stop"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent(&[CANCEL_INTENT, STOP_INTENT])
    }

    async fn handle(&self, _input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        Ok(ResponseBuilder::new()
            .speak("Goodbye!")
            .with_should_end_session(true)
            .get_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing::{input, intent_envelope};

    #[tokio::test]
    async fn test_cancel_and_stop_say_goodbye() {
        for intent in [CANCEL_INTENT, STOP_INTENT] {
            let envelope = intent_envelope(intent, &[]);
            let mut input = input(&envelope);
            assert!(CancelAndStopHandler.can_handle(&input));

            let response = CancelAndStopHandler.handle(&mut input).await.unwrap();
            assert_eq!(response.speech().as_deref(), Some("Goodbye!"));
            assert!(response.ends_session());
        }
    }
}
