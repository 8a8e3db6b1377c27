use async_trait::async_trait;

use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler};
use crate::response::{Response, ResponseBuilder};

/// Repeats back the name of any intent nothing else claimed.
///
/// Useful when testing a new interaction model.
pub struct IntentReflectorHandler;

#[async_trait]
impl RequestHandler for IntentReflectorHandler {
    fn name(&self) -> &'static str {
        "intent_reflector"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.envelope.intent().is_some()
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        let name = input.envelope.intent_name().unwrap_or_default();
        Ok(ResponseBuilder::new()
            .speak(&format!("You just triggered {}", name))
            .get_response())
    }
}
