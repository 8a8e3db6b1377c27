use async_trait::async_trait;

use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler, HELP_INTENT};
use crate::response::{Response, ResponseBuilder};

pub const HELP: &str = "You can ask when the next train leaves. \
Tell me your starting station, line color, and direction.";

pub struct HelpHandler;

#[async_trait]
impl RequestHandler for HelpHandler {
    fn name(&self) -> &'static str {
        "help"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent(&[HELP_INTENT])
    }

    async fn handle(&self, _input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        Ok(ResponseBuilder::new().speak(HELP).reprompt(HELP).get_response())
    }
}
