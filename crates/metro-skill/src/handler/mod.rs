//! Request handler chain and trait definitions.
//!
//! Defines the `RequestHandler` and `ErrorHandler` traits and the built-in
//! handlers registered by `DispatcherBuilder::register_defaults`, listed
//! here in registration order.

pub mod launch;
pub mod next_train;
pub mod help;
pub mod cancel_stop;
pub mod fallback;
pub mod session_ended;
pub mod reflector;
pub mod generic_error;

pub use cancel_stop::CancelAndStopHandler;
pub use fallback::{FallbackHandler, UnhandledHandler};
pub use generic_error::GenericErrorHandler;
pub use help::HelpHandler;
pub use launch::LaunchHandler;
pub use next_train::NextTrainHandler;
pub use reflector::IntentReflectorHandler;
pub use session_ended::SessionEndedHandler;

use async_trait::async_trait;

use crate::attributes::AttributesManager;
use crate::envelope::RequestEnvelope;
use crate::error::SkillError;
use crate::response::Response;

pub const NEXT_TRAIN_INTENT: &str = "GetNextTrainIntent";
/// Older interaction models registered the same intent under this name.
pub const LEGACY_NEXT_TRAIN_INTENT: &str = "GetNextBusIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";

/// Everything a handler sees for one request.
pub struct HandlerInput<'a> {
    pub envelope: &'a RequestEnvelope,
    pub attributes: AttributesManager,
}

impl<'a> HandlerInput<'a> {
    pub fn new(envelope: &'a RequestEnvelope, attributes: AttributesManager) -> Self {
        Self {
            envelope,
            attributes,
        }
    }

    /// True for an intent request whose intent is one of `names`.
    pub fn is_intent(&self, names: &[&str]) -> bool {
        self.envelope
            .intent_name()
            .is_some_and(|name| names.contains(&name))
    }
}

/// A handler for one kind of request.
///
/// The dispatcher asks each registered handler in order and invokes the
/// first whose `can_handle` returns true.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Must not block or mutate anything.
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool;

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<Response, SkillError>;
}

/// Turns a failure into a spoken response.
pub trait ErrorHandler: Send + Sync {
    fn can_handle(&self, input: &HandlerInput<'_>, error: &SkillError) -> bool;

    fn handle(&self, input: &mut HandlerInput<'_>, error: &SkillError) -> Response;
}


#[cfg(test)]
mod tests {
    use super::testing::*;

    #[test]
    fn test_is_intent() {
        let envelope = intent_envelope("AMAZON.HelpIntent", &[]);
        let help = input(&envelope);
        assert!(help.is_intent(&[super::HELP_INTENT]));
        assert!(help.is_intent(&[super::CANCEL_INTENT, super::HELP_INTENT]));
        assert!(!help.is_intent(&[super::STOP_INTENT]));

        let launch = request_envelope("LaunchRequest");
        assert!(!input(&launch).is_intent(&[super::HELP_INTENT]));
    }
}
