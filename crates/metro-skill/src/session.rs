//! Session state lifecycle.
//!
//! Hydrates session attributes from the durable store when a session
//! starts and flushes them back when it ends. The store is read at most
//! once and written at most once per session.
//!
//! A session whose hydration failed carries [`HYDRATION_PENDING`] until a
//! later turn hydrates it. Such a session is never written back.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::envelope::RequestEnvelope;
use crate::error::SkillError;
use crate::handler::HandlerInput;
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::response::Response;

pub const SESSION_COUNT: &str = "sessionCount";

/// Session key marking attributes that were never loaded from the store.
pub const HYDRATION_PENDING: &str = "hydrationPending";

/// Request and response interceptor pair for session persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionStateManager;

impl SessionStateManager {
    pub fn new() -> Self {
        Self
    }
}

/// True when this response closes the session.
///
/// An unset end-of-session flag counts as closing.
pub fn is_session_ending(envelope: &RequestEnvelope, response: &Response) -> bool {
    response.ends_session() || envelope.is_session_ended_request()
}

fn is_hydration_pending(input: &HandlerInput<'_>) -> bool {
    input
        .attributes
        .session_attributes()
        .contains_key(HYDRATION_PENDING)
}

#[async_trait]
impl RequestInterceptor for SessionStateManager {
    async fn process(&self, input: &mut HandlerInput<'_>) -> Result<(), SkillError> {
        let pending = is_hydration_pending(input);
        if !input.envelope.is_new_session() && !pending {
            return Ok(());
        }
        if !input.attributes.has_persistence() {
            debug!("No attribute store configured, starting with empty session");
            return Ok(());
        }

        let loaded = input.attributes.persistent_attributes().await.cloned();
        let stored = match loaded {
            Ok(stored) => stored,
            Err(err) => {
                input
                    .attributes
                    .session_attributes_mut()
                    .insert(HYDRATION_PENDING.to_string(), Value::Bool(true));
                return Err(err);
            }
        };
        debug!(
            session_id = input.envelope.session_id().unwrap_or_default(),
            keys = stored.len(),
            retried = pending,
            "Hydrated session attributes"
        );
        input.attributes.set_session_attributes(stored);
        Ok(())
    }
}

#[async_trait]
impl ResponseInterceptor for SessionStateManager {
    async fn process(
        &self,
        input: &mut HandlerInput<'_>,
        response: &Response,
    ) -> Result<(), SkillError> {
        if !is_session_ending(input.envelope, response) || !input.attributes.has_persistence() {
            return Ok(());
        }
        if is_hydration_pending(input) {
            warn!(
                session_id = input.envelope.session_id().unwrap_or_default(),
                "Session was never hydrated, leaving stored attributes untouched"
            );
            return Ok(());
        }

        let session = input.attributes.session_attributes_mut();
        let count = session
            .get(SESSION_COUNT)
            .and_then(Value::as_u64)
            .unwrap_or(0)
            + 1;
        session.insert(SESSION_COUNT.to_string(), Value::from(count));

        let snapshot = session.clone();
        input.attributes.set_persistent_attributes(snapshot);
        input.attributes.save_persistent_attributes().await?;
        info!(
            session_id = input.envelope.session_id().unwrap_or_default(),
            session_count = count,
            "Persisted session attributes"
        );
        Ok(())
    }
}
