//! Voice-platform request envelope.
//!
//! Only the fields the skill reads are modelled; everything else in the
//! platform payload is ignored on deserialization.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use metro_core::types::Attributes;

use crate::error::SkillError;

// =============================================================================
// Envelope
// =============================================================================

/// One incoming request, immutable for the duration of a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    pub request: Request,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Session attributes echoed back by the platform on continuation turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

// =============================================================================
// Requests
// =============================================================================

/// Request body, discriminated by its `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    LaunchRequest(LaunchRequest),
    IntentRequest(IntentRequest),
    SessionEndedRequest(SessionEndedRequest),
    /// Any request type this skill does not model.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(default)]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    #[serde(default)]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_state: Option<String>,
    pub intent: Intent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    #[serde(default)]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionEndedError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEndedError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Intents and slots
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
}

/// One named piece of information extracted from the utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    /// What the user actually said, if anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Resolutions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolutions {
    #[serde(default)]
    pub resolutions_per_authority: Vec<Resolution>,
}

/// Entity resolution result from one authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(default)]
    pub authority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResolutionStatus>,
    #[serde(default)]
    pub values: Vec<ResolutionValueWrapper>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionStatus {
    pub code: StatusCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    #[serde(rename = "ER_SUCCESS_MATCH")]
    SuccessMatch,
    #[serde(rename = "ER_SUCCESS_NO_MATCH")]
    SuccessNoMatch,
    #[serde(rename = "ER_ERROR_TIMEOUT")]
    ErrorTimeout,
    #[serde(rename = "ER_ERROR_EXCEPTION")]
    ErrorException,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionValueWrapper {
    pub value: ResolvedValue,
}

/// A canonical value the spoken phrase resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Resolution {
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            Some(ResolutionStatus {
                code: StatusCode::SuccessMatch
            })
        )
    }
}

// =============================================================================
// Accessors
// =============================================================================

impl RequestEnvelope {
    /// Parse an envelope from raw JSON.
    pub fn from_json(raw: &str) -> Result<Self, SkillError> {
        serde_json::from_str(raw).map_err(|e| SkillError::InvalidEnvelope(e.to_string()))
    }

    /// The platform's name for the request kind.
    pub fn request_type(&self) -> &'static str {
        match self.request {
            Request::LaunchRequest(_) => "LaunchRequest",
            Request::IntentRequest(_) => "IntentRequest",
            Request::SessionEndedRequest(_) => "SessionEndedRequest",
            Request::Unknown => "Unknown",
        }
    }

    pub fn request_id(&self) -> &str {
        match &self.request {
            Request::LaunchRequest(r) => &r.request_id,
            Request::IntentRequest(r) => &r.request_id,
            Request::SessionEndedRequest(r) => &r.request_id,
            Request::Unknown => "",
        }
    }

    pub fn intent(&self) -> Option<&Intent> {
        match &self.request {
            Request::IntentRequest(r) => Some(&r.intent),
            _ => None,
        }
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.intent().map(|i| i.name.as_str())
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.intent().and_then(|i| i.slots.get(name))
    }

    /// True when this is the first request of a session.
    pub fn is_new_session(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.new)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    /// User identity, from the session or else from the system context.
    pub fn user_id(&self) -> Option<&str> {
        let from_session = self
            .session
            .as_ref()
            .and_then(|s| s.user.as_ref())
            .map(|u| u.user_id.as_str());
        let from_context = self
            .context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.user.as_ref())
            .map(|u| u.user_id.as_str());
        from_session
            .or(from_context)
            .filter(|id| !id.trim().is_empty())
    }

    pub fn is_session_ended_request(&self) -> bool {
        matches!(self.request, Request::SessionEndedRequest(_))
    }
}
