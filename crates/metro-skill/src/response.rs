//! Response model and builder.

use serde::{Deserialize, Serialize};

use metro_core::types::Attributes;

/// Speech sent back to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
    PlainText { text: String },
}

impl OutputSpeech {
    pub fn ssml(text: &str) -> Self {
        OutputSpeech::Ssml {
            ssml: format!("<speak>{}</speak>", escape_xml(text)),
        }
    }

    /// The text without SSML framing or escaping.
    pub fn text(&self) -> String {
        match self {
            OutputSpeech::PlainText { text } => text.clone(),
            OutputSpeech::Ssml { ssml } => {
                let inner = ssml
                    .strip_prefix("<speak>")
                    .and_then(|s| s.strip_suffix("</speak>"))
                    .unwrap_or(ssml);
                unescape_xml(inner)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// What the skill says, and whether the session stays open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    /// `None` lets the platform decide, which ends the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

impl Response {
    /// Spoken text, if any.
    pub fn speech(&self) -> Option<String> {
        self.output_speech.as_ref().map(OutputSpeech::text)
    }

    pub fn reprompt_speech(&self) -> Option<String> {
        self.reprompt.as_ref().map(|r| r.output_speech.text())
    }

    /// An unset flag counts as ending the session.
    pub fn ends_session(&self) -> bool {
        self.should_end_session.unwrap_or(true)
    }
}

/// Fluent builder mirroring the platform SDK's response builder.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(mut self, text: &str) -> Self {
        self.response.output_speech = Some(OutputSpeech::ssml(text));
        self
    }

    /// Setting a reprompt keeps the session open for the user's answer.
    pub fn reprompt(mut self, text: &str) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(text),
        });
        self.response.should_end_session = Some(false);
        self
    }

    pub fn with_should_end_session(mut self, end: bool) -> Self {
        self.response.should_end_session = Some(end);
        self
    }

    pub fn get_response(self) -> Response {
        self.response
    }
}

/// Full reply returned to the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    #[serde(default)]
    pub session_attributes: Attributes,
    pub response: Response,
}

impl ResponseEnvelope {
    pub fn new(session_attributes: Attributes, response: Response) -> Self {
        Self {
            version: "1.0".to_string(),
            session_attributes,
            response,
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_xml(text: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;".
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speak_wraps_ssml() {
        let response = ResponseBuilder::new().speak("Goodbye!").get_response();
        assert_eq!(
            response.output_speech,
            Some(OutputSpeech::Ssml {
                ssml: "<speak>Goodbye!</speak>".to_string()
            })
        );
        assert_eq!(response.speech().as_deref(), Some("Goodbye!"));
        assert!(response.should_end_session.is_none());
        assert!(response.ends_session());
    }

    #[test]
    fn test_speak_escapes_markup() {
        let response = ResponseBuilder::new()
            .speak("L'Enfant Plaza & <Metro Center>")
            .get_response();
        match response.output_speech.as_ref().unwrap() {
            OutputSpeech::Ssml { ssml } => assert_eq!(
                ssml,
                "<speak>L&apos;Enfant Plaza &amp; &lt;Metro Center&gt;</speak>"
            ),
            other => panic!("unexpected speech: {other:?}"),
        }
        assert_eq!(
            response.speech().as_deref(),
            Some("L'Enfant Plaza & <Metro Center>")
        );
    }

    #[test]
    fn test_reprompt_keeps_session_open() {
        let response = ResponseBuilder::new()
            .speak("Welcome")
            .reprompt("Which station?")
            .get_response();
        assert_eq!(response.should_end_session, Some(false));
        assert!(!response.ends_session());
        assert_eq!(response.reprompt_speech().as_deref(), Some("Which station?"));
    }

    #[test]
    fn test_explicit_end_session() {
        let response = ResponseBuilder::new()
            .speak("Done")
            .with_should_end_session(true)
            .get_response();
        assert_eq!(response.should_end_session, Some(true));
        assert!(response.ends_session());
    }

    #[test]
    fn test_empty_response_serializes_empty_object() {
        let response = ResponseBuilder::new().get_response();
        assert_eq!(serde_json::to_string(&response).unwrap(), "{}");
    }

    #[test]
    fn test_envelope_serialization_shape() {
        let mut attrs = Attributes::new();
        attrs.insert("sessionCount".to_string(), serde_json::json!(2));
        let envelope = ResponseEnvelope::new(
            attrs,
            ResponseBuilder::new().speak("Hi").reprompt("Hi?").get_response(),
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["sessionAttributes"]["sessionCount"], 2);
        assert_eq!(json["response"]["outputSpeech"]["type"], "SSML");
        assert_eq!(json["response"]["outputSpeech"]["ssml"], "<speak>Hi</speak>");
        assert_eq!(json["response"]["reprompt"]["outputSpeech"]["type"], "SSML");
        assert_eq!(json["response"]["shouldEndSession"], false);
    }
}
