use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Attribute mapping used for both session and persistent attributes.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Transit domain
// =============================================================================

/// A rail station as listed by the transit service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// When a train is expected at the platform.
///
/// Variants are declared soonest-first so the derived `Ord` sorts by arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArrivalEstimate {
    /// Doors open at the platform ("BRD").
    Boarding,
    /// Pulling into the station ("ARR").
    Arriving,
    /// Whole minutes until arrival.
    Minutes(u32),
}

impl ArrivalEstimate {
    /// Parse the service's `Min` field. `"---"`, blanks and anything else
    /// unrecognised yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "BRD" => Some(ArrivalEstimate::Boarding),
            "ARR" => Some(ArrivalEstimate::Arriving),
            other => other.parse::<u32>().ok().map(ArrivalEstimate::Minutes),
        }
    }
}

impl fmt::Display for ArrivalEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrivalEstimate::Boarding => write!(f, "BRD"),
            ArrivalEstimate::Arriving => write!(f, "ARR"),
            ArrivalEstimate::Minutes(m) => write!(f, "{}", m),
        }
    }
}

/// One forecast of a train's arrival at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "Line")]
    pub line: String,
    #[serde(rename = "DestinationName")]
    pub destination_name: String,
    #[serde(
        rename = "Min",
        default,
        deserialize_with = "deserialize_estimate",
        serialize_with = "serialize_estimate"
    )]
    pub minutes_until_arrival: Option<ArrivalEstimate>,
}

fn deserialize_estimate<'de, D>(deserializer: D) -> Result<Option<ArrivalEstimate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => ArrivalEstimate::parse(&s),
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|m| u32::try_from(m).ok())
            .map(ArrivalEstimate::Minutes),
        _ => None,
    })
}

fn serialize_estimate<S>(estimate: &Option<ArrivalEstimate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match estimate {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_str("---"),
    }
}
