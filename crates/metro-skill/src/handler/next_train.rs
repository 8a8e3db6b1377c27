//! Next train arrival handler.
//!
//! Resolves station, line and direction from the intent's slots, falling
//! back to the user's last successful query for slots that were not spoken,
//! and answers with the soonest matching train.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use metro_client::TransitQueryClient;
use metro_core::types::ArrivalEstimate;

use crate::error::SkillError;
use crate::handler::{HandlerInput, RequestHandler, LEGACY_NEXT_TRAIN_INTENT, NEXT_TRAIN_INTENT};
use crate::matcher::{ArrivalOutcome, PredictionMatcher, TrainQuery};
use crate::response::{Response, ResponseBuilder};
use crate::slot::{resolve_slot, SlotValue};

pub const LAST_STATION: &str = "lastStation";
pub const LAST_LINE: &str = "lastLine";
pub const LAST_DIRECTION: &str = "lastDirection";

struct SlotSpec {
    slot: &'static str,
    label: &'static str,
    preference: &'static str,
}

const STATION: SlotSpec = SlotSpec {
    slot: "startingMetroStation",
    label: "starting station",
    preference: LAST_STATION,
};
const LINE: SlotSpec = SlotSpec {
    slot: "metroLine",
    label: "line color",
    preference: LAST_LINE,
};
const DIRECTION: SlotSpec = SlotSpec {
    slot: "metroDirection",
    label: "direction",
    preference: LAST_DIRECTION,
};

pub struct NextTrainHandler {
    client: Arc<dyn TransitQueryClient>,
}

impl NextTrainHandler {
    pub fn new(client: Arc<dyn TransitQueryClient>) -> Self {
        Self { client }
    }
}

/// Canonical value for `spec`, or the reprompt asking the user to restate it.
fn slot_or_preference(input: &HandlerInput<'_>, spec: &SlotSpec) -> Result<String, Response> {
    match resolve_slot(input.envelope, spec.slot) {
        SlotValue::Resolved { canonical, .. } => Ok(canonical.to_string()),
        SlotValue::Missing => input
            .attributes
            .session_attributes()
            .get(spec.preference)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ask_again(spec)),
        SlotValue::Unresolved { spoken } => {
            info!(slot = spec.slot, spoken, "Slot value did not resolve");
            Err(ask_again(spec))
        }
    }
}

fn ask_again(spec: &SlotSpec) -> Response {
    let speech = format!("Sorry, I didn't catch the {}. Please say it again.", spec.label);
    ResponseBuilder::new()
        .speak(&speech)
        .reprompt(&speech)
        .get_response()
}

fn arrival_speech(query: &TrainQuery, estimate: ArrivalEstimate) -> String {
    let when = match estimate {
        ArrivalEstimate::Boarding => "is boarding now".to_string(),
        ArrivalEstimate::Arriving => "is arriving now".to_string(),
        ArrivalEstimate::Minutes(n) => format!("is in {} minutes", n),
    };
    format!(
        "The next {} train from {} to {} {}",
        query.line, query.station, query.direction, when
    )
}

#[async_trait]
impl RequestHandler for NextTrainHandler {
    fn name(&self) -> &'static str {
        "next_train"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent(&[NEXT_TRAIN_INTENT, LEGACY_NEXT_TRAIN_INTENT])
    }

    async fn handle(&self, input: &mut HandlerInput<'_>) -> Result<Response, SkillError> {
        let query = match (
            slot_or_preference(input, &STATION),
            slot_or_preference(input, &LINE),
            slot_or_preference(input, &DIRECTION),
        ) {
            (Ok(station), Ok(line), Ok(direction)) => TrainQuery {
                station,
                line,
                direction,
            },
            (Err(ask), _, _) | (_, Err(ask), _) | (_, _, Err(ask)) => return Ok(ask),
        };

        let outcome = PredictionMatcher::new(self.client.as_ref())
            .next_arrival(&query)
            .await?;

        let speech = match outcome {
            ArrivalOutcome::Arrival { station, estimate } => {
                info!(
                    station_code = %station.code,
                    line = %query.line,
                    estimate = %estimate,
                    "Found next train"
                );
                let session = input.attributes.session_attributes_mut();
                session.insert(LAST_STATION.to_string(), Value::from(query.station.as_str()));
                session.insert(LAST_LINE.to_string(), Value::from(query.line.as_str()));
                session.insert(
                    LAST_DIRECTION.to_string(),
                    Value::from(query.direction.as_str()),
                );
                arrival_speech(&query, estimate)
            }
            ArrivalOutcome::RouteNotFound { .. } => format!(
                "Your direction {} or line color {} is not valid for the starting station {}.",
                query.direction, query.line, query.station
            ),
            ArrivalOutcome::StationNotFound => {
                format!("We could not find the station: {}.", query.station)
            }
        };

        Ok(ResponseBuilder::new().speak(&speech).get_response())
    }
}
