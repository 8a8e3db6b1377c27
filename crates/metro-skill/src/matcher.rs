//! Arrival prediction matching.
//!
//! Comparison rules differ per field and are not interchangeable:
//! station names and destinations compare case-insensitively, line codes
//! compare exactly.

use tracing::debug;

use metro_client::{ClientError, TransitQueryClient};
use metro_core::types::{ArrivalEstimate, Prediction, Station};

/// A request for the next train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainQuery {
    pub station: String,
    pub line: String,
    pub direction: String,
}

/// Result of matching a query against live predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalOutcome {
    Arrival {
        station: Station,
        estimate: ArrivalEstimate,
    },
    StationNotFound,
    /// The station exists but no train matches the line and direction.
    RouteNotFound { station: Station },
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Every station whose name matches `name`, ignoring case, in directory order.
///
/// Transfer stations are listed once per platform, so one name can map to
/// several codes.
pub fn find_stations<'a>(stations: &'a [Station], name: &str) -> Vec<&'a Station> {
    stations
        .iter()
        .filter(|s| eq_ignore_case(&s.name, name))
        .collect()
}

/// Predictions on `line` (exact) heading to `direction` (any case).
pub fn matching_predictions<'a>(
    predictions: &'a [Prediction],
    line: &'a str,
    direction: &'a str,
) -> impl Iterator<Item = &'a Prediction> + 'a {
    predictions
        .iter()
        .filter(move |p| p.line == line && eq_ignore_case(&p.destination_name, direction))
}

/// Soonest estimate among the matching predictions.
///
/// Trains without an estimate are skipped; `None` means nothing matched.
pub fn soonest_arrival(
    predictions: &[Prediction],
    line: &str,
    direction: &str,
) -> Option<ArrivalEstimate> {
    matching_predictions(predictions, line, direction)
        .filter_map(|p| p.minutes_until_arrival)
        .min()
}

/// Runs a `TrainQuery` against a transit client.
pub struct PredictionMatcher<'c> {
    client: &'c dyn TransitQueryClient,
}

impl<'c> PredictionMatcher<'c> {
    pub fn new(client: &'c dyn TransitQueryClient) -> Self {
        Self { client }
    }

    /// Look up the station, fetch its predictions and pick the soonest train.
    ///
    /// Platforms sharing the station name are queried in directory order and
    /// the first one with a matching train answers.
    pub async fn next_arrival(&self, query: &TrainQuery) -> Result<ArrivalOutcome, ClientError> {
        let stations = self.client.list_stations().await?;
        let candidates = find_stations(&stations, &query.station);
        let Some(first) = candidates.first() else {
            debug!(station = %query.station, "No station with that name");
            return Ok(ArrivalOutcome::StationNotFound);
        };

        for station in &candidates {
            let predictions = self.client.get_predictions(&station.code).await?;
            if let Some(estimate) = soonest_arrival(&predictions, &query.line, &query.direction) {
                debug!(
                    station_code = %station.code,
                    predictions = predictions.len(),
                    estimate = %estimate,
                    "Matched predictions"
                );
                return Ok(ArrivalOutcome::Arrival {
                    station: (*station).clone(),
                    estimate,
                });
            }
        }

        debug!(
            station = %first.name,
            platforms = candidates.len(),
            "No matching train on any platform"
        );
        Ok(ArrivalOutcome::RouteNotFound {
            station: (*first).clone(),
        })
    }
}
