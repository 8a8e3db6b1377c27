//! Transit prediction client.
//!
//! Defines the `TransitQueryClient` contract the skill depends on and the
//! `WmataClient` implementation that talks to the WMATA rail API.

pub mod error;
pub mod wmata;

use async_trait::async_trait;

use metro_core::types::{Prediction, Station};

pub use error::ClientError;
pub use wmata::WmataClient;

/// Remote source of station metadata and live arrival predictions.
///
/// Implementations do not cache or retry. Any failure is returned as-is.
#[async_trait]
pub trait TransitQueryClient: Send + Sync {
    /// The full station directory.
    async fn list_stations(&self) -> Result<Vec<Station>, ClientError>;

    /// Live predictions for one station.
    async fn get_predictions(&self, station_code: &str) -> Result<Vec<Prediction>, ClientError>;
}
