//! WMATA rail API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use metro_core::config::TransitConfig;
use metro_core::types::{Prediction, Station};

use crate::{ClientError, TransitQueryClient};

const STATIONS_PATH: &str = "/Rail.svc/json/jStations";
const PREDICTIONS_PATH: &str = "/StationPrediction.svc/json/GetPrediction";
const API_KEY_HEADER: &str = "api_key";

/// Longest error body kept in `ClientError::Status`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Deserialize)]
struct StationsResponse {
    #[serde(rename = "Stations")]
    stations: Vec<Station>,
}

#[derive(Deserialize)]
struct PredictionsResponse {
    #[serde(rename = "Trains")]
    trains: Vec<Prediction>,
}

/// HTTP client for the WMATA station list and prediction endpoints.
pub struct WmataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WmataClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, api_key)
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build from the `[transit]` config section.
    pub fn from_config(config: &TransitConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        if config.api_key.is_empty() {
            warn!("transit.api_key is empty; requests will likely be rejected");
        }
        Ok(Self::with_http(http, &config.base_url, &config.api_key))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Transit request");

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl TransitQueryClient for WmataClient {
    async fn list_stations(&self) -> Result<Vec<Station>, ClientError> {
        let parsed: StationsResponse = self.get_json(STATIONS_PATH).await?;
        debug!(count = parsed.stations.len(), "Fetched station list");
        Ok(parsed.stations)
    }

    async fn get_predictions(&self, station_code: &str) -> Result<Vec<Prediction>, ClientError> {
        let code = station_code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ClientError::InvalidStationCode(station_code.to_string()));
        }
        let parsed: PredictionsResponse = self
            .get_json(&format!("{}/{}", PREDICTIONS_PATH, code))
            .await?;
        debug!(station_code = code, count = parsed.trains.len(), "Fetched predictions");
        Ok(parsed.trains)
    }
}
