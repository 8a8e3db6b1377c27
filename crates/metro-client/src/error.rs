//! Error types for the transit client.

/// Failures talking to the transit service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transit request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transit service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed transit payload: {0}")]
    Decode(String),
    #[error("invalid station code: {0:?}")]
    InvalidStationCode(String),
    #[error("client configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Status {
            status: 401,
            body: "Access denied".to_string(),
        };
        assert_eq!(err.to_string(), "transit service returned 401: Access denied");

        let err = ClientError::Decode("missing field `Trains`".to_string());
        assert_eq!(
            err.to_string(),
            "malformed transit payload: missing field `Trains`"
        );

        let err = ClientError::InvalidStationCode("".to_string());
        assert_eq!(err.to_string(), "invalid station code: \"\"");
    }

    #[test]
    fn test_client_error_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
