use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to commsec daemon failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid daemon URL: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("daemon returned HTTP {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl ApiError {
    /// True when the daemon is up but has no active key generation yet
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::HttpStatus(StatusCode::SERVICE_UNAVAILABLE, _))
    }
}
