use reqwest::StatusCode;

/// Errors raised while talking to the media backend
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request failed with status {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid rating: {0} (expected 0.5 to 5 in steps of 0.5)")]
    InvalidRating(f64),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
