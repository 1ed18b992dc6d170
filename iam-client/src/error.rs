use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IamError {
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to send request to IAM: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IAM request failed with status: {0}")]
    InvalidStatus(StatusCode),

    #[error("Failed to parse IAM response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid redirect URL from IAM: '{0}'")]
    InvalidRedirect(String),
}

impl IamError {
    /// Whether the backend call ran out of time before it could answer
    pub fn is_timeout(&self) -> bool {
        matches!(self, IamError::Request(e) if e.is_timeout())
    }
}
