use thiserror::Error;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to encode body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
}
