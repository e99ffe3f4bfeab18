pub(crate) mod about;
pub(crate) mod echo;
pub(crate) mod load;
pub(crate) mod postgres;
pub(crate) mod send;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Decode a JSON body, reporting any failure as a bad request.
pub(crate) fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidRequest("invalid request body".into()))
}
