use std::collections::BTreeMap;

use axum::{
    Json,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
};
use serde::Serialize;

type MultiMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
pub(crate) struct EchoResponse {
    args: MultiMap,
    headers: MultiMap,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl EchoResponse {
    fn new(args: Vec<(String, String)>, headers: &HeaderMap, uri: &Uri) -> Self {
        let mut grouped = MultiMap::new();
        for (key, value) in args {
            grouped.entry(key).or_default().push(value);
        }
        Self {
            args: grouped,
            headers: header_map(headers),
            url: uri.to_string(),
            data: None,
        }
    }
}

fn header_map(headers: &HeaderMap) -> MultiMap {
    let mut out = MultiMap::new();
    for (name, value) in headers {
        out.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

/// `?status=` picks the reply status; anything unparseable falls back to 200.
fn reply_status(args: &[(String, String)]) -> StatusCode {
    args.iter()
        .find(|(k, _)| k == "status")
        .and_then(|(_, v)| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK)
}

/// GET /echo/get
pub(crate) async fn get(
    Query(args): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    let status = reply_status(&args);
    (status, Json(EchoResponse::new(args, &headers, &uri)))
}

/// POST /echo/post
pub(crate) async fn post(
    Query(args): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let status = reply_status(&args);
    let mut response = EchoResponse::new(args, &headers, &uri);
    response.data = Some(String::from_utf8_lossy(&body).into_owned());
    (status, Json(response))
}
