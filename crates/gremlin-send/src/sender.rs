use std::collections::HashMap;

use reqwest::{
    Method,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::SendError;

/// Outbound request description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Sent as a JSON document when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Upstream response. `headers` keeps the first value of each header name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResult {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// Parsed JSON when the upstream body is JSON, otherwise the body as a string.
    pub body: Value,
}

/// Thin forwarding client over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpSender {
    client: reqwest::Client,
}

impl HttpSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn send(&self, req: &SendRequest) -> Result<SendResult, SendError> {
        let method = Method::from_bytes(req.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| SendError::InvalidMethod(req.method.clone()))?;
        let headers = build_headers(&req.headers)?;

        let mut builder = self.client.request(method.clone(), &req.url).headers(headers);
        if let Some(body) = &req.body {
            let bytes = serde_json::to_vec(body)?;
            if !req.headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(bytes);
        }

        debug!(target: "gremlin.send", %method, url = %req.url, "forwarding request");
        let response = builder.send().await?;

        let status_code = response.status().as_u16();
        let headers = first_values(response.headers());
        let raw = response.bytes().await?;
        let body = serde_json::from_slice(&raw)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&raw).into_owned()));

        debug!(target: "gremlin.send", status_code, "upstream responded");
        Ok(SendResult {
            status_code,
            headers,
            body,
        })
    }
}

/// Builds `http://<host>/<path>?<query>` from a `host/path` capture.
pub fn forward_url(target: &str, query: Option<&str>) -> String {
    let (host, path) = target.split_once('/').unwrap_or((target, ""));
    let mut url = format!("http://{host}/{path}");
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

fn build_headers(raw: &HashMap<String, String>) -> Result<HeaderMap, SendError> {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (name, value) in raw {
        let invalid = |reason: String| SendError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn first_values(headers: &HeaderMap) -> HashMap<String, String> {
    let mut out = HashMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        if let Some(value) = headers.get(name) {
            out.insert(
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::any};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn forward_url_splits_host_and_path() {
        assert_eq!(
            forward_url("example.com/api/v1", Some("a=1&b=2")),
            "http://example.com/api/v1?a=1&b=2"
        );
        assert_eq!(forward_url("example.com", None), "http://example.com/");
        assert_eq!(forward_url("host:8080/x", Some("")), "http://host:8080/x");
    }

    #[tokio::test]
    async fn invalid_method_is_rejected_before_sending() {
        let req = SendRequest {
            url: "http://127.0.0.1:1/".into(),
            method: "NOT A METHOD".into(),
            headers: HashMap::new(),
            body: None,
        };
        let err = HttpSender::new().send(&req).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidMethod(_)));
    }

    #[tokio::test]
    async fn invalid_header_is_rejected() {
        let req = SendRequest {
            url: "http://127.0.0.1:1/".into(),
            method: "GET".into(),
            headers: HashMap::from([("bad header".to_string(), "x".to_string())]),
            body: None,
        };
        let err = HttpSender::new().send(&req).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidHeader { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn json_body_round_trips_through_upstream() {
        let base = serve(Router::new().route(
            "/echo",
            any(|Json(body): Json<Value>| async move {
                (StatusCode::CREATED, [("x-upstream", "yes")], Json(body))
            }),
        ))
        .await;

        let req = SendRequest {
            url: format!("{base}/echo"),
            method: "post".into(),
            headers: HashMap::new(),
            body: Some(json!({"hello": "world"})),
        };
        let result = HttpSender::new().send(&req).await.unwrap();

        assert_eq!(result.status_code, 201);
        assert_eq!(result.body, json!({"hello": "world"}));
        assert_eq!(result.headers.get("x-upstream").map(String::as_str), Some("yes"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn non_json_body_falls_back_to_text() {
        let base = serve(Router::new().route("/plain", any(|| async { "just text" }))).await;

        let req = SendRequest {
            url: format!("{base}/plain"),
            method: "GET".into(),
            headers: HashMap::new(),
            body: None,
        };
        let result = HttpSender::new().send(&req).await.unwrap();

        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, Value::String("just text".into()));
    }
}
