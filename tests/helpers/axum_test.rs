// ABOUTME: Oneshot request helpers for exercising the axum router without a listener
// ABOUTME: Captures status, headers and body; reads SSE streams one frame at a time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use futures_util::StreamExt;
use serde::Serialize;
use tower::ServiceExt;

/// How long `send_sse` waits for the first frame of an event stream
const SSE_FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// Request builder driven through `Router::oneshot`
pub struct AxumTestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl AxumTestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Attach a JSON body and content type
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Attach a raw body without touching the content type
    pub fn raw_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }
        builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request")
    }

    /// Execute the request and read the whole body
    pub async fn send(self, app: Router) -> AxumTestResponse {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        AxumTestResponse {
            status,
            headers,
            body,
        }
    }

    /// Execute a request against an event stream and read at most one frame
    ///
    /// The stream never ends, so an empty body after the timeout is normal.
    pub async fn send_sse(self, app: Router) -> AxumTestResponse {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let mut frames = response.into_body().into_data_stream();
        let body = match tokio::time::timeout(SSE_FIRST_FRAME_TIMEOUT, frames.next()).await {
            Ok(Some(Ok(bytes))) => bytes.to_vec(),
            Ok(Some(Err(_)) | None) | Err(_) => Vec::new(),
        };
        AxumTestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Buffered response
pub struct AxumTestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AxumTestResponse {
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json<T: serde::de::DeserializeOwned>(self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }

    pub fn text(self) -> String {
        String::from_utf8(self.body).expect("Failed to decode response as UTF-8")
    }

    /// `error.code` from an error envelope
    pub fn error_code(self) -> String {
        let body: serde_json::Value = self.json();
        body["error"]["code"]
            .as_str()
            .expect("Response is not an error envelope")
            .to_owned()
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected}, got {}: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json};

    #[tokio::test]
    async fn test_json_round_trip_through_router() {
        let app = Router::new().route(
            "/echo",
            axum::routing::post(|Json(body): Json<serde_json::Value>| async move {
                Json(serde_json::json!({ "received": body }))
            }),
        );
        let response = AxumTestRequest::post("/echo")
            .json(&serde_json::json!({ "name": "양파" }))
            .send(app)
            .await
            .assert_status(StatusCode::OK);
        assert_eq!(response.header("content-type"), Some("application/json"));
        let json: serde_json::Value = response.json();
        assert_eq!(json["received"]["name"], "양파");
    }

    #[tokio::test]
    async fn test_headers_reach_the_handler() {
        let app = Router::new().route(
            "/header",
            get(|headers: HeaderMap| async move {
                headers
                    .get("x-client")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("missing")
                    .to_owned()
            }),
        );
        let response = AxumTestRequest::get("/header")
            .header("x-client", "mobile")
            .send(app)
            .await;
        assert_eq!(response.text(), "mobile");
    }
}
