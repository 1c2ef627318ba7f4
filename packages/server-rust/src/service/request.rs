//! Adapts an axum request into a [`RequestSource`] for the binder.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{RawPathParams, Request};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use bytes::Bytes;
use dynapi_core::{BindError, RequestSource};
use http_body_util::LengthLimitError;

/// Request data captured for parameter binding.
///
/// Owns the body until the binder reads it; everything else is copied out
/// of the request head up front.
pub struct HttpRequest {
    query: Vec<(String, String)>,
    route: Vec<(String, String)>,
    content_length: Option<u64>,
    content_type: Option<String>,
    body: Option<Body>,
}

impl HttpRequest {
    /// Builds the binder view of `request`, with already-extracted query
    /// pairs and route parameters.
    #[must_use]
    pub fn new(query: Vec<(String, String)>, params: &RawPathParams, request: Request) -> Self {
        let route = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let headers = request.headers();
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            query,
            route,
            content_length,
            content_type,
            body: Some(request.into_body()),
        }
    }

    /// Builds a request from its parts directly.
    #[must_use]
    pub fn from_parts(
        query: Vec<(String, String)>,
        route: Vec<(String, String)>,
        content_type: Option<String>,
        body: Option<Bytes>,
    ) -> Self {
        let content_length = body.as_ref().map(|b| b.len() as u64);
        Self {
            query,
            route,
            content_length,
            content_type,
            body: body.map(Body::from),
        }
    }
}

#[async_trait]
impl RequestSource for HttpRequest {
    fn query(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    fn route_value(&self, name: &str) -> Option<String> {
        self.route
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn read_body(&mut self, limit: usize) -> Result<Bytes, BindError> {
        let Some(body) = self.body.take() else {
            return Ok(Bytes::new());
        };
        axum::body::to_bytes(body, limit)
            .await
            .map_err(|err| classify_body_error(&err, limit))
    }
}

fn classify_body_error(err: &axum::Error, limit: usize) -> BindError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return BindError::PayloadTooLarge { limit };
        }
        source = e.source();
    }
    BindError::InvalidBody {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn query_values_are_joined_in_order() {
        let request = HttpRequest::from_parts(
            pairs(&[("tag", "a"), ("id", "1"), ("tag", "b")]),
            Vec::new(),
            None,
            None,
        );
        assert_eq!(request.query("tag").as_deref(), Some("a,b"));
        assert_eq!(request.query("id").as_deref(), Some("1"));
        assert_eq!(request.query("missing"), None);
    }

    #[test]
    fn route_values_and_headers() {
        let request = HttpRequest::from_parts(
            Vec::new(),
            pairs(&[("tenant", "acme")]),
            Some("application/json".to_string()),
            Some(Bytes::from_static(b"{}")),
        );
        assert_eq!(request.route_value("tenant").as_deref(), Some("acme"));
        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.content_length(), Some(2));
    }

    #[tokio::test]
    async fn read_body_enforces_limit() {
        let mut request = HttpRequest::from_parts(
            Vec::new(),
            Vec::new(),
            Some("application/json".to_string()),
            Some(Bytes::from(vec![b' '; 64])),
        );
        let err = request.read_body(16).await.unwrap_err();
        assert!(matches!(err, BindError::PayloadTooLarge { limit: 16 }));
    }

    #[tokio::test]
    async fn read_body_returns_bytes_once() {
        let mut request = HttpRequest::from_parts(
            Vec::new(),
            Vec::new(),
            None,
            Some(Bytes::from_static(b"[1]")),
        );
        assert_eq!(request.read_body(1024).await.unwrap(), Bytes::from_static(b"[1]"));
        assert!(request.read_body(1024).await.unwrap().is_empty());
    }
}
