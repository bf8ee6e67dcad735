//! Per-request context handed to hooks and handlers.
//!
//! # Responsibilities
//! - Expose the request head, path parameters and (lazily) the body
//! - Carry the response under construction
//! - Route model serialization through the configured negotiators
//!
//! # Design Decisions
//! - One context per request, owned by that request's task
//! - The request body is read at most once and cached
//! - Path parameters come from the router match; empty outside a matched route

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use axum::{BoxError, RequestPartsExt};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sync_wrapper::SyncWrapper;

use crate::error::BodyError;
use crate::http::response::ResponseState;
use crate::services::Services;

#[derive(Debug)]
enum RequestBody {
    Pending(Body),
    Buffered(Bytes),
}

/// Request and response state for one request.
pub struct HttpContext {
    parts: Parts,
    // `Body` is not `Sync`; only ever touched through `&mut self`.
    body: SyncWrapper<RequestBody>,
    params: HashMap<String, String>,
    response: ResponseState,
    services: Arc<Services>,
}

impl HttpContext {
    /// Build a context from an incoming request.
    pub async fn from_request(request: Request, services: Arc<Services>) -> Self {
        let (mut parts, body) = request.into_parts();
        let params = match parts.extract::<Path<HashMap<String, String>>>().await {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };

        Self {
            parts,
            body: SyncWrapper::new(RequestBody::Pending(body)),
            params,
            response: ResponseState::new(),
            services,
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// A path parameter captured by the route template.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn extensions(&self) -> &axum::http::Extensions {
        &self.parts.extensions
    }

    /// Read the whole request body, up to the configured limit.
    pub async fn read_body(&mut self) -> Result<Bytes, BodyError> {
        let pending = match self.body.get_mut() {
            RequestBody::Buffered(bytes) => return Ok(bytes.clone()),
            RequestBody::Pending(body) => std::mem::take(body),
        };

        let bytes = axum::body::to_bytes(pending, self.services.body_limit()).await?;
        *self.body.get_mut() = RequestBody::Buffered(bytes.clone());
        Ok(bytes)
    }

    /// Deserialize the request body as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, BodyError> {
        let bytes = self.read_body().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.set_status(status);
    }

    pub fn response_headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers_mut().insert(name, value);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.response.write(bytes);
    }

    pub fn write_str(&mut self, text: &str) {
        self.response.write(text.as_bytes());
    }

    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseState {
        &mut self.response
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Serialize `model` with the negotiator matching the Accept header.
    pub fn negotiate<T: Serialize>(&mut self, model: &T) -> Result<(), BoxError> {
        let value = serde_json::to_value(model)?;
        let accept = self
            .parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        let negotiator = self.services.negotiators().select(accept);
        negotiator.write(self, &value)
    }

    /// Hand the request back to the host, keeping the response state aside.
    ///
    /// The returned head (method, uri, version, headers) is a copy for hooks
    /// that run after the downstream stage.
    pub(crate) fn into_request(self) -> (Request, Parts, ResponseState, Arc<Services>) {
        let mut head = Request::new(());
        *head.method_mut() = self.parts.method.clone();
        *head.uri_mut() = self.parts.uri.clone();
        *head.version_mut() = self.parts.version;
        *head.headers_mut() = self.parts.headers.clone();
        let (head, ()) = head.into_parts();

        let body = match self.body.into_inner() {
            RequestBody::Pending(body) => body,
            RequestBody::Buffered(bytes) => Body::from(bytes),
        };
        (
            Request::from_parts(self.parts, body),
            head,
            self.response,
            self.services,
        )
    }

    /// Rebuild a context around a request head and the response produced downstream.
    ///
    /// The context is always returned. If the downstream body cannot be read,
    /// its response is an empty 500 and the read failure comes back alongside.
    pub(crate) async fn after_downstream(
        head: Parts,
        mut response_state: ResponseState,
        downstream: Response,
        services: Arc<Services>,
    ) -> (Self, Option<BodyError>) {
        let failure = match response_state.absorb(downstream).await {
            Ok(()) => None,
            Err(e) => {
                response_state = ResponseState::new();
                response_state.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                Some(e)
            }
        };

        let ctx = Self {
            parts: head,
            body: SyncWrapper::new(RequestBody::Buffered(Bytes::new())),
            params: HashMap::new(),
            response: response_state,
            services,
        };
        (ctx, failure)
    }

    /// Convert into the response sent to the client.
    pub fn into_response(self) -> Response {
        let head = self.parts.method == Method::HEAD;
        self.response.into_response(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn request(method: Method, uri: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Note {
        text: String,
    }

    #[tokio::test]
    async fn test_body_read_once_and_cached() {
        let mut ctx = HttpContext::from_request(
            request(Method::POST, "/notes", r#"{"text":"hi"}"#),
            Arc::new(Services::default()),
        )
        .await;

        let note: Note = ctx.json().await.unwrap();
        assert_eq!(note, Note { text: "hi".into() });
        let again = ctx.read_body().await.unwrap();
        assert_eq!(&again[..], br#"{"text":"hi"}"#);
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let services = Services::new(Default::default(), Default::default(), 4);
        let mut ctx =
            HttpContext::from_request(request(Method::POST, "/", "too long"), Arc::new(services)).await;
        assert!(matches!(ctx.read_body().await, Err(BodyError::Read(_))));
    }

    #[tokio::test]
    async fn test_negotiate_defaults_to_json() {
        let mut ctx =
            HttpContext::from_request(request(Method::GET, "/", ""), Arc::new(Services::default())).await;
        ctx.negotiate(&serde_json::json!({ "ok": true })).unwrap();

        assert_eq!(
            ctx.response_headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert_eq!(ctx.response().body(), br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_request_round_trip_keeps_buffered_body() {
        let mut ctx = HttpContext::from_request(
            request(Method::PUT, "/a?b=c", "payload"),
            Arc::new(Services::default()),
        )
        .await;
        ctx.read_body().await.unwrap();
        ctx.insert_header(HeaderName::from_static("x-before"), HeaderValue::from_static("1"));

        let (req, head, state, _services) = ctx.into_request();
        assert_eq!(head.method, Method::PUT);
        assert_eq!(head.uri, "/a?b=c");
        assert_eq!(state.headers().get("x-before").unwrap(), "1");

        let body = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"payload");
    }
}
