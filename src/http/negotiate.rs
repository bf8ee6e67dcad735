//! Response negotiation contract.
//!
//! Negotiators turn a model into response bytes. Overrides are consulted in
//! registration order against the request's Accept media types; the JSON
//! negotiator is the fallback.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::BoxError;
use serde_json::Value;

use crate::http::HttpContext;

/// Writes a model into the response for the media types it supports.
pub trait ResponseNegotiator: Send + Sync {
    /// Whether this negotiator can produce the given media type (e.g. `application/json`).
    fn can_handle(&self, media_type: &str) -> bool;

    /// Serialize `model` into the context's response.
    fn write(&self, ctx: &mut HttpContext, model: &Value) -> Result<(), BoxError>;
}

/// Default negotiator producing `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNegotiator;

impl ResponseNegotiator for JsonNegotiator {
    fn can_handle(&self, media_type: &str) -> bool {
        media_type == "*/*" || media_type == "application/*" || media_type.ends_with("json")
    }

    fn write(&self, ctx: &mut HttpContext, model: &Value) -> Result<(), BoxError> {
        let bytes = serde_json::to_vec(model)?;
        ctx.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        ctx.write(&bytes);
        Ok(())
    }
}

/// Ordered overrides plus a fallback.
#[derive(Clone)]
pub struct Negotiators {
    overrides: Vec<Arc<dyn ResponseNegotiator>>,
    fallback: Arc<dyn ResponseNegotiator>,
}

impl Default for Negotiators {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Negotiators {
    pub fn new(overrides: Vec<Arc<dyn ResponseNegotiator>>) -> Self {
        Self {
            overrides,
            fallback: Arc::new(JsonNegotiator),
        }
    }

    /// Pick a negotiator for the raw Accept header value.
    pub fn select(&self, accept: Option<&str>) -> Arc<dyn ResponseNegotiator> {
        let media_types = accept
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(|item| item.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .filter(|media| !media.is_empty());

        for media in media_types {
            if let Some(found) = self.overrides.iter().find(|n| n.can_handle(&media)) {
                return Arc::clone(found);
            }
        }
        Arc::clone(&self.fallback)
    }
}
