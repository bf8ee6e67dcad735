//! Response under construction.
//!
//! # Responsibilities
//! - Hold status, headers and body bytes written by hooks and handlers
//! - Redirect the body into a capture buffer for HEAD requests
//! - Convert into an axum response for the host
//!
//! # Design Decisions
//! - Bodies are assembled in memory before being handed to the host
//! - Captured (HEAD) bytes are never transmitted, even if the capture is not finished
//! - A stale Content-Length is dropped on conversion; hyper recomputes it from the body

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::{Bytes, BytesMut};

use crate::error::BodyError;

/// Where body writes go.
#[derive(Debug)]
enum BodySink {
    /// Bytes destined for the client.
    Transport(BytesMut),
    /// Bytes measured for a HEAD response, then discarded.
    Capture(BytesMut),
}

impl BodySink {
    fn buffer(&self) -> &BytesMut {
        match self {
            BodySink::Transport(buf) | BodySink::Capture(buf) => buf,
        }
    }

    fn buffer_mut(&mut self) -> &mut BytesMut {
        match self {
            BodySink::Transport(buf) | BodySink::Capture(buf) => buf,
        }
    }
}

/// Status, headers and body of the response being built for one request.
#[derive(Debug)]
pub struct ResponseState {
    status: StatusCode,
    headers: HeaderMap,
    sink: BodySink,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseState {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            sink: BodySink::Transport(BytesMut::new()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.sink.buffer_mut().extend_from_slice(bytes);
    }

    /// Bytes written so far, captured or not.
    pub fn body(&self) -> &[u8] {
        self.sink.buffer()
    }

    pub fn body_len(&self) -> usize {
        self.sink.buffer().len()
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.sink, BodySink::Capture(_))
    }

    /// Redirect subsequent writes into an in-memory capture buffer.
    pub(crate) fn begin_capture(&mut self) {
        if let BodySink::Transport(buf) = &mut self.sink {
            let written = std::mem::take(buf);
            self.sink = BodySink::Capture(written);
        }
    }

    /// Measure and discard the captured body, recording its length in Content-Length.
    ///
    /// Returns the measured length, or `None` if no capture was in progress.
    pub(crate) fn finish_capture(&mut self) -> Option<usize> {
        let BodySink::Capture(buf) = &mut self.sink else {
            return None;
        };
        let len = buf.len();
        buf.clear();
        self.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        self.sink = BodySink::Transport(BytesMut::new());
        Some(len)
    }

    /// Take over a downstream response: its status, its headers (overriding
    /// same-named ones already set) and its body.
    pub(crate) async fn absorb(&mut self, response: Response) -> Result<(), BodyError> {
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await?;
        self.status = parts.status;
        self.headers.extend(parts.headers);
        self.sink = BodySink::Transport(BytesMut::from(&bytes[..]));
        Ok(())
    }

    /// Convert into an axum response. `head` keeps an explicit Content-Length
    /// alongside the empty body.
    pub fn into_response(self, head: bool) -> Response {
        let body = match self.sink {
            BodySink::Transport(buf) if !head => Body::from(buf.freeze()),
            _ => Body::from(Bytes::new()),
        };

        let mut headers = self.headers;
        if !head {
            headers.remove(header::CONTENT_LENGTH);
        }

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}
