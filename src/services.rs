//! Stateless collaborators shared by every request.

use crate::dispatch::StatusCodeHandlers;
use crate::http::negotiate::Negotiators;

/// Default request body limit (2MB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Status-code handlers, negotiators and limits, built once at startup.
#[derive(Clone)]
pub struct Services {
    status_handlers: StatusCodeHandlers,
    negotiators: Negotiators,
    body_limit: usize,
}

impl Default for Services {
    fn default() -> Self {
        Self::new(StatusCodeHandlers::new(), Negotiators::default(), DEFAULT_BODY_LIMIT)
    }
}

impl Services {
    pub fn new(status_handlers: StatusCodeHandlers, negotiators: Negotiators, body_limit: usize) -> Self {
        Self {
            status_handlers,
            negotiators,
            body_limit,
        }
    }

    pub fn status_handlers(&self) -> &StatusCodeHandlers {
        &self.status_handlers
    }

    pub fn negotiators(&self) -> &Negotiators {
        &self.negotiators
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}
