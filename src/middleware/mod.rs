//! Middleware layer.
//!
//! Middleware is the place for cross-cutting concerns: transaction-id
//! tagging, body decoding, per-route transaction logging, payload
//! sanitizing. Every stage is synchronous. It either lets the request
//! continue or answers it on the spot:
//!
//! ```text
//! tag_transaction → parse_body → [route: log_transaction → sanitize_request] → handler
//! ```
//!
//! A stage returning [`Flow::Respond`] short-circuits: no later stage and no
//! handler runs for that request.
//!
//! Any `Fn(&mut Request) -> Flow` is a [`Middleware`]:
//!
//! ```rust
//! use courier::middleware::{Flow, Pipeline, sanitize_request, tag_transaction};
//! use courier::Request;
//!
//! let pipeline = Pipeline::new()
//!     .then(tag_transaction)
//!     .then(|req: &mut Request| {
//!         if req.path().starts_with("/internal") {
//!             Flow::Respond(courier::Response::status(courier::StatusCode::FORBIDDEN))
//!         } else {
//!             Flow::Continue
//!         }
//!     })
//!     .then(sanitize_request);
//! # let _ = pipeline;
//! ```

use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

mod body;
pub mod sanitize;
mod transaction;

pub use body::parse_body;
pub use sanitize::{sanitize_request, ValidationError};
pub use transaction::{tag_transaction, TransactionId, TransactionLogger, TX_ID_HEADER};

/// What a middleware stage decided.
pub enum Flow {
    /// Hand the request to the next stage.
    Continue,
    /// Answer now; nothing downstream runs.
    Respond(Response),
}

/// A synchronous request-processing stage.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: &mut Request) -> Flow;
}

impl<F> Middleware for F
where
    F: Fn(&mut Request) -> Flow + Send + Sync + 'static,
{
    fn handle(&self, req: &mut Request) -> Flow {
        self(req)
    }
}

/// An ordered chain of middleware. Cheap to clone.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Returns `self` for chaining.
    pub fn then(mut self, stage: impl Middleware) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: impl Middleware) {
        self.stages.push(Arc::new(stage));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order, stopping at the first that responds.
    pub fn run(&self, req: &mut Request) -> Flow {
        for stage in &self.stages {
            if let Flow::Respond(res) = stage.handle(req) {
                return Flow::Respond(res);
            }
        }
        Flow::Continue
    }
}
