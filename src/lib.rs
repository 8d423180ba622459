//! # courier
//!
//! Service scaffold for a notification backend. A radix-tree router on
//! hyper, YAML configuration, controllers, email templates, and a
//! middleware pipeline that makes every request traceable:
//!
//! - **Transaction tagging**: every request gets a fresh UUID, visible to
//!   handlers via [`Request::tx_id`], in the `x-transaction-id` header both
//!   ways, in log lines, and in every error body.
//! - **Transaction logging**: per-route lines keyed by that id, with a JSON
//!   snapshot of body, params and query.
//! - **Payload sanitizing**: nested input is flattened and scanned for
//!   bracketed, braced or angle-bracketed content before handlers see it.
//!
//! ## The contract
//!
//! A reverse proxy sits in front. TLS, CORS, rate limiting and body-size
//! limits belong to it; courier does not duplicate them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use courier::controller::HealthCheckController;
//! use courier::logger::{AppLogger, TracingLogger};
//! use courier::middleware::{sanitize_request, Pipeline};
//! use courier::{App, AppConfig, Method, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), courier::Error> {
//!     let config = Arc::new(AppConfig::from_env()?);
//!     let sink: Arc<dyn AppLogger> = Arc::new(TracingLogger::new(&config.logger_config()));
//!
//!     let app = App::new(Arc::clone(&config), Arc::clone(&sink))
//!         .controller(HealthCheckController::new(Arc::clone(&config), sink))
//!         .routes(|r| r.on_with(Method::Post, "/notify", Pipeline::new().then(sanitize_request), notify));
//!
//!     Server::bind("0.0.0.0:8081")?.serve(app).await
//! }
//!
//! async fn notify(req: Request) -> Response {
//!     Response::text(format!("queued {}", req.tx_id().map(ToString::to_string).unwrap_or_default()))
//! }
//! ```

mod app;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod controller;
pub mod logger;
pub mod middleware;
pub mod templates;

pub use app::App;
pub use config::AppConfig;
pub use error::{ApiError, Error};
pub use handler::Handler;
pub use http::StatusCode;
pub use method::Method;
pub use middleware::{TransactionId, ValidationError};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
