//! courier service binary.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl -i http://localhost:8081/api/v1/healthcheck
//!   curl -i 'http://localhost:8081/api/v1/healthcheck?q=%3Cscript%3E'

use std::sync::Arc;

use courier::controller::HealthCheckController;
use courier::logger::{AppLogger, TracingLogger};
use courier::{App, AppConfig, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), courier::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    let sink: Arc<dyn AppLogger> = Arc::new(TracingLogger::new(&config.logger_config()));

    let app = App::new(Arc::clone(&config), Arc::clone(&sink))
        .controller(HealthCheckController::new(Arc::clone(&config), sink));

    Server::bind(&format!("0.0.0.0:{}", config.env_config.port))?
        .serve(app)
        .await
}
