//! Health check.

use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;

use super::{Controller, ControllerBase, ControllerOptions};
use crate::config::AppConfig;
use crate::logger::{AppLogger, ModuleLogger};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// `GET {apiBaseUrl}/healthcheck` → `{"status":"ok","txId":…,"appConfig":…}`.
///
/// Echoes the transaction id so callers can check the id round-trip, and
/// the loaded configuration minus secrets.
pub struct HealthCheckController {
    base: ControllerBase,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Health<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_id: Option<String>,
    app_config: &'a AppConfig,
}

impl HealthCheckController {
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn AppLogger>) -> Self {
        let options = ControllerOptions { base_path: "/healthcheck", module_name: "Health Controller" };
        Self { base: ControllerBase::new(config, options, sink) }
    }
}

impl Controller for HealthCheckController {
    fn name(&self) -> &str {
        "HealthCheckController"
    }

    fn base_path(&self) -> &str {
        &self.base.base_path
    }

    fn routes(&self, router: Router) -> Router {
        let pipeline = self.base.route_pipeline("Get App Health");
        let config = Arc::clone(&self.base.config);
        let logger = self.base.logger.clone();
        router.on_with(Method::Get, &self.base.base_path, pipeline, move |req: Request| {
            let config = Arc::clone(&config);
            let logger = logger.clone();
            async move { get_health(&req, &config, &logger) }
        })
    }
}

fn get_health(req: &Request, config: &AppConfig, logger: &ModuleLogger) -> Response {
    let tx_id = req.tx_id().map(ToString::to_string);
    logger.debug(&format!("Reporting health for TxId {}", tx_id.as_deref().unwrap_or_default()));
    let health = Health { status: "ok", tx_id, app_config: config };
    Response::json_value(StatusCode::OK, &health)
}
