//! Controllers: groups of routes sharing a base path, a module name and a
//! transaction logger.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::logger::{AppLogger, ModuleLogger};
use crate::middleware::{sanitize_request, Pipeline, TransactionLogger};
use crate::router::Router;

mod health;

pub use health::HealthCheckController;

/// A set of routes mounted on the application router.
pub trait Controller: Send + Sync + 'static {
    /// Human-readable name used in start-up logs.
    fn name(&self) -> &str;

    /// Full mount path, API base URL included.
    fn base_path(&self) -> &str;

    /// Registers this controller's routes.
    fn routes(&self, router: Router) -> Router;
}

pub struct ControllerOptions<'a> {
    pub base_path: &'a str,
    pub module_name: &'a str,
}

/// State every controller carries.
pub struct ControllerBase {
    pub config: Arc<AppConfig>,
    pub base_path: String,
    pub logger: ModuleLogger,
    pub transactions: TransactionLogger,
}

impl ControllerBase {
    pub fn new(config: Arc<AppConfig>, options: ControllerOptions<'_>, sink: Arc<dyn AppLogger>) -> Self {
        let base_path = format!("{}{}", config.env_config.api_base_url, options.base_path);
        let logger = ModuleLogger::new(options.module_name, sink);
        let transactions = TransactionLogger::new(logger.clone());
        Self { config, base_path, logger, transactions }
    }

    /// Route pipeline: transaction line under `label`, then the sanitizer,
    /// so rejected requests are logged too.
    pub fn route_pipeline(&self, label: &str) -> Pipeline {
        Pipeline::new()
            .then(self.transactions.log_transaction(Some(label)))
            .then(sanitize_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;
    use crate::middleware::{tag_transaction, Flow};
    use crate::request::Request;
    use crate::Method;

    const CONFIG: &str = "Environment:\n  name: t\n  apiBaseUrl: /api\n  serviceName: s\nServices:\n  mongo:\n    uri: u\n    dbName: d\n";

    fn base(sink: Arc<MemoryLogger>) -> ControllerBase {
        let config = Arc::new(AppConfig::from_yaml(CONFIG).unwrap());
        ControllerBase::new(config, ControllerOptions { base_path: "/mail", module_name: "Mail" }, sink)
    }

    #[test]
    fn base_path_includes_api_prefix() {
        assert_eq!(base(Arc::new(MemoryLogger::new())).base_path, "/api/mail");
    }

    #[test]
    fn rejected_request_is_still_logged() {
        let sink = Arc::new(MemoryLogger::new());
        let pipeline = base(sink.clone()).route_pipeline("Send Mail");
        let mut req = Request::new(Method::Post, "/api/mail?to=%5Bx%5D");
        tag_transaction(&mut req);

        let Flow::Respond(res) = pipeline.run(&mut req) else { panic!("expected rejection") };
        assert_eq!(res.status_code(), http::StatusCode::BAD_REQUEST);

        let tx = req.tx_id().unwrap().to_string();
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(&format!("[MAIL] TxId {tx} - Send Mail - Request ")));
        assert!(messages[0].contains("[x]"));
    }
}
