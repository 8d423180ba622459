//! The application: router, global middleware, and the centralized error
//! handler.
//!
//! Per request:
//!
//! 1. Route lookup, so path params are available to every stage.
//! 2. Global pipeline: [`tag_transaction`], then [`parse_body`], then any
//!    stage added with [`App::layer`].
//! 3. The matched route's own pipeline, then its handler. Unknown routes
//!    become `404 Not Found`.
//! 4. Deferred [`ApiError`]s are rendered with the transaction id, the id is
//!    echoed in `x-transaction-id`, and an audit line is written.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::config::AppConfig;
use crate::controller::Controller;
use crate::error::ApiError;
use crate::logger::{AppLogger, ModuleLogger, Severity};
use crate::middleware::{parse_body, tag_transaction, Flow, Middleware, Pipeline, TransactionId, TX_ID_HEADER};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;

pub struct App {
    router: Router,
    pipeline: Pipeline,
    logger: ModuleLogger,
    audit: ModuleLogger,
    audit_excluded: Vec<String>,
}

impl App {
    /// Creates the application with the default global pipeline and a
    /// `GET /` banner naming the service.
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn AppLogger>) -> Self {
        let logger = ModuleLogger::new("App", Arc::clone(&sink));
        logger.info("Initializing application");

        let banner = format!("{} is running", config.env_config.service_name);
        let router = Router::new().get("/", move |_req: Request| {
            let banner = banner.clone();
            async move { Response::text(banner) }
        });

        Self {
            router,
            pipeline: Pipeline::new().then(tag_transaction).then(parse_body),
            logger,
            audit: ModuleLogger::new("Audit", sink),
            audit_excluded: config.env_config.audit_log_excluded_paths.clone(),
        }
    }

    /// Appends a stage to the global pipeline.
    pub fn layer(mut self, stage: impl Middleware) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Mounts a controller's routes.
    pub fn controller(mut self, controller: impl Controller) -> Self {
        self.logger.info(&format!(
            "Initializing '{}' controller at path '{}'",
            controller.name(),
            controller.base_path()
        ));
        self.router = controller.routes(self.router);
        self
    }

    /// Registers routes directly, outside any controller.
    pub fn routes(mut self, register: impl FnOnce(Router) -> Router) -> Self {
        self.router = register(self.router);
        self
    }

    /// Runs one request through the full pipeline.
    pub async fn handle(&self, mut req: Request) -> Response {
        let started = Instant::now();
        let method = req.method();
        let path = req.path().to_owned();

        let route = self.router.lookup(method, &path).map(|(route, params)| {
            req.set_params(params);
            route
        });

        let flow = self.pipeline.run(&mut req);
        let tx_id = req.tx_id().copied();

        let response = match flow {
            Flow::Respond(res) => res,
            Flow::Continue => match route {
                None => ApiError::NotFound(format!("{method} {path}")).into_response(),
                Some(route) => match route.pipeline.run(&mut req) {
                    Flow::Respond(res) => res,
                    Flow::Continue => {
                        let tx = tx_id.map(|t| t.to_string()).unwrap_or_default();
                        self.logger.sink().log(Severity::Info, &format!("[transactionId] {tx}"), &[]);
                        route.handler.call(req).await
                    }
                },
            },
        };
        let response = self.finish(response, tx_id);

        if !self.audit_excluded.iter().any(|p| p == &path) {
            self.audit.info(&format!(
                "{method} {path} {} {}ms TxId {}",
                response.status_code().as_u16(),
                started.elapsed().as_millis(),
                tx_id.map(|t| t.to_string()).unwrap_or_default(),
            ));
        }
        response
    }

    /// Centralized error handler: renders deferred [`ApiError`]s and stamps
    /// the transaction id.
    fn finish(&self, mut res: Response, tx_id: Option<TransactionId>) -> Response {
        if let Some(err) = res.error.take() {
            let status = res.status_code();
            let tx = tx_id.map(|t| t.to_string());
            self.logger.error(
                &err.to_string(),
                &[json!({ "transactionId": tx, "status": status.as_u16() })],
            );
            res = Response::json_value(status, &err.into_body(tx));
        }
        if let Some(id) = tx_id {
            res.insert_header(TX_ID_HEADER, id.header_value());
        }
        res
    }
}
