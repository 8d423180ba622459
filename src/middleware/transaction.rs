//! Transaction tagging and per-route transaction logging.

use std::fmt;

use http::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::Flow;
use crate::logger::{ModuleLogger, Severity};
use crate::request::Request;

/// Header carrying the transaction id, on the request and echoed on the
/// response.
pub const TX_ID_HEADER: HeaderName = HeaderName::from_static("x-transaction-id");

/// Request-scoped correlation id. A random (v4) UUID, fresh per request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub(crate) fn header_value(&self) -> HeaderValue {
        // Hyphenated UUIDs are plain ASCII.
        let mut buf = Uuid::encode_buffer();
        HeaderValue::from_str(self.0.hyphenated().encode_lower(&mut buf))
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Assigns a fresh transaction id to the request.
///
/// Writes it into the `x-transaction-id` header, replacing any value the
/// client sent, and into the request-scoped slot read by
/// [`Request::tx_id`]. Always continues. Must be the first stage of the
/// global pipeline so loggers and error responses can cite the id.
pub fn tag_transaction(req: &mut Request) -> Flow {
    let id = TransactionId::new();
    req.headers.insert(TX_ID_HEADER, id.header_value());
    req.tx_id = Some(id);
    Flow::Continue
}

/// Per-route transaction logging, bound to one module.
///
/// ```rust,ignore
/// let tx = TransactionLogger::new(ModuleLogger::new("Health Controller", sink));
/// router.on_with(Method::Get, "/healthcheck",
///     Pipeline::new().then(tx.log_transaction(Some("Get App Health"))),
///     get_health);
/// ```
#[derive(Clone)]
pub struct TransactionLogger {
    logger: ModuleLogger,
}

impl TransactionLogger {
    pub fn new(logger: ModuleLogger) -> Self {
        Self { logger }
    }

    /// Returns a middleware that logs
    /// `[MODULE] TxId <id> - <label>` at info severity, followed by
    /// ` - Request {"body":…,"params":…,"query":…}` when any of the three
    /// carries data. Never stops the request.
    pub fn log_transaction(&self, label: Option<&str>) -> impl Fn(&mut Request) -> Flow + Send + Sync + 'static {
        let logger = self.logger.clone();
        let label = label.unwrap_or_default().to_owned();
        move |req: &mut Request| {
            let line = transaction_line(logger.module(), &label, req);
            logger.sink().log(Severity::Info, &line, &[]);
            Flow::Continue
        }
    }
}

fn transaction_line(module: &str, label: &str, req: &Request) -> String {
    let tx = req.tx_id().map(ToString::to_string).unwrap_or_default();
    let mut line = format!("[{}] TxId {tx} - {label}", module.to_uppercase());

    let has_params = !req.params().is_empty();
    let has_query = !req.query().is_empty();
    if !is_empty(req.body()) || has_params || has_query {
        line.push_str(" - Request ");
        line.push_str(&req.snapshot().to_string());
    }
    line
}

/// Null and `{}` are empty; every other value carries data.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::logger::MemoryLogger;
    use crate::Method;

    fn logger(sink: &Arc<MemoryLogger>) -> TransactionLogger {
        TransactionLogger::new(ModuleLogger::new("Health Controller", sink.clone()))
    }

    #[test]
    fn tagger_sets_header_and_slot() {
        let mut req = Request::new(Method::Get, "/").with_header("x-transaction-id", "spoofed");
        tag_transaction(&mut req);
        let id = req.tx_id().unwrap().to_string();
        assert_eq!(req.header("x-transaction-id"), Some(id.as_str()));
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 4);
    }

    #[test]
    fn ids_do_not_collide() {
        let ids: HashSet<TransactionId> = (0..100_000).map(|_| TransactionId::new()).collect();
        assert_eq!(ids.len(), 100_000);
    }

    #[test]
    fn line_without_input_has_no_snapshot() {
        let sink = Arc::new(MemoryLogger::new());
        let mut req = Request::new(Method::Get, "/healthcheck");
        tag_transaction(&mut req);
        let tx = req.tx_id().unwrap().to_string();

        logger(&sink).log_transaction(Some("Get App Health"))(&mut req);

        assert_eq!(
            sink.messages(),
            vec![format!("[HEALTH CONTROLLER] TxId {tx} - Get App Health")]
        );
    }

    #[test]
    fn line_with_input_appends_snapshot() {
        let sink = Arc::new(MemoryLogger::new());
        let mut req = Request::new(Method::Post, "/mail?lang=en").with_json(json!({ "to": "a@b.c" }));
        tag_transaction(&mut req);

        logger(&sink).log_transaction(Some("Send"))(&mut req);

        let messages = sink.messages();
        let line = &messages[0];
        assert!(line.starts_with("[HEALTH CONTROLLER] TxId "));
        assert!(line.contains(&req.tx_id().unwrap().to_string()));
        assert!(line.ends_with(
            r#" - Send - Request {"body":{"to":"a@b.c"},"params":{},"query":{"lang":"en"}}"#
        ));
        assert_eq!(sink.lines()[0].severity, Severity::Info);
    }

    #[test]
    fn empty_label_and_null_body() {
        let sink = Arc::new(MemoryLogger::new());
        let mut req = Request::new(Method::Get, "/").with_json(Value::Null);
        logger(&sink).log_transaction(None)(&mut req);
        assert_eq!(sink.messages(), vec!["[HEALTH CONTROLLER] TxId  - ".to_owned()]);
    }

    #[test]
    fn non_object_body_counts_as_input() {
        assert!(!is_empty(&json!([])));
        assert!(!is_empty(&json!("")));
        assert!(is_empty(&json!({})));
    }
}
