//! Suspicious-payload scan.
//!
//! Body, params and query are merged, flattened to leaves, and every string
//! leaf is checked for bracketed (`[..]`), braced (`{..}`) or angle-bracketed
//! (`<..>`) content. One hit rejects the whole request with 400.
//!
//! This is a coarse prefilter, not a parser. The flatten drops path context:
//! only the leaf's own key is reported, cut at its first `_`. A field named
//! `user_name` reports as `user`, and a field literally named `user_1` cannot
//! be told apart from a synthesized key for `user`.

use std::sync::LazyLock;

use http::StatusCode;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::Flow;
use crate::error::ErrorBody;
use crate::request::Request;
use crate::response::Response;

static SUSPICIOUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]|\{[^}]+\}|<[^>]+>").expect("valid pattern"));

/// Where a flagged field was found. The scan works on the merged input, so
/// every record reports `body`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
}

/// One rejected field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationError {
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "param")]
    pub original_field_name: String,
    pub location: Location,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, original_field_name: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            original_field_name: original_field_name.into(),
            location: Location::Body,
        }
    }
}

/// Leaf view of a nested structure, keyed `<field>_<random>`, in visit order.
pub type FlatFields = Vec<(String, Value)>;

/// Flattens `root` into its leaves.
///
/// Objects and arrays are descended and their own key is dropped (array
/// elements surface under their index). Every other value is a leaf stored
/// under a synthesized `<key>_<random>` key so siblings that share a name at
/// different depths do not collide. Falsy leaves (`null`, `false`, `0`,
/// `""`) are stored as `""`.
pub fn flatten(root: &Map<String, Value>) -> FlatFields {
    let mut out = FlatFields::new();
    flatten_object(root, &mut out);
    out
}

fn flatten_object(obj: &Map<String, Value>, out: &mut FlatFields) {
    for (key, value) in obj {
        flatten_entry(key, value, out);
    }
}

fn flatten_entry(key: &str, value: &Value, out: &mut FlatFields) {
    match value {
        Value::Object(child) => flatten_object(child, out),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_entry(&i.to_string(), item, out);
            }
        }
        leaf => out.push((synthesize_key(key), truthy_or_blank(leaf))),
    }
}

fn synthesize_key(key: &str) -> String {
    format!("{key}_{}", rand::random::<f64>() * 100_000.0)
}

fn truthy_or_blank(value: &Value) -> Value {
    let falsy = match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    };
    if falsy { Value::String(String::new()) } else { value.clone() }
}

/// Recovers the reported field name from a synthesized key: everything
/// before the first `_`.
fn original_field_name(key: &str) -> &str {
    key.split('_').next().unwrap_or(key)
}

/// Scans the flattened leaves of `input`. Empty result means clean.
pub fn scan(input: &Map<String, Value>) -> Vec<ValidationError> {
    flatten(input)
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) if SUSPICIOUS.is_match(&s) => Some(ValidationError::new(
                format!("Invalid data {s}"),
                original_field_name(&key),
            )),
            _ => None,
        })
        .collect()
}

/// Rejects requests whose combined body/params/query carries suspicious
/// content.
///
/// Writes its own 400 response instead of going through the centralized
/// error handler:
///
/// ```json
/// {"message":"Bad Request","errors":[{"msg":"…","param":"…","location":"body"}],
///  "source":"Internal","transactionId":"…"}
/// ```
pub fn sanitize_request(req: &mut Request) -> Flow {
    let errors = scan(&req.combined_input());
    if errors.is_empty() {
        return Flow::Continue;
    }

    let body = ErrorBody {
        message: "Bad Request".to_owned(),
        errors,
        source: "Internal",
        transaction_id: req.tx_id().map(ToString::to_string),
    };
    Flow::Respond(Response::json_value(StatusCode::BAD_REQUEST, &body))
}
