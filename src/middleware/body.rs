//! Request body decoding.

use http::header::CONTENT_TYPE;
use serde_json::Value;

use super::Flow;
use crate::error::ApiError;
use crate::request::{decode_form, Request};
use crate::response::IntoResponse;

/// Decodes the raw body into [`Request::body`].
///
/// `application/json` is parsed as JSON; malformed JSON answers 400 through
/// the centralized error handler. `application/x-www-form-urlencoded` decodes
/// into an object, repeated keys collecting into arrays. Empty bodies and
/// other content types leave the body untouched.
pub fn parse_body(req: &mut Request) -> Flow {
    if req.raw_body.is_empty() {
        return Flow::Continue;
    }
    let mime = req
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "application/json" => match serde_json::from_slice::<Value>(&req.raw_body) {
            Ok(body) => req.body = body,
            Err(e) => {
                return Flow::Respond(
                    ApiError::InvalidArgument(format!("malformed JSON body: {e}")).into_response(),
                );
            }
        },
        "application/x-www-form-urlencoded" => {
            req.body = Value::Object(decode_form(&req.raw_body));
        }
        _ => {}
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Method, StatusCode};

    #[test]
    fn decodes_json() {
        let mut req = Request::new(Method::Post, "/")
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"a":{"b":1}}"#);
        assert!(matches!(parse_body(&mut req), Flow::Continue));
        assert_eq!(req.body(), &json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn decodes_form() {
        let mut req = Request::new(Method::Post, "/")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("name=ann&tag=x&tag=y");
        parse_body(&mut req);
        assert_eq!(req.body(), &json!({ "name": "ann", "tag": ["x", "y"] }));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut req = Request::new(Method::Post, "/")
            .with_header("content-type", "application/json")
            .with_body("{not json");
        match parse_body(&mut req) {
            Flow::Respond(res) => assert_eq!(res.status_code(), StatusCode::BAD_REQUEST),
            Flow::Continue => panic!("malformed body accepted"),
        }
    }

    #[test]
    fn unknown_content_type_keeps_empty_body() {
        let mut req = Request::new(Method::Post, "/")
            .with_header("content-type", "text/plain")
            .with_body("<b>hi</b>");
        parse_body(&mut req);
        assert_eq!(req.body(), &json!({}));
    }
}
