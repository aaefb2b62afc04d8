//! HTTP handlers for the calculator page and the eval API.
//!
//! Handlers stay thin over pure functions so response logic is testable
//! without a client.

use super::assets::Assets;
use super::AppState;
use crate::calculator::{self, CalcResult};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

/// `GET /`: the calculator page.
pub(super) async fn index_handler() -> Response {
    asset_response("index.html")
}

/// Fallback: any other embedded asset by path, 404 otherwise.
pub(super) async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return asset_response("index.html");
    }
    asset_response(path)
}

fn asset_response(path: &str) -> Response {
    match Assets::get(path) {
        Some(file) => {
            let mime = file.metadata.mimetype().to_string();
            ([(header::CONTENT_TYPE, mime)], file.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// `GET /healthz`: liveness probe.
pub(super) async fn healthz_handler() -> &'static str {
    "ok"
}

/// `GET /version`
pub(super) async fn version_handler() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct EvalParams {
    expr: Option<String>,
}

/// `GET /api/eval?expr=…`
pub(super) async fn eval_handler(
    State(state): State<AppState>,
    Query(params): Query<EvalParams>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = eval_response(params.expr.as_deref(), state.config.max_expr_len);
    (status, Json(body))
}

/// Map an expression to the API response.
///
/// Defined calculator indicators (division by zero, `0/0`) are successful
/// evaluations with an `error` field; input that is not an expression at
/// all is a 400.
fn eval_response(expr: Option<&str>, max_expr_len: usize) -> (StatusCode, Value) {
    let Some(expr) = expr else {
        return (
            StatusCode::BAD_REQUEST,
            json!({"error": "missing `expr` parameter"}),
        );
    };

    if expr.len() > max_expr_len {
        return (
            StatusCode::BAD_REQUEST,
            json!({"error": format!("expression exceeds {max_expr_len} bytes")}),
        );
    }

    if !calculator::is_math_input(expr) {
        return (
            StatusCode::BAD_REQUEST,
            json!({"error": "not a calculator expression"}),
        );
    }

    match calculator::evaluate_expression(expr) {
        Some(CalcResult::Success {
            expression,
            value,
            display_result,
            raw_result,
        }) => (
            StatusCode::OK,
            json!({
                "expression": expression,
                "value": value,
                "display": display_result,
                "raw": raw_result,
            }),
        ),
        Some(CalcResult::Error {
            expression,
            message,
        }) => (
            StatusCode::OK,
            json!({
                "expression": expression,
                "error": message,
            }),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            json!({
                "expression": expr,
                "error": "invalid expression",
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_success() {
        let (status, body) = eval_response(Some("2 + 2"), 256);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display"], "4");
        assert_eq!(body["value"], 4.0);
        assert_eq!(body["raw"], "4");
    }

    #[test]
    fn test_eval_division_by_zero_is_defined() {
        let (status, body) = eval_response(Some("1/0"), 256);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Infinity");
        assert!(body.get("value").is_none());
    }

    #[test]
    fn test_eval_missing_parameter() {
        let (status, body) = eval_response(None, 256);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("expr"));
    }

    #[test]
    fn test_eval_rejects_oversized_expression() {
        let long = "1+".repeat(200) + "1";
        let (status, _) = eval_response(Some(&long), 256);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_eval_rejects_non_math_input() {
        let (status, _) = eval_response(Some("alert('x')"), 256);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_eval_rejects_unparsable_expression() {
        let (status, body) = eval_response(Some("2 +* 2"), 256);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid expression");
    }

    #[test]
    fn test_eval_is_deterministic() {
        let first = eval_response(Some("6 * 7"), 256);
        let second = eval_response(Some("6 * 7"), 256);
        assert_eq!(first, second);
    }
}
