//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use uuid::Uuid;

use crate::core::functions::FunctionCategory;
use crate::core::CalcInput;
use crate::types::Scalar;

use super::server::AppState;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub method: &'static str,
    pub description: &'static str,
}

const ENDPOINTS: [(&str, &str, &str); 5] = [
    ("/health", "GET", "Health check endpoint"),
    ("/version", "GET", "Get server version"),
    ("/api/v1/functions", "GET", "List the function library"),
    ("/api/v1/evaluate", "POST", "Evaluate a formula against context data"),
    ("/api/v1/check", "POST", "Parse a formula without evaluating it"),
];

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Spreadsheet Calc API Server".to_string(),
        version: state.version.clone(),
        description: "HTTP API for spreadsheet-style formula evaluation".to_string(),
        endpoints: ENDPOINTS
            .iter()
            .map(|&(path, method, description)| EndpointInfo {
                path,
                method,
                description,
            })
            .collect(),
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub timezone: String,
    pub number_format: String,
}

/// GET /version - Server version and evaluator settings
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let format = state.calculator.config().number_format;
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        timezone: state.calculator.zone().to_string(),
        number_format: format!("1{}234{}56", format.thousands, format.decimal),
    }))
}

#[derive(Debug, Serialize)]
pub struct FunctionInfo {
    pub name: &'static str,
    pub category: FunctionCategory,
    pub signature: &'static str,
    pub summary: &'static str,
}

/// GET /api/v1/functions - Function library
pub async fn functions(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<FunctionInfo>>> {
    let list = state
        .calculator
        .functions()
        .entries()
        .map(|entry| FunctionInfo {
            name: entry.name,
            category: entry.category,
            signature: entry.signature,
            summary: entry.summary,
        })
        .collect();
    Json(ApiResponse::ok(list))
}

/// Evaluate request
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub expression: String,
    /// Root context
    #[serde(default)]
    pub context: Option<JsonValue>,
    /// Local context, overrides the root context
    #[serde(default)]
    pub local: Option<JsonValue>,
    /// Named arguments, override both contexts
    #[serde(default)]
    pub args: Option<Map<String, JsonValue>>,
}

/// Evaluate response
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub result: Scalar,
    /// The result as a template host would render it
    pub display: String,
}

/// POST /api/v1/evaluate - Evaluate a formula
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Json<ApiResponse<EvaluateResponse>> {
    let input = CalcInput {
        root: req.context.as_ref(),
        local: req.local.as_ref(),
        hash: req.args.as_ref(),
        instants: None,
    };

    match state.calculator.evaluate(&req.expression, &input) {
        Ok(result) => Json(ApiResponse::ok(EvaluateResponse {
            display: result.to_string(),
            result,
        })),
        Err(e) => {
            debug!(expression = %req.expression, error = %e, "Evaluation request failed");
            Json(ApiResponse::err(e.to_string()))
        }
    }
}

/// Check request
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub expression: String,
}

/// Check response
#[derive(Debug, Serialize, Default)]
pub struct CheckResponse {
    pub valid: bool,
    pub message: String,
}

/// POST /api/v1/check - Parse a formula
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Json<ApiResponse<CheckResponse>> {
    // A syntax error is a normal answer here, not a failed request
    let response = match state.calculator.compile(&req.expression) {
        Ok(_) => CheckResponse {
            valid: true,
            message: "Expression is valid".to_string(),
        },
        Err(e) => CheckResponse {
            valid: false,
            message: e.to_string(),
        },
    };
    Json(ApiResponse::ok(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response = ApiResponse::ok("data");
        assert!(response.success);
        assert_eq!(response.data, Some("data"));
        assert!(response.error.is_none());
        assert!(!response.request_id.is_empty());
    }

    #[test]
    fn test_api_response_err_creates_error_response() {
        let response: ApiResponse<CheckResponse> = ApiResponse::err("boom");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_api_response_request_id_is_unique() {
        let a = ApiResponse::ok(1);
        let b = ApiResponse::ok(1);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_api_response_skips_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(CheckResponse::default())).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["data"]["valid"], false);
    }

    #[test]
    fn test_evaluate_request_optional_fields() {
        let req: EvaluateRequest = serde_json::from_str(r#"{"expression": "1 + 1"}"#).unwrap();
        assert_eq!(req.expression, "1 + 1");
        assert!(req.context.is_none());
        assert!(req.local.is_none());
        assert!(req.args.is_none());
    }

    #[test]
    fn test_evaluate_response_serializes_scalar_untagged() {
        let json = serde_json::to_value(EvaluateResponse {
            result: Scalar::Number(32.97),
            display: "32.97".to_string(),
        })
        .unwrap();
        assert_eq!(json["result"], 32.97);
        assert_eq!(json["display"], "32.97");
    }
}
