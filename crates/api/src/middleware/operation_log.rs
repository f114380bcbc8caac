//! Audit middleware writing one `operation_logs` row per `/api` request.
//!
//! The request body is buffered so it can be both recorded and replayed to
//! the handler; JSON responses are buffered the same way. Payload scrubbing
//! and classification live in `farmops_core::operation_log`.

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use farmops_core::operation_log::{
    browser_name, capture_payload, classify_operation, client_ip, describe, module_for_path,
    operation_types, os_name, status_for, truncate_chars, ANONYMOUS,
};
use farmops_db::models::operation_log::CreateOperationLog;
use farmops_db::repositories::OperationLogRepo;

use crate::error::AppError;
use crate::middleware::auth::identify;
use crate::state::AppState;

/// Record the request in the operation log after the handler has answered.
///
/// A failed insert is logged and never changes the response.
pub async fn record_operation(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if !state.config.operation_log.enabled || !path.starts_with("/api/") {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let limit = state.config.max_body_bytes;
    let body_bytes = match to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return AppError::BadRequest(format!("Request body exceeds {limit} bytes"))
                .into_response()
        }
    };

    let max_capture = state.config.operation_log.max_capture;
    let operation_type = classify_operation(parts.method.as_str(), &path);
    let module = module_for_path(&path);

    let (user_id, username) = match identify(&parts.headers, &state.config.jwt) {
        Some(user) => (Some(user.user_id), user.username),
        None if operation_type == operation_types::LOGIN => (
            None,
            login_username(&body_bytes).unwrap_or_else(|| ANONYMOUS.to_string()),
        ),
        None => (None, ANONYMOUS.to_string()),
    };

    let request_params = match parts.method {
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE => {
            capture_payload(&body_bytes, max_capture)
        }
        _ => parts.uri.query().map(|q| truncate_chars(q, max_capture)),
    };

    let request_url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let request_method = parts.method.as_str().to_string();
    let (ip, browser, os) = client_info(&parts.headers);

    let response = next.run(Request::from_parts(parts, Body::from(body_bytes))).await;
    let status = status_for(response.status().as_u16());
    let (response, response_data) = capture_response(response, max_capture).await;

    let entry = CreateOperationLog {
        user_id,
        username,
        operation_type: operation_type.to_string(),
        module: module.to_string(),
        description: describe(&request_method, module),
        request_url,
        request_method,
        request_params,
        response_data,
        status: status.to_string(),
        ip,
        browser,
        os,
    };

    if let Err(err) = OperationLogRepo::insert(&state.pool, &entry).await {
        tracing::warn!(error = %err, path = %path, "Failed to write operation log");
    }

    response
}

/// `(ip, browser, os)` from proxy and client-hint headers.
fn client_info(headers: &HeaderMap) -> (String, String, String) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let user_agent = header(USER_AGENT.as_str());
    (
        client_ip(header("x-forwarded-for"), header("x-real-ip")),
        browser_name(user_agent),
        os_name(header("sec-ch-ua-platform"), user_agent),
    )
}

/// The `username` of a login body, if it parses.
fn login_username(body: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(body).ok()?;
    json.get("username")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Buffer a JSON response body for the log and hand back an equivalent response.
///
/// Non-JSON responses (CSV exports) pass through uncaptured.
async fn capture_response(response: Response, max_capture: usize) -> (Response, Option<String>) {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        return (response, None);
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let captured = capture_payload(&bytes, max_capture);
            (Response::from_parts(parts, Body::from(bytes)), captured)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to buffer response for operation log");
            (Response::from_parts(parts, Body::from(Bytes::new())), None)
        }
    }
}
