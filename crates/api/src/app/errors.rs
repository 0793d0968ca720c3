use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use mercado_core::DomainError;

/// Map a domain error to its HTTP status by kind, never by message text.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, err.to_string())
        }
        DomainError::Storage(msg) => {
            tracing::error!(%msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn not_found(what: &str) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, format!("{what} not found"))
}
