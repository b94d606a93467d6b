use actix_web::http::StatusCode;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, Result, dev::ServiceResponse};
use serde_json::json;

use crate::utils::config::service_name;
use crate::utils::error::CustomError;

fn envelope(status: StatusCode, message: String, error: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "message": message,
        "httpStatusCode": status.as_u16(),
        "error": error,
        "service": service_name(),
    }))
}

fn replace_body<B>(res: ServiceResponse<B>, new_response: HttpResponse) -> ErrorHandlerResponse<B> {
    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());
    ErrorHandlerResponse::Response(res)
}

/// Responses built from a `CustomError` already carry the envelope
fn is_custom<B>(res: &ServiceResponse<B>) -> bool {
    res.response()
        .error()
        .map(|e| e.as_error::<CustomError>().is_some())
        .unwrap_or(false)
}

/// Unknown routes; a handler's own not-found passes through
pub fn not_found<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    if is_custom(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    let new_response = envelope(
        StatusCode::NOT_FOUND,
        "Route does not exist".to_string(),
        "NOT_FOUND_ERROR",
    );
    Ok(replace_body(res, new_response))
}

/// Every other error status: framework errors (bad JSON, missing bearer token, ...)
/// are rewritten into the same envelope `CustomError` produces. Responses that
/// already carry that envelope pass through untouched.
pub fn handle_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    if is_custom(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let message = res
        .response()
        .error()
        .map(|e| e.to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    let error = match status {
        StatusCode::UNAUTHORIZED => "UNAUTHENTICATED_ERROR",
        StatusCode::BAD_REQUEST => "BAD_REQUEST_ERROR",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE_ERROR",
        s if s.is_server_error() => "INTERNAL_SERVER_ERROR",
        _ => "REQUEST_ERROR",
    };

    Ok(replace_body(res, envelope(status, message, error)))
}
