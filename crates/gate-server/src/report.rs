//! Error layer: redact, log and render every error response

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gate_security::Redactor;
use tracing::error;

use crate::error::{AppError, ErrorReport};
use crate::server::AppState;

/// Middleware that renders the final JSON error body for every error
/// response, redacting the message, trace and request URL.
///
/// Handler errors arrive as an [`ErrorReport`] extension. Error responses
/// produced by the framework itself (405 and friends) carry none and are
/// reported as an `HTTPException` with the status' canonical reason.
pub async fn report_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().to_string();

    let response = next.run(request).await;
    let status = response.status();
    let report = match response.extensions().get::<ErrorReport>() {
        Some(report) => report.clone(),
        None if status.is_client_error() || status.is_server_error() => {
            AppError::http(status, status.canonical_reason().unwrap_or("Error")).report()
        }
        None => return response,
    };

    let redactor = &state.redactor;
    let message = redactor.redact(&report.message);

    error!(
        method = %method,
        url = %redactor.redact(&uri),
        error_type = report.type_name,
        status = report.status.as_u16(),
        "Exception occurred: {}",
        message
    );
    if !report.trace.is_empty() {
        error!("Redacted traceback:\n{}", redactor.redact(&report.trace));
    }

    let mut rendered = report.render(|text| redactor.redact(text).into_owned());
    if let Some(allow) = response.headers().get(header::ALLOW) {
        rendered.headers_mut().insert(header::ALLOW, allow.clone());
    }
    rendered.extensions_mut().insert(report);
    rendered
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Convert a handler panic into a 500 `Exception` report.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ErrorReport {
        type_name: "Exception",
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: panic_message(&*payload),
        trace: String::new(),
    }
    .into_response()
}

/// Replace the default panic hook, which prints the raw payload to stderr,
/// with one that logs the redacted message through `tracing`.
pub fn install_panic_hook(redactor: Redactor) {
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|location| location.to_string())
            .unwrap_or_default();
        error!(
            location = %location,
            "Panic: {}",
            redactor.redact(&message)
        );
    }));
}
