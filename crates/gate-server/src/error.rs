use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gate_storage::StorageError;
use serde::Serialize;
use std::error::Error as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Database failure carrying its own status code.
    #[error("{message}")]
    Database {
        message: String,
        status: StatusCode,
        source: Option<StorageError>,
    },

    /// Framework-level HTTP error (unknown route, bad request, ...).
    #[error("{detail}")]
    Http { status: StatusCode, detail: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn database(message: impl Into<String>, status: StatusCode) -> Self {
        AppError::Database {
            message: message.into(),
            status,
            source: None,
        }
    }

    pub fn database_caused_by(
        message: impl Into<String>,
        status: StatusCode,
        source: StorageError,
    ) -> Self {
        AppError::Database {
            message: message.into(),
            status,
            source: Some(source),
        }
    }

    pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
        AppError::Http {
            status,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database { status, .. } | AppError::Http { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Name reported in the `type` field of the error body.
    pub fn type_name(&self) -> &'static str {
        match self {
            AppError::Database { .. } => "DatabaseError",
            AppError::Http { .. } => "HTTPException",
            AppError::Internal(_) => "Exception",
        }
    }

    /// Full cause chain, one cause per line.
    pub fn trace(&self) -> String {
        match self {
            AppError::Internal(e) => format!("{:?}", e),
            AppError::Http { .. } => String::new(),
            AppError::Database { .. } => {
                let mut lines = vec![format!("{}: {}", self.type_name(), self)];
                let mut source = self.source();
                while let Some(cause) = source {
                    lines.push(format!("Caused by: {}", cause));
                    source = cause.source();
                }
                lines.join("\n")
            }
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            type_name: self.type_name(),
            status: self.status(),
            message: self.to_string(),
            trace: self.trace(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report().into_response()
    }
}

/// Unredacted error details attached to an error response.
///
/// The response itself only carries the status. The error layer installed by
/// [`crate::with_layers`] picks the report up from the response extensions,
/// redacts it with the configured rules, logs it and renders the JSON body.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub type_name: &'static str,
    pub status: StatusCode,
    pub message: String,
    pub trace: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorReport {
    /// Render with `detail` passed through `redact`.
    pub fn render<F>(&self, redact: F) -> Response
    where
        F: Fn(&str) -> String,
    {
        let body = ErrorBody {
            detail: redact(&self.message),
            error_type: self.type_name.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}
