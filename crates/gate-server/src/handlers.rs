use axum::{Json, extract::State, http::StatusCode};
use gate_storage::Database;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::AppError;
use crate::server::AppState;

/// GET /healthz
pub async fn healthz() -> Json<Value> {
    info!("Health check endpoint called");
    Json(json!({ "status": "ok" }))
}

/// GET /db-test - Connect, look up one user, disconnect
pub async fn db_test(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let settings = &state.config.database;

    let db = match Database::connect(settings).await {
        Ok(db) => db,
        Err(e) => {
            let message = format!("Unable to connect to the database: {}", e);
            let uri = format!("database_url={}", settings.url.as_deref().unwrap_or(""));
            error!(
                "Connection details: {}, Timeout={}ms",
                state.redactor.redact(&uri),
                settings.connect_timeout_ms
            );
            let status = if e.is_connection() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return Err(AppError::database_caused_by(message, status, e));
        }
    };

    let found = db.find_one_user().await;
    db.close().await;
    info!("Database connection closed");

    match found {
        Ok(Some(user)) => {
            info!("Database connection successful, document found");
            Ok(Json(json!({
                "detail": "Database connection successful",
                "result": user.to_string()
            })))
        }
        Ok(None) => {
            info!("Database connection successful, no documents found");
            Ok(Json(json!({
                "detail": "Database connection successful",
                "result": "No documents found in the Users collection"
            })))
        }
        Err(e) => Err(AppError::database_caused_by(
            format!("Unexpected error during database test: {}", e),
            StatusCode::INTERNAL_SERVER_ERROR,
            e,
        )),
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::http(StatusCode::NOT_FOUND, "Not Found")
}
