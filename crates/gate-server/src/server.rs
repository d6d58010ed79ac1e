use std::sync::Arc;

use axum::{Router, http::HeaderValue, middleware, routing::get};
use gate_config::{Config, CorsConfig};
use gate_security::Redactor;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::{db_test, healthz, not_found};
use crate::report::{install_panic_hook, panic_response, report_errors};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub redactor: Arc<Redactor>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let redactor = Redactor::with_structured_prefixes(
            config.redaction.structured_prefixes.iter().cloned(),
        );
        Self {
            config: Arc::new(config),
            redactor: Arc::new(redactor),
        }
    }
}

/// Application routes without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/db-test", get(db_test))
        .fallback(not_found)
}

/// Wrap `routes` with panic capture, the error layer, tracing and CORS.
pub fn with_layers(routes: Router<AppState>, state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), report_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub fn router(state: AppState) -> Router {
    with_layers(routes(), state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allows_any_origin() {
        if config.allow_credentials {
            warn!("CORS credentials cannot be combined with a wildcard origin, ignoring allow_credentials");
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        warn!("DATABASE_URL is not set in the environment or config");
    }

    let addr = config.bind_addr();
    let state = AppState::new(config);
    install_panic_hook(state.redactor.as_ref().clone());
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
