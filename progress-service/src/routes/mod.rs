use axum::{
    extract::Request,
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, MethodRouter},
    Router,
};
use lesson_progress_shared::store::{postgres::PgProgressStore, ProgressStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{ConfigError, ProgressConfig, DATABASE_URL_VAR};
use crate::handlers::progress_handlers::{get_progress, method_not_allowed, record_progress};
use crate::state::AppState;

/// Creates a router backed by PostgreSQL, configured from the environment.
///
/// A configuration problem does not stop the function from starting: the
/// router still answers preflights and reports the error on every other call.
pub fn create_router() -> Router {
    let state = match ProgressConfig::from_env() {
        Ok(config) => {
            match PgProgressStore::connect_lazy(&config.database_url, config.max_connections) {
                Ok(store) => {
                    info!("Creating router with PostgreSQL store");
                    AppState::new(Arc::new(store))
                }
                Err(err) => {
                    error!("Could not configure the database pool: {}", err);
                    AppState::unconfigured(ConfigError::InvalidValue {
                        name: DATABASE_URL_VAR,
                        value: "unparseable connection string".to_string(),
                    })
                }
            }
        }
        Err(err) => {
            error!("Database configuration error: {}", err);
            AppState::<PgProgressStore>::unconfigured(err)
        }
    };

    create_router_with_store(state)
}

fn progress_methods<S>() -> MethodRouter<AppState<S>>
where
    S: ProgressStore,
{
    get(get_progress::<S>)
        .post(record_progress::<S>)
        // axum would otherwise answer HEAD from the GET route
        .head(method_not_allowed::<S>)
        .fallback(method_not_allowed::<S>)
}

/// CORS policy of the endpoint. Every OPTIONS request is answered here as a
/// preflight and never reaches the handlers or the store.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-user-id")])
        .max_age(Duration::from_secs(86400))
}

/// Creates a router with a given store implementation.
/// The endpoint answers on every path; API Gateway owns the routing.
pub fn create_router_with_store<S>(state: AppState<S>) -> Router
where
    S: ProgressStore,
{
    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    Router::new()
        .route("/", progress_methods::<S>())
        .route("/*path", progress_methods::<S>())
        .layer(cors_layer())
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
