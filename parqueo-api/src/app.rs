//! Application state and router builder.
//!
//! ```text
//! /
//! ├── /health                    # liveness + db status (public)
//! ├── /auth/                     # register, login (public), me (bearer)
//! ├── /espacios/                 # reads public, mutations bearer
//! ├── /vehiculos/                # bearer
//! └── /reservas/                 # bearer
//! ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::Uri,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use parqueo_shared::auth::{
    jwt,
    middleware::{bearer_token, AuthContext},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned per request via axum's `State`
/// extractor. `Arc` keeps the clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route(
            "/me",
            get(routes::auth::me).layer(axum::middleware::from_fn_with_state(
                state.clone(),
                jwt_auth_layer,
            )),
        );

    // Space reads are public; mutations require a token.
    let espacios_routes = Router::new()
        .route("/", get(routes::espacios::list))
        .route("/disponibles", get(routes::espacios::list_disponibles))
        .route("/:id", get(routes::espacios::get_by_id))
        .merge(
            Router::new()
                .route("/", post(routes::espacios::create))
                .route("/:id", put(routes::espacios::update))
                .route("/:id", delete(routes::espacios::remove))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    let vehiculos_routes = Router::new()
        .route("/", get(routes::vehiculos::list))
        .route("/", post(routes::vehiculos::create))
        .route("/:id", get(routes::vehiculos::get_by_id))
        .route("/:id", put(routes::vehiculos::update))
        .route("/:id", delete(routes::vehiculos::remove))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let reservas_routes = Router::new()
        .route("/", get(routes::reservas::list))
        .route("/", post(routes::reservas::create))
        .route("/activas", get(routes::reservas::list_activas))
        .route("/:id", get(routes::reservas::get_by_id))
        .route("/:id/terminar", put(routes::reservas::terminar))
        .route("/:id", delete(routes::reservas::remove))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/espacios", espacios_routes)
        .nest("/vehiculos", vehiculos_routes)
        .nest("/reservas", reservas_routes)
        .fallback(fallback)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer.
///
/// Validates the bearer token from the Authorization header and injects an
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| crate::error::ApiError::Unauthorized("No token provided".to_string()))?;

    let token = bearer_token(auth_header)?;
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}

/// Root route: API name and endpoint summary.
async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Parqueo API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "GET /health",
            "auth": {
                "register": "POST /auth/register",
                "login": "POST /auth/login",
                "me": "GET /auth/me"
            },
            "espacios": {
                "all": "GET /espacios",
                "disponibles": "GET /espacios/disponibles"
            },
            "vehiculos": "GET /vehiculos (bearer)",
            "reservas": "GET /reservas (bearer)"
        }
    }))
}

/// Unmatched routes return a 404 echoing the requested path.
async fn fallback(uri: Uri) -> crate::error::ApiError {
    crate::error::ApiError::NotFound(format!("route not found: {}", uri.path()))
}
