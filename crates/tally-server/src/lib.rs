//! Tally Web Server
//!
//! Provides a REST API for the Tally personal finance tracker.
//!
//! Authentication uses encrypted session cookies (see `session`). Everything
//! under `/api` except health, register, login and `me` requires a logged-in
//! user.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::Key;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use tally_core::db::Database;
use tally_core::{DocumentExtractor, PasswordHash, TextExtractor};

mod handlers;
pub mod session;

/// Maximum upload size (5MB)
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Used when `SESSION_SECRET` is not set. Sessions signed with it are not secret.
const DEV_SESSION_SECRET: &str = "tally-development-session-secret-change-me";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (the front-end URL). Empty means same-origin only.
    pub allowed_origins: Vec<String>,
    /// Secret the session cookie key is derived from
    pub session_secret: Option<String>,
    /// Mark session cookies `Secure` (HTTPS only)
    pub secure_cookies: bool,
    /// How long a login lasts
    pub session_duration: time::Duration,
    /// Where uploaded receipts are stored and served from
    pub uploads_dir: PathBuf,
    /// bcrypt cost for new passwords
    pub password_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            session_secret: None,
            secure_cookies: true,
            session_duration: session::DEFAULT_SESSION_DURATION,
            uploads_dir: PathBuf::from("uploads"),
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub cookie_key: Key,
    pub extractor: Arc<dyn TextExtractor>,
}

// Lets `PrivateCookieJar` find the key in our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create the API router with the production text extractor
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    create_router_with_extractor(
        db,
        static_dir,
        config,
        Arc::new(DocumentExtractor::from_env()),
    )
}

/// Create the API router with a specific text extractor
pub fn create_router_with_extractor(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    extractor: Arc<dyn TextExtractor>,
) -> Router {
    let secret = match config.session_secret.as_deref() {
        Some(secret) if !secret.is_empty() => secret.to_string(),
        _ => {
            warn!("⚠️  SESSION_SECRET not set - using a development secret, sessions are forgeable!");
            DEV_SESSION_SECRET.to_string()
        }
    };

    let state = AppState {
        db,
        cookie_key: session::create_cookie_key(&secret),
        config: config.clone(),
        extractor,
    };

    // Session-guarded routes
    let protected = Router::new()
        .route("/auth/logout", post(handlers::logout))
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/:type", get(handlers::list_categories_by_type))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/stats", get(handlers::get_stats))
        .route(
            "/transactions/process-receipt",
            post(handlers::process_receipt),
        )
        .route(
            "/transactions/parse-statement",
            post(handlers::parse_statement),
        )
        .route("/transactions/:id", delete(handlers::delete_transaction))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_auth,
        ));

    // Only for visitors without a session
    let guest = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_no_auth,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/me", get(handlers::get_me))
        .merge(guest)
        .merge(protected);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        // Credentials are required for the session cookie to cross origins
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    let uploads = ServeDir::new(&config.uploads_dir);

    let mut app = Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Serve the built front-end if a directory was provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.secure_cookies {
        warn!("⚠️  Session cookies are not marked Secure - use only behind plain HTTP for development");
    }

    ensure_dir(&config.uploads_dir)?;

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!(path = %dir.display(), "Created uploads directory");
    }
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> Self {
        Self::new(StatusCode::CONFLICT, msg)
    }

    /// A 500 with a client-safe message; `cause` is only logged
    pub fn internal(msg: &str, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: Some(cause.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err.into()),
        }
    }
}
