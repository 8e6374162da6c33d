//! Web API module for Campus View.
//!
//! This module exposes the admin content editor and the view-state helpers
//! over HTTP so a site frontend can read and write ticker lines and popup
//! banners, submit the contact form and ask which header theme applies.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/content` - Persisted content and editor state
//! - `PUT /api/ticker` - Replace and save all ticker lines
//! - `PUT /api/banners` - Replace and save all banner images
//! - `DELETE /api/content?confirm=true` - Reset content to the defaults
//! - `POST /api/contact` - Submit the contact form
//! - `GET /api/theme?visible=a,b` - Header theme for a set of visible regions

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{ContactSubmission, NamedRegion, VisibilitySet};
use crate::services::{
    submit_contact, Confirmation, ContactError, ContentEditorSession, EditorError, FormSink,
    LogSink, OutboxSink, SaveOutcome, SessionState, ThemeRules, UploadRejection,
};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    config: Arc<Config>,
    /// The one editor session every request edits through
    session: Arc<Mutex<ContentEditorSession>>,
    /// Destination of contact form submissions
    forms: Arc<dyn FormSink>,
}

impl AppState {
    /// Creates a new application state from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let session = ContentEditorSession::from_config(&config)?;
        let forms: Arc<dyn FormSink> = match &config.paths.contact_outbox {
            Some(path) => Arc::new(OutboxSink::new(path)),
            None => Arc::new(LogSink),
        };
        Ok(Self::with_parts(config, session, forms))
    }

    /// Assembles state from already-built parts.
    pub fn with_parts(
        config: Config,
        session: ContentEditorSession,
        forms: Arc<dyn FormSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            forms,
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, ContentEditorSession>, ApiFailure> {
        self.session
            .lock()
            .map_err(|_| internal("Editor session is unavailable", "session lock poisoned"))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Content as served to the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    /// Ticker lines in display order.
    pub ticker_lines: Vec<String>,
    /// Banner image references in carousel order.
    pub banner_images: Vec<String>,
    /// Editor state.
    pub state: SessionState,
    /// Time of the last successful save through this server (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<String>,
}

/// Body of `PUT /api/ticker`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerUpdate {
    /// Full replacement list.
    pub ticker_lines: Vec<String>,
}

/// Body of `PUT /api/banners`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerUpdate {
    /// Full replacement list of URLs or `data:` URLs.
    pub banner_images: Vec<String>,
}

/// Result of a save.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    /// When the content was written (RFC 3339).
    pub saved_at: String,
}

/// Query parameters for resetting content.
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    /// Must be `true` for the reset to happen.
    #[serde(default)]
    pub confirm: bool,
}

/// Query parameters for theme derivation.
#[derive(Debug, Deserialize)]
pub struct ThemeQuery {
    /// Comma-separated ids of the regions in view.
    #[serde(default)]
    pub visible: String,
}

/// Derived header theme.
#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    /// "light" or "dark".
    pub theme: String,
    /// Region ids that were treated as visible.
    pub visible: Vec<String>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error with just a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Creates a new API error with a message and details.
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiFailure = (StatusCode, Json<ApiError>);

fn internal(error: &str, details: impl Into<String>) -> ApiFailure {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::with_details(error, details)),
    )
}

/// Maps editor failures onto HTTP statuses.
fn editor_failure(error: EditorError) -> ApiFailure {
    let status = match &error {
        EditorError::Upload(UploadRejection::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        EditorError::Upload(UploadRejection::NotAnImage { .. }) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        EditorError::SaveFailed(_) => StatusCode::BAD_GATEWAY,
        EditorError::SaveInProgress => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ApiError::new(error.to_string())))
}

fn content_response(session: &ContentEditorSession) -> ContentResponse {
    let persisted = session.persisted();
    ContentResponse {
        ticker_lines: persisted.ticker_lines.clone(),
        banner_images: persisted.banner_images.clone(),
        state: session.state(),
        last_saved: session.last_saved().map(|at| at.to_rfc3339()),
    }
}

/// Applies `edit` and saves, on a blocking thread.
///
/// A failed save leaves the edit in the buffer, so the next save retries it.
async fn edit_and_save<F>(state: AppState, edit: F) -> Result<Json<SaveResponse>, ApiFailure>
where
    F: FnOnce(&mut ContentEditorSession) -> Result<(), EditorError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut session = state.session()?;
        edit(&mut *session).map_err(editor_failure)?;
        match session.save().map_err(editor_failure)? {
            SaveOutcome::Saved { at } => Ok(Json(SaveResponse {
                saved_at: at.to_rfc3339(),
            })),
            SaveOutcome::AlreadySaving => Err((
                StatusCode::CONFLICT,
                Json(ApiError::new(EditorError::SaveInProgress.to_string())),
            )),
        }
    })
    .await
    .map_err(|e| internal("Save task failed", e.to_string()))?
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/content - Persisted content.
async fn get_content(State(state): State<AppState>) -> Result<Json<ContentResponse>, ApiFailure> {
    let session = state.session()?;
    Ok(Json(content_response(&session)))
}

/// PUT /api/ticker - Replace ticker lines and save.
async fn put_ticker(
    State(state): State<AppState>,
    Json(update): Json<TickerUpdate>,
) -> Result<Json<SaveResponse>, ApiFailure> {
    edit_and_save(state, move |session| {
        session.set_ticker_lines(update.ticker_lines);
        Ok(())
    })
    .await
}

/// PUT /api/banners - Replace banner images and save.
async fn put_banners(
    State(state): State<AppState>,
    Json(update): Json<BannerUpdate>,
) -> Result<Json<SaveResponse>, ApiFailure> {
    edit_and_save(state, move |session| {
        session.set_banner_images(update.banner_images)
    })
    .await
}

/// DELETE /api/content - Reset content to the defaults.
async fn reset_content(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<ContentResponse>, ApiFailure> {
    let mut session = state.session()?;
    session
        .reset_to_defaults(Confirmation::from(query.confirm))
        .map_err(editor_failure)?;
    Ok(Json(content_response(&session)))
}

/// POST /api/contact - Submit the contact form.
async fn post_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactSubmission>,
) -> Result<StatusCode, ApiFailure> {
    let forms = Arc::clone(&state.forms);
    let result = tokio::task::spawn_blocking(move || submit_contact(&form, forms.as_ref()))
        .await
        .map_err(|e| internal("Contact task failed", e.to_string()))?;

    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(ContactError::MissingFields(fields)) => {
            let details: Vec<String> = fields.iter().map(ToString::to_string).collect();
            Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError::with_details(
                    "Missing required fields",
                    details.join("; "),
                )),
            ))
        }
        Err(err @ ContactError::Delivery(_)) => {
            warn!("Contact form delivery failed: {}", err);
            Err((StatusCode::BAD_GATEWAY, Json(ApiError::new(err.to_string()))))
        }
    }
}

/// GET /api/theme - Header theme for the given visible regions.
async fn get_theme(
    State(state): State<AppState>,
    Query(query): Query<ThemeQuery>,
) -> Result<Json<ThemeResponse>, ApiFailure> {
    let regions: Vec<NamedRegion> = state.config.regions.named_regions();
    let mut visibility: VisibilitySet = regions.iter().map(|r| (r.id.clone(), false)).collect();

    let mut visible = Vec::new();
    for id in query.visible.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !visibility.contains(id) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(format!("Unknown region '{id}'"))),
            ));
        }
        visibility.set(id.into(), true);
        visible.push(id.to_string());
    }

    let theme = ThemeRules::from_regions(&regions).derive(&visibility);
    Ok(Json(ThemeResponse {
        theme: theme.to_string(),
        visible,
    }))
}

// ============================================================================
// Router and Server
// ============================================================================

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    // The site frontend is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Content endpoints
        .route("/api/content", get(get_content).delete(reset_content))
        .route("/api/ticker", put(put_ticker))
        .route("/api/banners", put(put_banners))
        // Site helpers
        .route("/api/contact", post(post_contact))
        .route("/api/theme", get(get_theme))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Errors
///
/// Returns an error if the session cannot be opened or the server fails to start.
pub async fn run_server(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let app = create_router(state);

    info!("Starting Campus View web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
