//! HTTP transport for the chat pipeline.
//!
//! ## Endpoints
//!
//! - `POST /api/chat`: run one chat turn
//!
//! Request: `{"message": str, "conversation_history": [{"role", "content"}]}`.
//! Response: `{"response": str, "sarcasm": {...}, "emotion": {...}}`.
//! Errors are `{"detail": str}`; only validation failures are reported as
//! client errors, every other failure is an opaque 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Instrument, info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::emotion::ResolvedEmotion;
use crate::error::{EmpathError, Result};
use crate::sarcasm::SarcasmVerdict;
use crate::therapy::{HistoryEntry, Therapist};

/// Message returned for every non-validation failure.
pub const GENERIC_ERROR_DETAIL: &str = "An internal server error occurred";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Latest user message.
    pub message: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
}

/// Successful response of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The therapist's reply.
    pub response: String,
    /// Sarcasm verdict for the latest message.
    pub sarcasm: SarcasmVerdict,
    /// Resolved emotion for the latest message.
    pub emotion: ResolvedEmotion,
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct AppState {
    therapist: Arc<Therapist>,
    expose_error_details: bool,
}

/// Map a pipeline error to a status code and body.
fn error_response(err: &EmpathError, expose_details: bool) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        EmpathError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: msg.clone(),
            }),
        ),
        other => {
            let detail = if expose_details {
                format!("{GENERIC_ERROR_DETAIL}: {other}")
            } else {
                GENERIC_ERROR_DETAIL.to_owned()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail }))
        }
    }
}

/// Build the CORS layer from the configured origins.
///
/// # Errors
///
/// Returns [`EmpathError::Config`] if an origin is not a valid header value.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(base.allow_origin(Any));
    }
    let parsed = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| EmpathError::Config(format!("invalid CORS origin {o:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(base.allow_origin(AllowOrigin::list(parsed)))
}

/// Build the router for a therapist.
///
/// # Errors
///
/// Returns [`EmpathError::Config`] for invalid CORS origins.
pub fn router(therapist: Arc<Therapist>, config: &ServerConfig) -> Result<Router> {
    let state = AppState {
        therapist,
        expose_error_details: config.expose_error_details,
    };

    Ok(Router::new()
        .route("/api/chat", post(handle_chat))
        .layer(cors_layer(&config.cors_allowed_origins)?)
        .with_state(state))
}

// ---------------------------------------------------------------------------
// ChatServer
// ---------------------------------------------------------------------------

/// HTTP server running the chat endpoint in a background task.
pub struct ChatServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ChatServer {
    /// Start the chat server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the CORS origins are invalid or the listener cannot bind.
    pub async fn start(therapist: Arc<Therapist>, config: &ServerConfig) -> Result<Self> {
        let app = router(therapist, config)?;

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            std::io::Error::new(e.kind(), format!("chat server bind to {bind_addr} failed: {e}"))
        })?;
        let addr = listener.local_addr()?;

        info!("chat server listening on http://{addr}/api/chat");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("chat server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ChatServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `POST /api/chat`: run one chat turn.
async fn handle_chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected chat request body");
            let body = ErrorResponse {
                detail: rejection.body_text(),
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4());
    async move {
        match state
            .therapist
            .respond(&request.message, &request.conversation_history)
            .await
        {
            Ok(turn) => Json(ChatResponse {
                response: turn.reply,
                sarcasm: turn.sarcasm,
                emotion: turn.emotion,
            })
            .into_response(),
            Err(err) => {
                if err.is_client_error() {
                    warn!(code = err.code(), "chat request rejected: {err}");
                } else {
                    tracing::error!(code = err.code(), "chat turn failed: {err}");
                }
                error_response(&err, state.expose_error_details).into_response()
            }
        }
    }
    .instrument(span)
    .await
}
