//! HTTP Endpoints
//!
//! Dialogue, speech and reset endpoints for the avatar client, plus health,
//! metrics and the static client files.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use voice_avatar_agent::AgentError;
use voice_avatar_core::{ChatRequest, ChatResponse, ResetResponse, VoiceRequest};
use voice_avatar_pipeline::{PipelineError, SpeechOutcome};

use crate::metrics::{record_llm_latency, record_request, record_tts_latency, record_voice_fallback};
use crate::state::AppState;
use crate::ServerError;

const EMPTY_MESSAGE: &str = "Mensagem vazia";
const REPLY_FAILED: &str = "Falha ao gerar resposta (Gemini)";
const INVALID_TEXT: &str = "Texto inválido";
const SPEECH_FAILED: &str = "Falha ao gerar fala";
const CONTEXT_CLEARED: &str = "Contexto apagado.";

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );
    let static_files = ServeDir::new(&state.settings.server.static_dir);

    Router::new()
        // Dialogue
        .route("/api/gemini", post(gemini_reply))
        // Speech
        .route("/api/voice", post(synthesize_voice))
        .route("/api/reset", post(reset_context))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Client page and assets
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        if !origins.is_empty() {
            tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        } else {
            tracing::info!("No CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        }
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEFAULT_ORIGIN))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// `POST /api/gemini`
async fn gemini_reply(State(state): State<AppState>, body: Bytes) -> Response {
    let response = match generate_reply(&state, &body).await {
        Ok(text) => Json(ChatResponse { text }).into_response(),
        Err(e) => e.into_response(),
    };
    record_request("/api/gemini", response.status().as_u16());
    response
}

async fn generate_reply(state: &AppState, body: &[u8]) -> Result<String, ServerError> {
    // A malformed body or a non-string message counts as an empty message
    let message = serde_json::from_slice::<ChatRequest>(body)
        .ok()
        .and_then(|request| request.message)
        .filter(|message| !message.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest(EMPTY_MESSAGE.to_string()))?;

    let start = Instant::now();
    let reply = state
        .orchestrator
        .get_reply(&message)
        .await
        .map_err(|e| match e {
            AgentError::InvalidInput(_) => ServerError::InvalidRequest(EMPTY_MESSAGE.to_string()),
            AgentError::Llm(detail) => {
                tracing::error!(error = %detail, "Dialogue request failed");
                ServerError::Upstream(REPLY_FAILED.to_string())
            },
        })?;
    record_llm_latency(start.elapsed().as_secs_f64() * 1000.0);

    Ok(reply)
}

/// `POST /api/voice`
///
/// 200 with raw audio, or 402 with a directive telling the client to speak the
/// text itself.
async fn synthesize_voice(State(state): State<AppState>, body: Bytes) -> Response {
    let response = match synthesize(&state, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    record_request("/api/voice", response.status().as_u16());
    response
}

async fn synthesize(state: &AppState, body: &[u8]) -> Result<Response, ServerError> {
    let request: VoiceRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Unreadable voice request: {}", e);
        ServerError::Internal(SPEECH_FAILED.to_string())
    })?;

    let text = request
        .text_str()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest(INVALID_TEXT.to_string()))?;

    let start = Instant::now();
    let outcome = state.speech.synthesize(text).await.map_err(|e| match e {
        PipelineError::InvalidInput(_) => ServerError::InvalidRequest(INVALID_TEXT.to_string()),
        other => {
            tracing::error!("Speech synthesis failed: {}", other);
            ServerError::Internal(SPEECH_FAILED.to_string())
        },
    })?;

    match outcome {
        SpeechOutcome::Audio(audio) => {
            record_tts_latency(start.elapsed().as_secs_f64() * 1000.0);
            Ok(([(header::CONTENT_TYPE, audio.mime)], audio.bytes).into_response())
        },
        SpeechOutcome::Fallback {
            directive,
            last_failure,
        } => {
            record_voice_fallback(last_failure.map(|class| class.as_str()).unwrap_or("none"));
            Ok((StatusCode::PAYMENT_REQUIRED, Json(directive)).into_response())
        },
    }
}

/// `POST /api/reset`
async fn reset_context(State(state): State<AppState>) -> Json<ResetResponse> {
    state.orchestrator.reset();
    record_request("/api/reset", StatusCode::OK.as_u16());
    Json(ResetResponse {
        ok: true,
        message: CONTEXT_CLEARED.to_string(),
    })
}

/// Health check
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "context_turns": state.orchestrator.context_len(),
        })),
    )
}

/// Prometheus text exposition, 404 when metrics are disabled
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
