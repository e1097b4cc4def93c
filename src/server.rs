use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::Result;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::captions::CaptionsApi;
use crate::error::{ApiError, TranscriptError};
use crate::llm::Generator;
use crate::oauth::GoogleOAuth;
use crate::youtube::TranscriptProvider;
use crate::{Summary, extract_video_id, summarize};

const INDEX_HTML: &str = include_str!("page.html");

/// Shared, immutable handler state
#[derive(Clone)]
pub struct AppState {
    pub transcripts: Arc<dyn TranscriptProvider>,
    pub summarizer: Arc<dyn Generator>,
    pub responder: Arc<dyn Generator>,
    pub oauth: Option<Arc<GoogleOAuth>>,
    pub captions: Option<Arc<CaptionsApi>>,
}

#[derive(Deserialize)]
struct TranscriptQuery {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct CaptionsQuery {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
}

#[derive(Deserialize)]
struct ChatRequest {
    transcript: Option<String>,
    question: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Serialize)]
struct CaptionsResponse {
    transcript: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CallbackResponse {
    success: bool,
    access_token: String,
    refresh_token: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/transcript", get(transcript_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/captions", get(captions_handler))
        .route("/api/auth/callback", get(auth_callback_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| eyre::eyre!("failed to bind to {addr}: {e}"))?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// Non-empty, trimmed value of an optional parameter
fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn generation_error(e: eyre::Report) -> ApiError {
    error!("Generation call failed: {e:#}");
    ApiError::Upstream(format!("Generation API error: {e}"))
}

async fn transcript_handler(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<Summary>, ApiError> {
    let video_id = match (required(query.video_id), required(query.url)) {
        (Some(id), _) => id,
        (None, Some(url)) => {
            extract_video_id(&url).ok_or_else(|| ApiError::BadRequest("Invalid YouTube URL".to_string()))?
        }
        (None, None) => return Err(ApiError::BadRequest("Video ID is required".to_string())),
    };

    info!("Fetching transcript for video: {video_id}");
    let transcript = match state.transcripts.fetch(&video_id).await {
        Ok(t) if !t.segments.is_empty() => t,
        Ok(_) | Err(TranscriptError::Unavailable(_)) => {
            warn!("No transcript available for video {video_id}");
            return Err(ApiError::NotFound("No transcript available".to_string()));
        }
        Err(e) => {
            error!("Transcript fetch failed for video {video_id}: {e}");
            return Err(ApiError::Upstream("Failed to fetch transcript".to_string()));
        }
    };

    let text = transcript.text();
    let summary = summarize::summarize(state.summarizer.as_ref(), &text)
        .await
        .map_err(generation_error)?;

    Ok(Json(Summary {
        video_id,
        title: transcript.title,
        summary,
        transcript: text,
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let transcript = request
        .transcript
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Transcript is required".to_string()))?;
    let question = request
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Question is required".to_string()))?;

    let answer = summarize::answer(state.responder.as_ref(), &transcript, &question)
        .await
        .map_err(generation_error)?;

    Ok(Json(ChatResponse { answer }))
}

async fn captions_handler(
    State(state): State<AppState>,
    Query(query): Query<CaptionsQuery>,
) -> Result<Json<CaptionsResponse>, ApiError> {
    let video_id = required(query.video_id).ok_or_else(|| ApiError::BadRequest("Video ID is required".to_string()))?;

    let Some(captions) = state.captions.as_ref() else {
        error!("Captions requested but Google OAuth credentials or refresh token are not configured");
        return Err(ApiError::Upstream("Failed to fetch captions".to_string()));
    };

    match captions.fetch(&video_id).await {
        Ok(Some(transcript)) => Ok(Json(CaptionsResponse { transcript })),
        Ok(None) => Err(ApiError::NotFound("No captions available for this video".to_string())),
        Err(e) => {
            error!("Error fetching captions for video {video_id}: {e:#}");
            Err(ApiError::Upstream("Failed to fetch captions".to_string()))
        }
    }
}

async fn auth_callback_handler(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let code = required(query.code).ok_or_else(|| ApiError::BadRequest("Authorization code is required".to_string()))?;

    let Some(oauth) = state.oauth.as_ref() else {
        error!("OAuth callback hit but Google OAuth credentials are not configured");
        return Err(ApiError::Internal);
    };

    let tokens = oauth.exchange_code(&code).await.map_err(|e| {
        error!("Error during OAuth callback: {e:#}");
        ApiError::Upstream("Failed to authenticate".to_string())
    })?;

    info!("Access token: {}", tokens.access_token);
    info!("Refresh token: {:?}", tokens.refresh_token);

    Ok(Json(CallbackResponse {
        success: true,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}
