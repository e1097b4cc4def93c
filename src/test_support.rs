use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;

pub const STUB_ACCESS_TOKEN: &str = "ya29.stub-access";
pub const STUB_REFRESH_TOKEN: &str = "1//stub-refresh";
pub const VIDEO_WITHOUT_CAPTIONS: &str = "nocaptions1";
pub const REJECTED_CODE: &str = "expired-code";

/// Requests seen by the Google stub
#[derive(Clone, Default)]
pub struct Recorded {
    pub token_forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub authorizations: Arc<Mutex<Vec<String>>>,
    pub caption_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Serve `app` on an ephemeral local port, returning its base URL
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Local stand-in for Google's token endpoint (`/token`) and the Data API captions resource
pub async fn spawn_google() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/token", post(token))
        .route("/captions", get(list_captions))
        .route("/captions/{id}", get(download_caption))
        .with_state(recorded.clone());
    (spawn(app).await, recorded)
}

async fn token(State(recorded): State<Recorded>, Form(form): Form<HashMap<String, String>>) -> Response {
    let grant_type = form.get("grant_type").cloned().unwrap_or_default();
    let rejected = form.get("code").is_some_and(|code| code == REJECTED_CODE);
    recorded.token_forms.lock().unwrap().push(form);

    if rejected {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response();
    }

    let body = if grant_type == "authorization_code" {
        json!({
            "access_token": STUB_ACCESS_TOKEN,
            "refresh_token": STUB_REFRESH_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        })
    } else {
        json!({"access_token": STUB_ACCESS_TOKEN, "expires_in": 3599, "token_type": "Bearer"})
    };
    Json(body).into_response()
}

fn authorization(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn list_captions(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    recorded.authorizations.lock().unwrap().push(authorization(&headers));
    let video_id = query.get("videoId").cloned().unwrap_or_default();
    recorded.caption_queries.lock().unwrap().push(query);

    let items = if video_id == VIDEO_WITHOUT_CAPTIONS {
        json!([])
    } else {
        json!([{"kind": "youtube#caption", "id": format!("track-{video_id}")}])
    };
    Json(json!({"kind": "youtube#captionListResponse", "items": items}))
}

async fn download_caption(State(recorded): State<Recorded>, headers: HeaderMap, Path(id): Path<String>) -> String {
    recorded.authorizations.lock().unwrap().push(authorization(&headers));
    format!("captions of {id}")
}
