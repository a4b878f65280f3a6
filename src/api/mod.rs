pub mod characters;
pub mod mission;
pub mod notifications;
pub mod radicals;
pub mod search;
pub mod server;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::state::AppState;
use crate::view::{LoadState, ViewLoader, LOAD_FAILED_MESSAGE};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            code: 400,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            code: 404,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            code: 500,
            message: message.to_string(),
            data: None,
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);
pub type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// Loader outcome → HTTP response / 로드 결과를 응답으로 변환
///
/// Not-found and load failures get distinct status codes and messages.
pub fn respond<T>(result: Result<T>) -> ApiResult<T> {
    respond_state(LoadState::from_result(result))
}

/// Run a page load through a loader owned by the request / 화면 로드
///
/// The loader is dropped, and so cancelled, together with the request; a cancelled
/// load never reaches `Loaded`.
pub async fn load_view<T, F>(load: F) -> ApiResult<T>
where
    T: Clone + Send + Sync + 'static,
    F: Future<Output = Result<T>>,
{
    let loader = ViewLoader::new();
    loader.run(load).await;
    respond_state(loader.state())
}

fn respond_state<T>(state: LoadState<T>) -> ApiResult<T> {
    match state {
        LoadState::Loaded(data) => Ok(Json(ApiResponse::success(data))),
        LoadState::NotFound => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::not_found("not found")),
        )),
        LoadState::Failed(message) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(&message)),
        )),
        LoadState::Idle | LoadState::Loading => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(LOAD_FAILED_MESSAGE)),
        )),
    }
}

pub fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

/// All JSON routes / 전체 라우트
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/version", get(server::version))
        // 한자
        .route("/api/characters", get(characters::list_characters))
        .route("/api/characters/random", get(characters::random_character))
        .route("/api/characters/:char", get(characters::get_character))
        .route("/api/characters/:char/siblings", get(characters::get_siblings))
        .route("/api/characters/:char/meaning-tree", get(characters::get_meaning_tree))
        .route("/api/characters/:char/details", get(characters::get_details))
        .route("/api/characters/:char/view", get(characters::get_view))
        .route("/api/series/:char", get(characters::get_series))
        .route("/api/search", get(search::search))
        // 부수·단원
        .route("/api/radicals", get(radicals::list_radicals))
        .route("/api/radicals/:number", get(radicals::get_radical))
        .route("/api/radicals/:number/related", get(radicals::get_related))
        .route("/api/lessons", get(radicals::list_lessons))
        .route("/api/lessons/:number/radicals", get(radicals::get_lesson_radicals))
        // 미션
        .route("/api/mission/today", get(mission::today))
        .route("/api/mission/complete", post(mission::complete))
        // 알림
        .route("/api/notifications", get(notifications::stream_toasts))
        .with_state(state)
}
