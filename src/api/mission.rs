use axum::extract::State;
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{bad_request, load_view, respond, ApiResult};
use crate::device::Streak;
use crate::mission::{finish_mission, generate_mission, MissionOutcome, QuizQuestion};
use crate::state::AppState;

/// GET /api/mission/today - 오늘의 미션
pub async fn today(State(state): State<Arc<AppState>>) -> ApiResult<Vec<QuizQuestion>> {
    let mut rng = StdRng::from_entropy();
    load_view(generate_mission(state.store.as_ref(), &mut rng)).await
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub questions: Vec<QuizQuestion>,
    pub answers: Vec<usize>,
}

/// POST /api/mission/complete - 미션 완료 (서버 채점, 연속 학습일 갱신)
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteRequest>,
) -> ApiResult<MissionOutcome> {
    if req.questions.is_empty() {
        return Err(bad_request("no questions"));
    }
    let streak = Streak::new(state.local.clone());
    let today = chrono::Utc::now().date_naive();
    let outcome = finish_mission(state.store.as_ref(), &req.questions, &req.answers, &streak, today).await;
    if let Ok(o) = &outcome {
        if o.score == o.total {
            state.notifier.toast("미션 완료!");
        }
    }
    respond(outcome)
}
