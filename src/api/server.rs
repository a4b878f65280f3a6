use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - 상태 확인
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "한자 서비스 정상"
    }))
}

/// GET /api/version - 버전 정보
pub async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}
