use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hanja_backend::api;
use hanja_backend::config;
use hanja_backend::device::LocalStore;
use hanja_backend::state::AppState;
use hanja_backend::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hanja_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 설정 로드
    let app_config = config::init_config()
        .map_err(anyhow::Error::msg)?
        .read()
        .clone();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Create data directory if not exists / 데이터 디렉터리 생성
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    // DATABASE_URL overrides config.json / 환경 변수 우선
    let database_url = app_config.get_database_url();
    let store = SqliteStore::connect(&database_url).await?;

    let local = LocalStore::open_dir(app_config.get_device_state_dir());

    let state = Arc::new(AppState::new(Arc::new(store), local, app_config.clone()));

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
