//! Shared application state / 공유 애플리케이션 상태

use std::sync::Arc;

use crate::config::AppConfig;
use crate::device::LocalStore;
use crate::notify::Notifier;
use crate::store::HanjaStore;

/// State handed to every route / 라우트 공유 상태
pub struct AppState {
    /// Read-only reference store / 참조 저장소
    pub store: Arc<dyn HanjaStore>,
    /// Toast bus owned by the application root / 알림 버스
    pub notifier: Notifier,
    /// Device-local state of this installation / 로컬 상태
    pub local: LocalStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn HanjaStore>, local: LocalStore, config: AppConfig) -> Self {
        tracing::info!("Reference store backend: {}", store.name());
        Self {
            store,
            notifier: Notifier::new(),
            local,
            config,
        }
    }
}
