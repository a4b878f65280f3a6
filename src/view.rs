//! View load state with cancellation / 화면 로드 상태
//!
//! Page loads (character view, series, radical, mission) go through a `ViewLoader` owned
//! by the HTTP request (`api::load_view`); review-queue initialization goes through
//! `ReviewQueue::load_into`. The owner cancels on teardown; a load that finishes
//! afterwards leaves the state untouched.

use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::{HanjaError, Result};

/// User-facing message for a failed load / 로드 실패 메시지
pub const LOAD_FAILED_MESSAGE: &str = "could not load";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    NotFound,
    Failed(String),
}

impl<T> LoadState<T> {
    /// Not-found stays distinct from every other failure / 결과 변환
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(HanjaError::NotFound { kind, key }) => {
                tracing::debug!("{} not found: {}", kind, key);
                LoadState::NotFound
            }
            Err(e) => {
                tracing::warn!("Load failed: {}", e);
                LoadState::Failed(LOAD_FAILED_MESSAGE.to_string())
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Shared half of a loader, safe to move into spawned tasks / 로더 핸들
pub struct LoaderHandle<T> {
    cancelled: Arc<AtomicBool>,
    state: Arc<RwLock<LoadState<T>>>,
}

impl<T> Clone for LoaderHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cancelled: self.cancelled.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Clone> LoaderHandle<T> {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LoadState<T> {
        self.state.read().clone()
    }

    /// Apply a state unless cancelled; returns whether it was applied
    fn set(&self, next: LoadState<T>) -> bool {
        let mut state = self.state.write();
        if self.is_cancelled() {
            return false;
        }
        *state = next;
        true
    }

    /// Drive one load to completion / 로드 실행
    ///
    /// Returns `false` when the loader was cancelled before the result could be applied.
    pub async fn run<F>(&self, load: F) -> bool
    where
        F: Future<Output = Result<T>>,
    {
        if !self.set(LoadState::Loading) {
            return false;
        }
        let outcome = load.await;
        let applied = self.set(LoadState::from_result(outcome));
        if !applied {
            tracing::debug!("Load finished after cancel, result dropped");
        }
        applied
    }
}

/// Owner of a view's load state; cancels on drop / 화면 로더
pub struct ViewLoader<T> {
    handle: LoaderHandle<T>,
}

impl<T: Clone + Send + Sync + 'static> ViewLoader<T> {
    pub fn new() -> Self {
        Self {
            handle: LoaderHandle {
                cancelled: Arc::new(AtomicBool::new(false)),
                state: Arc::new(RwLock::new(LoadState::Idle)),
            },
        }
    }

    pub fn handle(&self) -> LoaderHandle<T> {
        self.handle.clone()
    }

    pub fn state(&self) -> LoadState<T> {
        self.handle.state()
    }

    pub fn cancel(&self) {
        self.handle.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    pub async fn run<F>(&self, load: F) -> bool
    where
        F: Future<Output = Result<T>>,
    {
        self.handle.run(load).await
    }

    /// Run the load on the runtime / 백그라운드 로드
    pub fn spawn<F>(&self, load: F) -> JoinHandle<bool>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let handle = self.handle();
        tokio::spawn(async move { handle.run(load).await })
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ViewLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ViewLoader<T> {
    fn drop(&mut self) {
        self.handle.cancelled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_sets_loaded() {
        let loader: ViewLoader<u32> = ViewLoader::new();
        assert_eq!(loader.state(), LoadState::Idle);
        assert!(loader.run(async { Ok(7) }).await);
        assert_eq!(loader.state(), LoadState::Loaded(7));
    }

    #[tokio::test]
    async fn test_not_found_and_failure_are_distinct() {
        let loader: ViewLoader<u32> = ViewLoader::new();
        loader
            .run(async { Err(HanjaError::not_found("character", "海")) })
            .await;
        assert_eq!(loader.state(), LoadState::NotFound);

        loader
            .run(async { Err(HanjaError::Decode("bad json".to_string())) })
            .await;
        assert_eq!(loader.state(), LoadState::Failed(LOAD_FAILED_MESSAGE.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_flight_drops_result() {
        let loader: ViewLoader<u32> = ViewLoader::new();
        let task = loader.spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(1)
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(loader.state().is_loading());
        loader.cancel();

        assert!(!task.await.unwrap());
        assert!(loader.state().is_loading());
    }

    #[tokio::test]
    async fn test_drop_cancels_handle() {
        let loader: ViewLoader<u32> = ViewLoader::new();
        let handle = loader.handle();
        drop(loader);
        assert!(handle.is_cancelled());
        assert!(!handle.run(async { Ok(1) }).await);
        assert_eq!(handle.state(), LoadState::Idle);
    }
}
