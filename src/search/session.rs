//! Debounced, supersedable search session / 디바운스 검색 세션
//!
//! Every submitted query takes the next value of a monotonic request counter. A fetch
//! may only publish its results while its token is still the latest one; anything older
//! is dropped silently. Publishing happens under the state channel's lock, so a newer
//! submit can never be overwritten by an older response.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::SearchSource;
use crate::models::CharacterWithReading;

/// Visible search state / 검색 상태
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<CharacterWithReading>,
    pub loading: bool,
}

pub struct SearchSession {
    source: Arc<dyn SearchSource>,
    debounce: Duration,
    latest: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn SearchSource>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            debounce,
            latest: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Issue a query; returns its request token / 검색 요청
    ///
    /// An empty (after trim) query clears the results immediately and never reaches
    /// the source.
    pub fn submit(&self, query: &str) -> u64 {
        let query = query.trim().to_string();
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if query.is_empty() {
            self.state.send_replace(SearchState::default());
            return token;
        }

        self.state.send_modify(|s| {
            s.query = query.clone();
            s.loading = true;
        });

        let source = self.source.clone();
        let latest = self.latest.clone();
        let state = self.state.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            // Superseded while waiting out the debounce
            if latest.load(Ordering::SeqCst) != token {
                return;
            }

            let results = match source.search(&query).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!("Search '{}' failed: {}", query, e);
                    Vec::new()
                }
            };

            let applied = state.send_if_modified(|s| {
                if latest.load(Ordering::SeqCst) != token {
                    return false;
                }
                *s = SearchState {
                    query: query.clone(),
                    results,
                    loading: false,
                };
                true
            });
            if !applied {
                tracing::debug!("Discarded stale search response #{} for '{}'", token, query);
            }
        });

        token
    }

    /// Token of the most recent request
    pub fn latest_token(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        // In-flight fetches see a newer token and discard their results
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::store::memory::fixtures::character;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Answers every query with one fake hit after a per-query delay
    struct SlowSource {
        delays: Vec<(&'static str, u64)>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchSource for SlowSource {
        async fn search(&self, query: &str) -> Result<Vec<CharacterWithReading>> {
            self.calls.lock().push(query.to_string());
            let delay = self
                .delays
                .iter()
                .find(|(q, _)| *q == query)
                .map(|(_, ms)| *ms)
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![CharacterWithReading {
                character: character(query, query, query),
                reading: query.to_string(),
            }])
        }
    }

    fn slow(delays: Vec<(&'static str, u64)>) -> Arc<SlowSource> {
        Arc::new(SlowSource {
            delays,
            calls: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_discarded() {
        let source = slow(vec![("A", 150), ("AB", 10)]);
        let session = SearchSession::new(source.clone(), Duration::ZERO);

        session.submit("A");
        tokio::time::sleep(Duration::from_millis(30)).await;
        session.submit("AB");
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Both fetches ran, only the newer one is visible
        assert_eq!(source.calls.lock().len(), 2);
        let state = session.snapshot();
        assert_eq!(state.query, "AB");
        assert!(!state.loading);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].reading, "AB");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_skips_superseded_fetch() {
        let source = slow(vec![]);
        let session = SearchSession::new(source.clone(), Duration::from_millis(50));

        session.submit("A");
        session.submit("AB");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(*source.calls.lock(), vec!["AB".to_string()]);
        assert_eq!(session.snapshot().query, "AB");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_clears_without_fetch() {
        let source = slow(vec![("A", 100)]);
        let session = SearchSession::new(source.clone(), Duration::ZERO);

        session.submit("A");
        session.submit("   ");
        tokio::time::sleep(Duration::from_millis(200)).await;

        let state = session.snapshot();
        assert_eq!(state, SearchState::default());
        assert_eq!(source.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_tokens_increase() {
        let session = SearchSession::new(slow(vec![]), Duration::ZERO);
        let a = session.submit("A");
        let b = session.submit("B");
        assert!(b > a);
        assert_eq!(session.latest_token(), b);
    }
}
