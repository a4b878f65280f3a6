//! Toast notification bus / 알림 이벤트 버스
//!
//! One `Notifier` is owned by the application root and cloned into whatever needs to
//! publish. Listeners hold a `Subscription`; dropping it unsubscribes.

use serde::Serialize;
use tokio::sync::broadcast;

/// How long a toast stays visible / 토스트 표시 시간
pub const TOAST_DURATION_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub message: String,
    pub duration_ms: u64,
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish a toast; returns how many listeners received it / 토스트 발행
    ///
    /// With nobody listening the toast is dropped.
    pub fn toast(&self, message: impl Into<String>) -> usize {
        let toast = Toast {
            message: message.into(),
            duration_ms: TOAST_DURATION_MS,
        };
        self.sender.send(toast).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Live toast listener / 알림 구독
pub struct Subscription {
    receiver: broadcast::Receiver<Toast>,
}

impl Subscription {
    /// Next toast, or `None` once the notifier is gone / 다음 알림
    ///
    /// A listener that fell behind skips the toasts it missed.
    pub async fn recv(&mut self) -> Option<Toast> {
        loop {
            match self.receiver.recv().await {
                Ok(toast) => return Some(toast),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Toast listener lagged, skipped {}", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<Toast> {
        loop {
            match self.receiver.try_recv() {
                Ok(toast) => return Some(toast),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
