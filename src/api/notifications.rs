use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;

use crate::notify::Toast;
use crate::state::AppState;

/// GET /api/notifications - 토스트 알림 스트림 (SSE)
pub async fn stream_toasts(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.notifier.subscribe();
    tracing::debug!("Toast listener connected ({} total)", state.notifier.subscriber_count());

    let events = stream::unfold(subscription, |mut subscription| async move {
        let toast = subscription.recv().await?;
        Some((Ok(toast_event(&toast)), subscription))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn toast_event(toast: &Toast) -> Event {
    match Event::default().event("toast").json_data(toast) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to encode toast: {}", e);
            Event::default().event("toast").data(toast.message.as_str())
        }
    }
}
