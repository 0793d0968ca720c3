//! Live-update endpoint: pushes refreshed product listings to connected view
//! clients over Server-Sent Events.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use crate::app::services::AppServices;

/// GET /live/products
///
/// Streams one SSE event per feed notification, named after the topic.
/// Delivery is at-most-once: a client that lags past the feed's buffer loses
/// the missed messages (it will catch up on the next catalog change, since
/// every notification carries the full listing).
pub async fn products_stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.feed.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(note) => Some(Ok(
            SseEvent::default().event(note.topic).data(note.payload.to_string())
        )),
        // Lagged receiver: skip and keep streaming.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
