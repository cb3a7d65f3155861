use axum::{
    extract::Extension,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};

use super::feed::ChangeNotifier;

/// Streams one event per snapshot frame. Each `key=value` line becomes a
/// `data:` line of the event, so clients read the frame back verbatim.
pub async fn handle_updates(
    Extension(notifier): Extension<Arc<ChangeNotifier>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(
        "New update subscriber ({} already active)",
        notifier.active_subscribers()
    );

    // SSE fields cannot carry carriage returns
    let stream = notifier
        .subscribe()
        .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.replace('\r', ""))));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
