//! Offline replay of a recorded flow.

use std::io;
use std::path::Path;

use crate::http::Endpoints;
use crate::stream::dispatch::FlowDispatcher;

/// Feed the raw bytes of `path` through one consumer, as a single flow.
///
/// Returns once the flow has been fully consumed and its output written.
pub async fn replay_file(path: &Path, endpoints: Endpoints, dispatcher: &FlowDispatcher) -> io::Result<()> {
    let file = tokio::fs::File::open(path).await?;
    tracing::info!(path = %path.display(), flow = %endpoints, "Replaying flow");

    dispatcher.spawn(endpoints, file).await.map_err(io::Error::other)
}
