//! Spawning of flow consumers.

use std::sync::Arc;

use tokio::io::{AsyncRead, BufReader};
use tokio::task::JoinHandle;

use crate::http::{Endpoints, SequenceAllocator};
use crate::render::MessagePresenter;
use crate::stream::consumer::FlowStreamConsumer;

/// Starts one consumer task per flow.
///
/// All consumers started by one dispatcher (and its clones) share the id
/// allocator and the presenter.
#[derive(Clone)]
pub struct FlowDispatcher {
    ids: Arc<SequenceAllocator>,
    presenter: MessagePresenter,
}

impl FlowDispatcher {
    pub fn new(ids: Arc<SequenceAllocator>, presenter: MessagePresenter) -> Self {
        Self { ids, presenter }
    }

    pub fn presenter(&self) -> &MessagePresenter {
        &self.presenter
    }

    /// Consume `reader` as one directional flow on its own task.
    ///
    /// The task ends when the stream ends or turns out not to be HTTP.
    pub fn spawn<R>(&self, endpoints: Endpoints, reader: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tracing::trace!(flow = %endpoints, "Starting flow consumer");
        let consumer = FlowStreamConsumer::new(endpoints, Arc::clone(&self.ids));
        let presenter = self.presenter.clone();

        tokio::spawn(async move {
            consumer.run(BufReader::new(reader), &presenter).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::output::MemorySink;

    #[tokio::test]
    async fn test_spawned_flows_share_allocator() {
        let sink = Arc::new(MemorySink::new());
        let presenter = MessagePresenter::with_config(sink.clone(), RenderConfig::default());
        let dispatcher = FlowDispatcher::new(Arc::new(SequenceAllocator::new()), presenter);

        let endpoints = Endpoints::parse("10.0.0.1:40000", "10.0.0.2:80");
        let request: &'static [u8] = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";
        let response: &'static [u8] = b"HTTP/1.1 204 No Content\r\n\r\n";

        let a = dispatcher.spawn(endpoints.clone(), request);
        let b = dispatcher.spawn(endpoints.reversed(), response);
        a.await.unwrap();
        b.await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.contains("] Request ---")));
        assert!(records.iter().any(|r| r.contains("] Response ---")));
        assert!(records.iter().any(|r| r.starts_with("---------------------- [1]")));
        assert!(records.iter().any(|r| r.starts_with("---------------------- [2]")));
    }

    #[tokio::test]
    async fn test_non_http_flow_emits_nothing() {
        let sink = Arc::new(MemorySink::new());
        let presenter = MessagePresenter::with_config(sink.clone(), RenderConfig::default());
        let dispatcher = FlowDispatcher::new(Arc::new(SequenceAllocator::new()), presenter);

        let payload: &'static [u8] = b"SSH-2.0-OpenSSH_9.6\r\nGET / HTTP/1.1\r\n\r\n";
        dispatcher
            .spawn(Endpoints::parse("a:1", "b:22"), payload)
            .await
            .unwrap();

        assert!(sink.is_empty());
    }
}
