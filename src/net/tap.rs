//! Transparent TCP relay feeding the flow dispatcher.
//!
//! # Responsibilities
//! - Accept a client, connect it to the configured upstream
//! - Forward bytes in both directions unchanged
//! - Tee each direction into its own flow consumer
//!
//! # Data Flow
//! ```text
//! client ──▶ pump ──▶ upstream        (request flow tee ──▶ consumer)
//! client ◀── pump ◀── upstream        (response flow tee ──▶ consumer)
//! ```
//!
//! # Design Decisions
//! - Bytes reach the tee before the peer, so a failed forward is still logged
//! - A consumer that stops early (non-HTTP flow) is detached; relaying goes on
//! - A full tee buffer slows the relay rather than dropping bytes
//! - Past the drain timeout, open relays are closed and their consumers finish
//!   the messages in progress

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::config::TapConfig;
use crate::http::Endpoints;
use crate::net::connection::{ConnectionId, ConnectionTracker};
use crate::net::listener::{Listener, ListenerError};
use crate::stream::FlowDispatcher;

const COPY_BUFFER_BYTES: usize = 16 * 1024;

#[derive(Debug, Error)]
pub enum TapError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to connect to upstream {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("relay I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The relay: accepts clients and spawns one relay task per connection.
pub struct Tap {
    listener: Listener,
    upstream: String,
    tee_buffer_bytes: usize,
    drain_timeout: Duration,
    dispatcher: FlowDispatcher,
    tracker: ConnectionTracker,
}

impl Tap {
    pub async fn bind(config: &TapConfig, dispatcher: FlowDispatcher) -> Result<Self, TapError> {
        let listener = Listener::bind(config).await?;

        Ok(Self {
            listener,
            upstream: config.upstream_address.clone(),
            tee_buffer_bytes: config.tee_buffer_bytes,
            drain_timeout: Duration::from_secs(config.drain_timeout_secs),
            dispatcher,
            tracker: ConnectionTracker::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.listener.local_addr()
    }

    /// Relay connections until shutdown, then wait for open ones to drain.
    ///
    /// Connections still open after the drain timeout are closed. Returns once
    /// every relay and its flow consumers have finished.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), TapError> {
        tracing::info!(upstream = %self.upstream, "Tap relaying");

        let (close_tx, _) = broadcast::channel::<()>(1);
        let mut relays = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (client, peer, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(ListenerError::Closed) => return Err(ListenerError::Closed.into()),
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };

                    let guard = self.tracker.track();
                    let relay = Relay {
                        upstream: self.upstream.clone(),
                        tee_buffer_bytes: self.tee_buffer_bytes,
                        dispatcher: self.dispatcher.clone(),
                        id: guard.id(),
                        close: close_tx.subscribe(),
                    };

                    relays.spawn(async move {
                        let _permit = permit;
                        let id = relay.id;
                        if let Err(e) = relay.run(client, peer).await {
                            tracing::warn!(connection_id = %id, peer_addr = %peer, error = %e, "Relay failed");
                        }
                        drop(guard);
                    });
                }
                Some(_) = relays.join_next(), if !relays.is_empty() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Tap received shutdown signal, no longer accepting");
                    break;
                }
            }
        }

        if !self.tracker.wait_idle(self.drain_timeout).await {
            tracing::warn!(
                active = self.tracker.active_count(),
                "Drain timeout elapsed, closing open connections"
            );
            let _ = close_tx.send(());
        }

        while let Some(joined) = relays.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Relay task panicked");
            }
        }
        Ok(())
    }
}

/// One client connection and what it needs to relay and tee its traffic.
struct Relay {
    upstream: String,
    tee_buffer_bytes: usize,
    dispatcher: FlowDispatcher,
    id: ConnectionId,
    close: broadcast::Receiver<()>,
}

impl Relay {
    /// Relay `client` to the upstream, teeing both directions, then wait for
    /// both flow consumers to emit what they hold.
    async fn run(mut self, client: TcpStream, peer: SocketAddr) -> Result<(), TapError> {
        let id = self.id;
        let upstream = tokio::select! {
            connected = TcpStream::connect(&self.upstream) => {
                connected.map_err(|source| TapError::Connect {
                    addr: self.upstream.clone(),
                    source,
                })?
            }
            Ok(()) = self.close.recv() => return Ok(()),
        };

        let request_flow = Endpoints::from_addrs(peer, upstream.peer_addr()?);
        let response_flow = request_flow.reversed();
        tracing::debug!(connection_id = %id, flow = %request_flow, "Relaying connection");

        let (request_tee, request_reader) = tokio::io::duplex(self.tee_buffer_bytes);
        let (response_tee, response_reader) = tokio::io::duplex(self.tee_buffer_bytes);
        let consumers = [
            self.dispatcher.spawn(request_flow, request_reader),
            self.dispatcher.spawn(response_flow, response_reader),
        ];

        let (client_read, client_write) = client.into_split();
        let (upstream_read, upstream_write) = upstream.into_split();

        let (sent, received) = tokio::join!(
            pump(client_read, upstream_write, request_tee, self.close.resubscribe()),
            pump(upstream_read, client_write, response_tee, self.close.resubscribe()),
        );

        tracing::debug!(
            connection_id = %id,
            bytes_sent = ?sent.as_ref().ok(),
            bytes_received = ?received.as_ref().ok(),
            "Connection closed"
        );

        // Tees are gone, so both consumers are at end of stream.
        for consumer in consumers {
            if let Err(e) = consumer.await {
                tracing::error!(connection_id = %id, error = %e, "Flow consumer panicked");
            }
        }

        sent?;
        received?;
        Ok(())
    }
}

/// Copy `from` into `to` until EOF or `close` fires, writing every chunk to
/// `tee` first.
///
/// EOF on `from` is propagated as a write shutdown on `to`. Dropping `tee` on
/// return ends the flow for its consumer.
async fn pump<R, W>(
    mut from: R,
    mut to: W,
    tee: DuplexStream,
    mut close: broadcast::Receiver<()>,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut tee = Some(tee);
    let mut total = 0u64;

    let closed = tokio::select! {
        copied = copy_teed(&mut from, &mut to, &mut tee, &mut total) => {
            copied?;
            false
        }
        Ok(()) = close.recv() => true,
    };

    if closed {
        tracing::debug!(bytes = total, "Relay closed on shutdown");
    }
    Ok(total)
}

async fn copy_teed<R, W>(
    from: &mut R,
    to: &mut W,
    tee: &mut Option<DuplexStream>,
    total: &mut u64,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; COPY_BUFFER_BYTES];

    loop {
        let n = from.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        if let Some(flow) = tee.as_mut() {
            if flow.write_all(&buf[..n]).await.is_err() {
                tracing::trace!("Flow consumer gone, detaching tee");
                *tee = None;
            }
        }

        to.write_all(&buf[..n]).await?;
        *total += n as u64;
    }

    to.shutdown().await
}
