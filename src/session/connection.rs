//! One accepted connection, from socket to cleanup.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use crate::registry::ClientRegistry;
use crate::routing::MessageRouter;
use crate::stats::HubStats;
use crate::transport::{ConnectionHandle, LineCodec};

use super::state::SessionState;

/// Drives one connection: feeds inbound frames to the router, drains the
/// outbound queue into the socket, and runs close-time cleanup.
pub(crate) struct Connection {
    session: SessionState,
    framed: Framed<TcpStream, LineCodec>,
    handle: ConnectionHandle,
    outbound: mpsc::UnboundedReceiver<String>,
    router: Arc<MessageRouter>,
    registry: Arc<ClientRegistry>,
    stats: Arc<HubStats>,
}

impl Connection {
    pub(crate) fn new(
        session_id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        max_frame_size: usize,
        router: Arc<MessageRouter>,
        registry: Arc<ClientRegistry>,
        stats: Arc<HubStats>,
    ) -> Self {
        let (handle, outbound) = ConnectionHandle::new(session_id);
        Self {
            session: SessionState::new(session_id, peer_addr),
            framed: Framed::new(socket, LineCodec::new(max_frame_size)),
            handle,
            outbound,
            router,
            registry,
            stats,
        }
    }

    /// Serve the connection until the peer goes away or the transport
    /// fails, then clean up.
    ///
    /// Inbound frames are dispatched one at a time in arrival order;
    /// outbound frames interleave between them.
    pub(crate) async fn run(mut self) {
        tracing::debug!(
            session_id = self.session.id(),
            peer = %self.session.peer_addr(),
            "Connection started"
        );

        loop {
            tokio::select! {
                inbound = self.framed.next() => match inbound {
                    Some(Ok(line)) => {
                        self.router
                            .dispatch(&line, &mut self.session, &self.handle)
                            .await;
                    }
                    Some(Err(err)) => {
                        tracing::warn!(
                            session_id = self.session.id(),
                            error = %err,
                            "Closing connection on framing error"
                        );
                        break;
                    }
                    None => break,
                },
                frame = self.outbound.recv() => match frame {
                    Some(frame) => {
                        if let Err(err) = self.framed.send(frame).await {
                            tracing::debug!(
                                session_id = self.session.id(),
                                error = %err,
                                "Write failed, closing connection"
                            );
                            break;
                        }
                    }
                    // Unreachable while self.handle is alive
                    None => break,
                },
            }
        }

        self.cleanup().await;
    }

    /// Close-time cleanup. Flips liveness first so in-flight deliveries
    /// see not-ready, then deregisters the captured identity (identity
    /// checked, so a superseded connection cannot evict its successor).
    async fn cleanup(&mut self) {
        self.handle.close();

        if let Some(id) = self.session.take_identity() {
            self.registry.remove(&id, self.session.id()).await;
        }
        self.stats.connection_closed();

        tracing::debug!(
            session_id = self.session.id(),
            peer = %self.session.peer_addr(),
            frames = self.session.frames_received(),
            uptime_secs = self.session.uptime().as_secs(),
            "Connection closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    use super::*;

    async fn spawn_connection() -> (Arc<ClientRegistry>, Arc<HubStats>, TcpStream) {
        let registry = Arc::new(ClientRegistry::new());
        let stats = Arc::new(HubStats::new());
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&registry),
            Arc::clone(&stats),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (socket, peer_addr) = listener.accept().await.unwrap();

        stats.connection_opened();
        let conn = Connection::new(
            1,
            socket,
            peer_addr,
            64 * 1024,
            router,
            Arc::clone(&registry),
            Arc::clone(&stats),
        );
        tokio::spawn(conn.run());

        (registry, stats, client)
    }

    #[tokio::test]
    async fn test_register_then_close_cleans_up() {
        let (registry, stats, client) = spawn_connection().await;
        let (read_half, mut write_half) = client.into_split();
        let mut lines = BufReader::new(read_half).lines();

        write_half
            .write_all(b"{\"type\":\"register\",\"userId\":\"alice\"}\n")
            .await
            .unwrap();

        let ack = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let ack: Value = serde_json::from_str(&ack).unwrap();
        assert_eq!(ack["type"], "registered");
        assert_eq!(ack["userId"], "alice");
        assert_eq!(registry.count().await, 1);

        // Closing the socket must deregister alice
        drop(write_half);
        drop(lines);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while registry.count().await != 0 {
            assert!(tokio::time::Instant::now() < deadline, "entry never removed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stats.snapshot().connections_active, 0);
    }

    #[tokio::test]
    async fn test_garbage_frame_keeps_connection_open() {
        let (registry, _stats, client) = spawn_connection().await;
        let (read_half, mut write_half) = client.into_split();
        let mut lines = BufReader::new(read_half).lines();

        write_half.write_all(b"complete garbage\n").await.unwrap();
        write_half
            .write_all(b"{\"type\":\"register\",\"userId\":\"bob\"}\n")
            .await
            .unwrap();

        // The garbage frame produced no response; the register still works
        let ack = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let ack: Value = serde_json::from_str(&ack).unwrap();
        assert_eq!(ack["type"], "registered");
        assert_eq!(ack["userId"], "bob");
        assert_eq!(registry.count().await, 1);
    }
}
