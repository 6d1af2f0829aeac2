//! In-process connection pair.
//!
//! [`MemoryConnection::pair`] returns the client half (a [`Connection`]) and
//! a [`MemoryPeer`] that plays the server: it sees every frame the client
//! sends and can push frames or hang up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, TransportError};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// Client half of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    outgoing: mpsc::UnboundedSender<String>,
    incoming: Mutex<mpsc::UnboundedReceiver<String>>,
    open: Arc<AtomicBool>,
}

/// Server half of an in-memory connection.
pub struct MemoryPeer {
    to_client: Option<mpsc::UnboundedSender<String>>,
    from_client: mpsc::UnboundedReceiver<String>,
    open: Arc<AtomicBool>,
}

impl MemoryConnection {
    /// Creates a connected client/peer pair.
    pub fn pair() -> (Self, MemoryPeer) {
        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(true));
        let id =
            ConnectionId::new(NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed));

        let conn = Self {
            id,
            outgoing,
            incoming: Mutex::new(incoming),
            open: Arc::clone(&open),
        };
        let peer = MemoryPeer {
            to_client: Some(to_client),
            from_client,
            open,
        };
        (conn, peer)
    }
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        if !self.is_open() {
            return Err(TransportError::ConnectionClosed(
                "send on closed connection".into(),
            ));
        }
        self.outgoing.send(text.to_owned()).map_err(|_| {
            self.open.store(false, Ordering::Release);
            TransportError::ConnectionClosed("peer dropped".into())
        })
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        let next = self.incoming.lock().await.recv().await;
        if next.is_none() {
            self.open.store(false, Ordering::Release);
        }
        Ok(next)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

impl MemoryPeer {
    /// Pushes a frame to the client. Returns `false` once hung up.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.to_client
            .as_ref()
            .is_some_and(|tx| tx.send(text.into()).is_ok())
    }

    /// Waits for the next frame the client sent.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Returns a frame the client already sent, without waiting.
    pub fn try_next_sent(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// Closes the server side; the client's `recv` then yields `None`.
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }

    /// Whether the client still considers the connection open.
    pub fn client_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
