//! Peer Transport
//!
//! The coordination core is transport-agnostic: it consumes peer identities,
//! direct unreliable messaging channels and lifecycle events through the
//! traits defined here. Connection establishment is announcement-driven
//! inside the transport: a joining peer posts a tagged `player joined <id>`
//! message on the shared signaling board, and every transport reacts by
//! dialing the announced id. The core itself never places calls, it only
//! drains events.
//!
//! [`LocalHub`] is the in-process implementation used by tests and the demo
//! binary: a mesh of endpoints wired together with channels, with the
//! signaling board modeled as an append-only message list.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::game::player::PeerId;
use crate::network::protocol::WireMessage;

// =============================================================================
// ERRORS
// =============================================================================

/// Transport failures.
///
/// Never fatal to the session: a failed send means the peer is treated as
/// not-yet-connected and will be reached again only via its next signaling
/// announcement.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The remote end of a connection is gone.
    #[error("connection to {0} is closed")]
    ConnectionClosed(PeerId),

    /// A send failed for a transport-specific reason.
    #[error("send to {0} failed: {1}")]
    SendFailed(PeerId, String),

    /// The local endpoint is no longer registered with its hub.
    #[error("endpoint is offline")]
    Offline,
}

// =============================================================================
// TRAITS
// =============================================================================

/// A direct messaging channel to one remote peer.
pub trait Connection: Send {
    /// The remote peer this connection reaches.
    fn peer_id(&self) -> &PeerId;

    /// Send one wire message. Delivery is unreliable; an error means the
    /// remote is unreachable, not that the session should stop.
    fn send(&self, message: &WireMessage) -> Result<(), TransportError>;
}

/// A local transport endpoint: one peer identity plus its event stream.
pub trait PeerTransport: Send {
    /// The locally-unique peer identifier minted for this endpoint.
    fn local_id(&self) -> &PeerId;

    /// Take the next queued lifecycle or data event, if any.
    ///
    /// Non-blocking; the session drains this once per frame so every
    /// handler runs on the single logical game thread.
    fn poll_event(&mut self) -> Option<TransportEvent>;
}

// =============================================================================
// EVENTS
// =============================================================================

/// Lifecycle and data events queued for the session.
pub enum TransportEvent {
    /// The local endpoint finished opening and owns its identity.
    Opened {
        /// The local peer id.
        id: PeerId,
    },

    /// A direct connection to a remote peer is established, in either
    /// direction. Handshakes resolve independently and out of order
    /// relative to signaling announcements.
    Connected {
        /// The remote peer.
        id: PeerId,
        /// Channel for sending to that peer.
        connection: Box<dyn Connection>,
    },

    /// A wire message arrived from a remote peer.
    Data {
        /// The sending peer.
        from: PeerId,
        /// The decoded message.
        message: WireMessage,
    },

    /// A remote peer's connection closed.
    Closed {
        /// The departed peer.
        id: PeerId,
    },

    /// A transport-level failure worth surfacing to the log.
    Errored {
        /// The peer involved, when known.
        id: Option<PeerId>,
        /// What went wrong.
        error: TransportError,
    },
}

// =============================================================================
// SIGNALING
// =============================================================================

/// Tag prefix for join announcements on the signaling board.
const JOIN_TAG: &str = "player joined";

/// Format a join announcement for the signaling board.
pub fn join_announcement(id: &PeerId) -> String {
    format!("{JOIN_TAG} {id}")
}

/// Parse a signaling board message; returns the joined peer id when the
/// message is a join announcement, `None` for anything else.
pub fn parse_announcement(message: &str) -> Option<PeerId> {
    let mut parts = message.split_whitespace();
    if parts.next() != Some("player") || parts.next() != Some("joined") {
        return None;
    }
    let id = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(PeerId::from(id))
}

// =============================================================================
// LOCAL HUB
// =============================================================================

struct HubInner {
    /// Append-only signaling board; join announcements are never removed,
    /// so lookups against `peers` decide which announced ids are still live.
    board: Vec<String>,
    /// Event queues of every registered endpoint.
    peers: BTreeMap<PeerId, mpsc::UnboundedSender<TransportEvent>>,
}

/// In-process peer mesh: signaling board plus direct channels.
///
/// `open()` mints an endpoint, announces it on the board and establishes
/// connections with every live announced peer in both directions, mirroring
/// what a real signaling-channel transport does when it replays historical
/// announcements to a newcomer.
#[derive(Clone)]
pub struct LocalHub {
    inner: Arc<Mutex<HubInner>>,
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHub {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                board: Vec::new(),
                peers: BTreeMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a new endpoint on the mesh.
    pub fn open(&self) -> LocalEndpoint {
        let id = PeerId::new(uuid::Uuid::new_v4().to_string());
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.lock();

        // The endpoint learns its identity first, then its connections.
        let _ = tx.send(TransportEvent::Opened { id: id.clone() });

        // Replay the board: every announced id still registered gets a
        // connection pair, one handle per direction.
        let known: Vec<PeerId> = inner
            .board
            .iter()
            .filter_map(|m| parse_announcement(m))
            .collect();
        for remote in known {
            let Some(remote_tx) = inner.peers.get(&remote) else {
                continue; // announced but already gone
            };
            let _ = tx.send(TransportEvent::Connected {
                id: remote.clone(),
                connection: Box::new(LocalConnection {
                    from: id.clone(),
                    to: remote.clone(),
                    sink: remote_tx.clone(),
                }),
            });
            let _ = remote_tx.send(TransportEvent::Connected {
                id: id.clone(),
                connection: Box::new(LocalConnection {
                    from: remote.clone(),
                    to: id.clone(),
                    sink: tx.clone(),
                }),
            });
        }

        inner.board.push(join_announcement(&id));
        inner.peers.insert(id.clone(), tx);
        debug!(peer = %id, "endpoint opened");

        LocalEndpoint {
            id,
            hub: self.clone(),
            events: rx,
            online: true,
        }
    }

    /// Number of live endpoints.
    pub fn peer_count(&self) -> usize {
        self.lock().peers.len()
    }

    /// Snapshot of the signaling board, oldest first.
    pub fn board(&self) -> Vec<String> {
        self.lock().board.clone()
    }

    fn leave(&self, id: &PeerId) {
        let mut inner = self.lock();
        if inner.peers.remove(id).is_none() {
            return;
        }
        for tx in inner.peers.values() {
            let _ = tx.send(TransportEvent::Closed { id: id.clone() });
        }
        debug!(peer = %id, "endpoint closed");
    }
}

/// Connection handle between two hub endpoints.
struct LocalConnection {
    from: PeerId,
    to: PeerId,
    sink: mpsc::UnboundedSender<TransportEvent>,
}

impl Connection for LocalConnection {
    fn peer_id(&self) -> &PeerId {
        &self.to
    }

    fn send(&self, message: &WireMessage) -> Result<(), TransportError> {
        self.sink
            .send(TransportEvent::Data {
                from: self.from.clone(),
                message: message.clone(),
            })
            .map_err(|_| TransportError::ConnectionClosed(self.to.clone()))
    }
}

/// One peer's endpoint on a [`LocalHub`].
pub struct LocalEndpoint {
    id: PeerId,
    hub: LocalHub,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    online: bool,
}

impl LocalEndpoint {
    /// Leave the mesh, delivering `Closed` to every remaining peer.
    ///
    /// Also closes the inbound queue, so connections other peers still
    /// hold start failing their sends instead of filling a dead mailbox.
    pub fn close(&mut self) {
        if !self.online {
            return;
        }
        self.online = false;
        self.events.close();
        let id = self.id.clone();
        self.hub.leave(&id);
    }
}

impl Drop for LocalEndpoint {
    fn drop(&mut self) {
        self.close();
    }
}

impl PeerTransport for LocalEndpoint {
    fn local_id(&self) -> &PeerId {
        &self.id
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::protocol::WireMessage;

    fn drain(endpoint: &mut LocalEndpoint) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Some(e) = endpoint.poll_event() {
            events.push(e);
        }
        events
    }

    #[test]
    fn test_announcement_roundtrip() {
        let id = PeerId::from("abc-123");
        let msg = join_announcement(&id);
        assert_eq!(msg, "player joined abc-123");
        assert_eq!(parse_announcement(&msg), Some(id));
    }

    #[test]
    fn test_announcement_rejects_other_messages() {
        assert_eq!(parse_announcement("room created xyz"), None);
        assert_eq!(parse_announcement("player joined"), None);
        assert_eq!(parse_announcement("player joined a b"), None);
        assert_eq!(parse_announcement(""), None);
    }

    #[test]
    fn test_open_delivers_opened_first() {
        let hub = LocalHub::new();
        let mut a = hub.open();

        let events = drain(&mut a);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], TransportEvent::Opened { id } if id == a.local_id()));
    }

    #[test]
    fn test_second_peer_connects_both_ways() {
        let hub = LocalHub::new();
        let mut a = hub.open();
        drain(&mut a);

        let mut b = hub.open();

        let b_events = drain(&mut b);
        assert!(matches!(&b_events[0], TransportEvent::Opened { .. }));
        assert!(
            matches!(&b_events[1], TransportEvent::Connected { id, .. } if id == a.local_id())
        );

        let a_events = drain(&mut a);
        assert_eq!(a_events.len(), 1);
        assert!(
            matches!(&a_events[0], TransportEvent::Connected { id, .. } if id == b.local_id())
        );
    }

    #[test]
    fn test_send_delivers_data() {
        let hub = LocalHub::new();
        let mut a = hub.open();
        let mut b = hub.open();
        drain(&mut b);

        let events = drain(&mut a);
        let connection = events
            .into_iter()
            .find_map(|e| match e {
                TransportEvent::Connected { connection, .. } => Some(connection),
                _ => None,
            })
            .expect("a should hold a connection to b");

        let msg = WireMessage::new(a.local_id().clone(), 42);
        connection.send(&msg).expect("send should succeed");

        let received = drain(&mut b);
        assert_eq!(received.len(), 1);
        match &received[0] {
            TransportEvent::Data { from, message } => {
                assert_eq!(from, a.local_id());
                assert_eq!(message.date, 42);
            }
            _ => panic!("expected data event"),
        }
    }

    #[test]
    fn test_close_notifies_and_breaks_sends() {
        let hub = LocalHub::new();
        let mut a = hub.open();
        let mut b = hub.open();
        drain(&mut b);

        let connection = drain(&mut a)
            .into_iter()
            .find_map(|e| match e {
                TransportEvent::Connected { connection, .. } => Some(connection),
                _ => None,
            })
            .expect("a should hold a connection to b");

        let b_id = b.local_id().clone();
        b.close();
        assert_eq!(hub.peer_count(), 1);

        let a_events = drain(&mut a);
        assert!(matches!(&a_events[0], TransportEvent::Closed { id } if *id == b_id));

        // In-flight sends to the departed peer fail without panicking.
        let msg = WireMessage::new(a.local_id().clone(), 0);
        assert!(connection.send(&msg).is_err());
    }

    #[test]
    fn test_board_keeps_departed_announcements() {
        let hub = LocalHub::new();
        let a_id = {
            let a = hub.open();
            a.local_id().clone()
        }; // a drops and leaves here

        // The board is append-only; the newcomer just finds nobody home.
        assert_eq!(hub.board().len(), 1);
        assert_eq!(parse_announcement(&hub.board()[0]), Some(a_id));

        let mut b = hub.open();
        let events = drain(&mut b);
        assert_eq!(events.len(), 1, "only Opened, no connection to a ghost");
    }
}
