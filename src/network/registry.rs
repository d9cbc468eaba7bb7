//! Session Registry
//!
//! Tracks every known remote peer: its transport connection, its login
//! time, the last moment it was heard from and its latest broadcast player
//! state. There is no explicit heartbeat; the per-frame broadcasts double
//! as liveness, so a peer silent past the timeout is presumed gone and
//! evicted.
//!
//! Uses BTreeMap so iteration (and therefore broadcast and election input)
//! is ordered identically on every peer.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::game::player::{PeerId, PlayerState};
use crate::network::protocol::WireMessage;
use crate::network::transport::Connection;

/// Default silence window before a peer is presumed disconnected.
pub const DEFAULT_PEER_TIMEOUT_MS: i64 = 2000;

// =============================================================================
// PEER RECORD
// =============================================================================

/// Everything known about one remote peer.
///
/// `connection` and `player` fill in independently and in either order: the
/// transport handshake may resolve before or after the peer's first player
/// broadcast reaches us through an earlier-established link.
pub struct PeerRecord {
    /// The peer's identity.
    pub id: PeerId,
    /// Direct channel to the peer; `None` until the handshake resolves.
    pub connection: Option<Box<dyn Connection>>,
    /// The peer's login time, learned from its first player broadcast.
    pub login_date: Option<i64>,
    /// Local receive time of the last message from this peer.
    pub last_seen: i64,
    /// Latest broadcast player state, overwritten wholesale per message.
    pub player: Option<PlayerState>,
}

impl PeerRecord {
    /// Election key, available once the peer's login time is known.
    pub fn election_key(&self) -> Option<(i64, &PeerId)> {
        self.login_date.map(|login| (login, &self.id))
    }
}

impl fmt::Debug for PeerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerRecord")
            .field("id", &self.id)
            .field("connected", &self.connection.is_some())
            .field("login_date", &self.login_date)
            .field("last_seen", &self.last_seen)
            .field("player", &self.player.is_some())
            .finish()
    }
}

// =============================================================================
// SESSION REGISTRY
// =============================================================================

/// The live-peer set, excluding the local peer itself.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    peers: BTreeMap<PeerId, PeerRecord>,
}

impl SessionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, id: &PeerId, now: i64) -> &mut PeerRecord {
        self.peers
            .entry(id.clone())
            .or_insert_with(|| PeerRecord {
                id: id.clone(),
                connection: None,
                login_date: None,
                last_seen: now,
                player: None,
            })
    }

    /// Register a resolved connection, creating or refreshing the record.
    /// Idempotent: a reconnect simply replaces the handle.
    pub fn attach(&mut self, id: PeerId, connection: Box<dyn Connection>, now: i64) {
        let record = self.entry(&id, now);
        record.connection = Some(connection);
        record.last_seen = now;
    }

    /// Apply an inbound player broadcast: implicit join for an unknown id,
    /// wholesale overwrite of the stored state, liveness refresh.
    pub fn observe_player(&mut self, player: PlayerState, now: i64) {
        let id = player.id.clone();
        let record = self.entry(&id, now);
        record.login_date = Some(player.login_date);
        record.last_seen = now;
        record.player = Some(player);
    }

    /// Refresh liveness for a peer that sent any message at all. An unknown
    /// id is an implicit join; its login and state arrive with its next
    /// player broadcast.
    pub fn touch(&mut self, id: &PeerId, now: i64) {
        let record = self.entry(id, now);
        record.last_seen = now;
    }

    /// Drop every peer not heard from within the timeout. Returns the
    /// evicted ids so the caller re-runs authority election this frame.
    pub fn evict_stale(&mut self, now: i64, timeout_ms: i64) -> Vec<PeerId> {
        let stale: Vec<PeerId> = self
            .peers
            .values()
            .filter(|r| now - r.last_seen > timeout_ms)
            .map(|r| r.id.clone())
            .collect();
        for id in &stale {
            self.peers.remove(id);
            debug!(peer = %id, "evicted stale peer");
        }
        stale
    }

    /// Remove a peer on an explicit transport close. Returns whether it
    /// was known.
    pub fn remove(&mut self, id: &PeerId) -> bool {
        self.peers.remove(id).is_some()
    }

    /// Number of known remote peers.
    pub fn count(&self) -> usize {
        self.peers.len()
    }

    /// Whether no remote peers are known.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Look up one peer.
    pub fn get(&self, id: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(id)
    }

    /// All records, ordered by peer id.
    pub fn records(&self) -> impl Iterator<Item = &PeerRecord> {
        self.peers.values()
    }

    /// Latest known player states, for the scoreboard and remote-ship
    /// rendering.
    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.peers.values().filter_map(|r| r.player.as_ref())
    }

    /// Election keys of every peer whose login time is known.
    pub fn election_keys(&self) -> impl Iterator<Item = (i64, &PeerId)> {
        self.peers.values().filter_map(|r| r.election_key())
    }

    /// Send a message to every peer with a resolved connection. Failed
    /// sends are logged and skipped; the stale record falls to eviction.
    pub fn broadcast(&self, message: &WireMessage) {
        for record in self.peers.values() {
            let Some(connection) = &record.connection else {
                continue;
            };
            if let Err(error) = connection.send(message) {
                debug!(peer = %record.id, %error, "broadcast send failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::World;

    fn player(id: &str, login: i64) -> PlayerState {
        let mut p = PlayerState::new(PeerId::from(id), &World::default());
        p.login_date = login;
        p
    }

    #[test]
    fn test_observe_player_is_implicit_join() {
        let mut registry = SessionRegistry::new();
        registry.observe_player(player("a", 100), 1000);

        let record = registry.get(&PeerId::from("a")).unwrap();
        assert_eq!(record.login_date, Some(100));
        assert_eq!(record.last_seen, 1000);
        assert!(record.connection.is_none());
    }

    #[test]
    fn test_touch_creates_bare_record() {
        let mut registry = SessionRegistry::new();
        registry.touch(&PeerId::from("b"), 500);

        let record = registry.get(&PeerId::from("b")).unwrap();
        assert_eq!(record.last_seen, 500);
        assert!(record.login_date.is_none());
        // No login yet, so not part of the election set.
        assert_eq!(registry.election_keys().count(), 0);
    }

    #[test]
    fn test_observe_is_idempotent_with_monotonic_liveness() {
        let mut registry = SessionRegistry::new();
        let p = player("c", 100);

        registry.observe_player(p.clone(), 1000);
        let first = registry.get(&PeerId::from("c")).unwrap().player.clone();

        registry.observe_player(p.clone(), 1100);
        let record = registry.get(&PeerId::from("c")).unwrap();

        assert_eq!(record.player, first);
        assert_eq!(record.last_seen, 1100);
    }

    #[test]
    fn test_eviction_boundary() {
        let mut registry = SessionRegistry::new();
        registry.observe_player(player("fresh", 1), 10_000 - 1999);
        registry.observe_player(player("stale", 2), 10_000 - 2001);

        let evicted = registry.evict_stale(10_000, DEFAULT_PEER_TIMEOUT_MS);

        assert_eq!(evicted, vec![PeerId::from("stale")]);
        assert!(registry.get(&PeerId::from("fresh")).is_some());
        assert!(registry.get(&PeerId::from("stale")).is_none());
    }

    #[test]
    fn test_eviction_exact_timeout_survives() {
        let mut registry = SessionRegistry::new();
        registry.observe_player(player("edge", 1), 8000);

        // Exactly the timeout is not "more than" the timeout.
        let evicted = registry.evict_stale(10_000, 2000);
        assert!(evicted.is_empty());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_remove_on_close() {
        let mut registry = SessionRegistry::new();
        registry.observe_player(player("d", 100), 0);

        assert!(registry.remove(&PeerId::from("d")));
        assert!(!registry.remove(&PeerId::from("d")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_records_iterate_in_id_order() {
        let mut registry = SessionRegistry::new();
        for id in ["zulu", "alfa", "mike"] {
            registry.observe_player(player(id, 0), 0);
        }

        let ids: Vec<&str> = registry.records().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["alfa", "mike", "zulu"]);
    }
}
