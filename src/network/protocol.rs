//! Protocol Messages
//!
//! Wire format for peer-to-peer state dissemination. Messages are JSON for
//! debugging ease, with an optional binary (bincode) encoding; the payload
//! is a flat struct of optional fields, so both encodings handle it.
//!
//! There is no versioning, checksum or compression. An absent field means
//! "no update in this message", and unknown fields are ignored, so decoding
//! is defensive by construction: a malformed message degrades to an empty
//! update instead of an error mid-frame.

use serde::{Deserialize, Serialize};

use crate::game::asteroid::Asteroid;
use crate::game::player::{PeerId, PlayerState};

// =============================================================================
// PAYLOAD KINDS
// =============================================================================

/// A bullet-asteroid collision observed by a non-authority peer, forwarded
/// so the authority can apply the removal and split canonically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitNotice {
    /// Index into the asteroid list snapshot the sender held.
    pub index: usize,
    /// The asteroid as the sender saw it, for logging and diagnostics when
    /// the index has gone stale.
    pub asteroid: Asteroid,
}

/// Optional payload sections; any combination may ride one message.
///
/// Fields stay plain options (no serialize-skipping) so the binary encoding,
/// which is not self-describing, round-trips sparse payloads too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirePayload {
    /// The sender's full player state.
    #[serde(default)]
    pub player: Option<PlayerState>,

    /// The canonical asteroid list; only the authority sends this.
    #[serde(default)]
    pub asteroids: Option<Vec<Asteroid>>,

    /// A hit observed by a non-authority peer.
    #[serde(default)]
    pub hit: Option<HitNotice>,
}

impl WirePayload {
    /// Whether the payload carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.player.is_none() && self.asteroids.is_none() && self.hit.is_none()
    }
}

// =============================================================================
// WIRE MESSAGE
// =============================================================================

/// One peer-to-peer message: payload, send timestamp and sender id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Payload sections.
    #[serde(default)]
    pub data: WirePayload,

    /// Sender wall-clock ms at send time.
    #[serde(default)]
    pub date: i64,

    /// Sender peer id.
    pub id: PeerId,
}

impl WireMessage {
    /// Empty message stamped with sender and time.
    pub fn new(id: PeerId, date: i64) -> Self {
        Self {
            data: WirePayload::default(),
            date,
            id,
        }
    }

    /// Attach the sender's player state.
    pub fn with_player(mut self, player: PlayerState) -> Self {
        self.data.player = Some(player);
        self
    }

    /// Attach the canonical asteroid list.
    pub fn with_asteroids(mut self, asteroids: Vec<Asteroid>) -> Self {
        self.data.asteroids = Some(asteroids);
        self
    }

    /// Attach a hit notice.
    pub fn with_hit(mut self, hit: HitNotice) -> Self {
        self.data.hit = Some(hit);
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}
