//! Authority Election
//!
//! Exactly one peer per session simulates the shared asteroid field. The
//! winner is chosen deterministically from data every peer already holds:
//! the earliest login wins, and the lexically smallest peer id breaks a
//! same-millisecond tie. No votes are exchanged; under stable membership
//! every peer reaches the same answer independently.
//!
//! The local peer is always part of the comparison set. With no remote
//! peers known (or no transport at all) it is trivially the authority.
//!
//! Election runs as a full scan every frame after stale-peer eviction and
//! again on every join or leave. Peers may briefly disagree while a
//! membership change propagates; that window is sub-frame in practice and
//! self-heals, so it is never treated as an error.

use crate::game::player::{PeerId, PlayerState};
use crate::network::registry::SessionRegistry;

/// The peer in charge of the asteroid field: smallest `(login_date, id)`
/// among the local player and every registry peer with a known login.
pub fn authority_id<'a>(local: &'a PlayerState, registry: &'a SessionRegistry) -> &'a PeerId {
    let mut winner = local.election_key();
    for key in registry.election_keys() {
        if key < winner {
            winner = key;
        }
    }
    winner.1
}

/// Whether the local peer should simulate the asteroid field this frame.
pub fn self_is_authority(local: &PlayerState, registry: &SessionRegistry) -> bool {
    authority_id(local, registry) == &local.id
}
