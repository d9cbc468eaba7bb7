//! Player State Definitions
//!
//! Each peer simulates exactly one player: its ship, its bullets and its
//! ship customization. The local copy is self-owned; remote copies live in
//! the session registry and are overwritten wholesale on every inbound
//! player message (last-write-wins, no merge).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::world::World;

// =============================================================================
// PEER ID
// =============================================================================

/// Opaque peer identifier handed out by the transport.
///
/// Implements Ord so registries iterate deterministically and so election
/// ties on the same login millisecond resolve to a single winner.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// SHIP CUSTOMIZATION
// =============================================================================

/// Ship customization error.
#[derive(Debug, Clone, Error)]
pub enum CustomizationError {
    /// Point total does not match the fixed budget.
    #[error("customization points must sum to {expected}, got {got}")]
    BudgetMismatch {
        /// The fixed budget.
        expected: u32,
        /// The rejected total.
        got: u32,
    },
}

/// Ship bonus values chosen by the player.
///
/// Attack shapes bullets (rate, size, speed, range), speed shapes thrust and
/// top speed, control shapes turning and braking. The three values are
/// non-negative and must sum to [`Customization::BUDGET`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    /// Bullet bonus points.
    pub attack: u32,
    /// Thrust bonus points.
    pub speed: u32,
    /// Turning/braking bonus points.
    pub control: u32,
}

impl Customization {
    /// Fixed point budget shared by the three bonuses.
    pub const BUDGET: u32 = 150;

    /// Create a customization, validating the budget.
    pub fn new(attack: u32, speed: u32, control: u32) -> Result<Self, CustomizationError> {
        let got = attack + speed + control;
        if got != Self::BUDGET {
            return Err(CustomizationError::BudgetMismatch {
                expected: Self::BUDGET,
                got,
            });
        }
        Ok(Self {
            attack,
            speed,
            control,
        })
    }

    /// The even 50/50/50 split new players start with.
    pub fn balanced() -> Self {
        Self {
            attack: 50,
            speed: 50,
            control: 50,
        }
    }
}

impl Default for Customization {
    fn default() -> Self {
        Self::balanced()
    }
}

// =============================================================================
// SHIP
// =============================================================================

/// Dynamic ship state.
///
/// Tuning values (thrust force, brake factor, turn rate and so on) are
/// constants in [`crate::game::physics`]; only the state that changes frame
/// to frame lives here and crosses the wire.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Ship {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Heading in radians, measured from the +y axis.
    pub angle: f64,
    /// Scalar speed along the heading.
    pub v: f64,
    /// Velocity x component.
    pub vx: f64,
    /// Velocity y component.
    pub vy: f64,
    /// Angular velocity.
    pub angular_v: f64,
    /// Frames until the next shot is allowed; fires when below zero.
    pub shot_delay: f64,
}

impl Ship {
    /// Ship at the spawn point of the given world.
    pub fn spawn(world: &World) -> Self {
        Self {
            x: world.width,
            y: world.height,
            ..Self::default()
        }
    }
}

// =============================================================================
// BULLET
// =============================================================================

/// A bullet owned by the peer that fired it.
///
/// Never mutated by remote peers; removed locally on life expiry or on a
/// confirmed asteroid collision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x component.
    pub vx: f64,
    /// Velocity y component.
    pub vy: f64,
    /// Collision radius.
    pub r: f64,
    /// Remaining life in frames; expires when below zero.
    pub life: f64,
}

// =============================================================================
// SHIP INPUT
// =============================================================================

/// One frame of control input from the frontend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShipInput {
    /// Thrust forward.
    pub thrust: bool,
    /// Turn left.
    pub left: bool,
    /// Turn right.
    pub right: bool,
    /// Fire.
    pub fire: bool,
}

impl ShipInput {
    /// Input with no keys held.
    pub fn idle() -> Self {
        Self::default()
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Complete state of one player, as broadcast every frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Peer identity granted by the transport.
    pub id: PeerId,
    /// Wall-clock ms at which this peer joined; the election key.
    pub login_date: i64,
    /// Ship pose and motion.
    pub ship: Ship,
    /// In-flight bullets, oldest first.
    pub bullets: Vec<Bullet>,
    /// Ship bonus allocation.
    pub customization: Customization,
    /// Asteroids destroyed by this player.
    pub score: u32,
    /// Whether this peer currently simulates the shared asteroid field.
    /// Derived locally from the membership snapshot, never transmitted.
    #[serde(skip)]
    pub in_charge: bool,
}

impl PlayerState {
    /// New player at the world spawn point.
    ///
    /// `login_date` is unknown until the transport reports the session open;
    /// until then the placeholder sorts after every real login so the peer
    /// never wins an election it should not.
    pub fn new(id: PeerId, world: &World) -> Self {
        Self {
            id,
            login_date: i64::MAX,
            ship: Ship::spawn(world),
            bullets: Vec::new(),
            customization: Customization::balanced(),
            score: 0,
            in_charge: false,
        }
    }

    /// Election key: earliest login wins, peer id breaks ties.
    pub fn election_key(&self) -> (i64, &PeerId) {
        (self.login_date, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_ordering() {
        let a = PeerId::from("aaa");
        let b = PeerId::from("aab");
        let c = PeerId::from("b");

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_customization_budget_enforced() {
        assert!(Customization::new(50, 50, 50).is_ok());
        assert!(Customization::new(150, 0, 0).is_ok());
        assert!(Customization::new(50, 50, 51).is_err());
        assert!(Customization::new(0, 0, 0).is_err());
    }

    #[test]
    fn test_balanced_customization_is_valid() {
        let c = Customization::balanced();
        assert_eq!(c.attack + c.speed + c.control, Customization::BUDGET);
    }

    #[test]
    fn test_new_player_spawns_at_world_corner() {
        let world = World::default();
        let player = PlayerState::new(PeerId::from("p1"), &world);
        assert_eq!(player.ship.x, world.width);
        assert_eq!(player.ship.y, world.height);
        assert!(player.bullets.is_empty());
        assert!(!player.in_charge);
    }

    #[test]
    fn test_placeholder_login_sorts_last() {
        let world = World::default();
        let fresh = PlayerState::new(PeerId::from("z"), &world);
        let mut logged_in = PlayerState::new(PeerId::from("a"), &world);
        logged_in.login_date = 1_700_000_000_000;

        assert!(logged_in.election_key() < fresh.election_key());
    }
}
