//! # Astro Mesh
//!
//! Peer-to-peer session and authority coordination for a multiplayer
//! asteroids-style arcade game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ASTRO MESH                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/             - Local simulation                        │
//! │  ├── world.rs      - Toroidal playfield                      │
//! │  ├── player.rs     - Ship, bullets, customization            │
//! │  ├── physics.rs    - Per-frame ship/bullet integration       │
//! │  ├── asteroid.rs   - Shared field (canonical or mirrored)    │
//! │  └── collision.rs  - Bullet-vs-asteroid sweep                │
//! │                                                              │
//! │  network/          - Coordination core                       │
//! │  ├── transport.rs  - Generic peer transport + in-memory mesh │
//! │  ├── protocol.rs   - Wire messages                           │
//! │  ├── registry.rs   - Known peers, staleness eviction         │
//! │  ├── election.rs   - Per-frame authority election            │
//! │  └── session.rs    - The frame loop glue                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coordination Model
//!
//! Every peer simulates its own ship and bullets and broadcasts them each
//! frame; those broadcasts double as heartbeats. The shared asteroid field
//! is simulated by exactly one peer, the **authority**, recomputed every
//! frame from data each peer already holds: earliest login wins, peer id
//! breaks ties. No election messages are exchanged; membership changes
//! (joins, explicit leaves, 2-second silences) converge within a frame.
//! Conflicts resolve by last-write-wins throughout: remote player state and
//! the asteroid mirror are overwritten wholesale on receipt.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::asteroid::{Asteroid, AsteroidField};
pub use game::player::{Bullet, Customization, PeerId, PlayerState, Ship, ShipInput};
pub use game::world::World;
pub use network::protocol::WireMessage;
pub use network::session::{PeerSession, SessionConfig};
pub use network::transport::{LocalHub, PeerTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal display frame interval the demo loop runs at (ms).
pub const FRAME_INTERVAL_MS: i64 = 16;
