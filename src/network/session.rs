//! Peer Session
//!
//! The driving glue that ties the coordination core together. One
//! `PeerSession` per process owns the local player, the asteroid field
//! (canonical when this peer holds authority, a mirror otherwise), the
//! registry of remote peers and the transport endpoint, and advances all of
//! them one animation frame at a time:
//!
//! drain transport events → evict stale peers → elect authority → local
//! ship/bullet physics → collision pass → asteroid step (authority only) →
//! broadcast.
//!
//! Everything runs on one logical thread; inbound messages queue on the
//! transport and are applied between frames, so no locking is needed and
//! last-write-wins is the only consistency rule.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::game::asteroid::AsteroidField;
use crate::game::collision::sweep_bullet_hits;
use crate::game::physics;
use crate::game::player::{Customization, PeerId, PlayerState, ShipInput};
use crate::game::world::World;
use crate::network::election;
use crate::network::protocol::{HitNotice, WireMessage};
use crate::network::registry::{SessionRegistry, DEFAULT_PEER_TIMEOUT_MS};
use crate::network::transport::{PeerTransport, TransportEvent};

// =============================================================================
// CONFIG
// =============================================================================

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Silence window before a remote peer is evicted.
    pub peer_timeout_ms: i64,
    /// Playfield geometry.
    pub world: World,
    /// Seed for asteroid spawn randomness; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            peer_timeout_ms: DEFAULT_PEER_TIMEOUT_MS,
            world: World::default(),
            rng_seed: None,
        }
    }
}

// =============================================================================
// PEER SESSION
// =============================================================================

/// One peer's view of the shared game, driven once per display frame.
pub struct PeerSession<T: PeerTransport> {
    transport: T,
    config: SessionConfig,
    player: PlayerState,
    registry: SessionRegistry,
    asteroids: AsteroidField,
    rng: SmallRng,
    ready: bool,
}

impl<T: PeerTransport> PeerSession<T> {
    /// Create a session on an opened transport endpoint.
    ///
    /// The player identity comes from the transport; the login date is
    /// stamped when the transport reports the session open.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let player = PlayerState::new(transport.local_id().clone(), &config.world);
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            transport,
            config,
            player,
            registry: SessionRegistry::new(),
            asteroids: AsteroidField::new(),
            rng,
            ready: false,
        }
    }

    /// Advance one frame at wall-clock `now_ms` with this frame's input.
    pub fn frame(&mut self, now_ms: i64, input: &ShipInput) {
        self.drain_events(now_ms);

        let evicted = self.registry.evict_stale(now_ms, self.config.peer_timeout_ms);
        for id in &evicted {
            info!(peer = %id, "peer timed out");
        }

        // Cheap full scan; rerun unconditionally so eviction, joins and
        // leaves all take effect within the frame they happen.
        self.update_authority();

        physics::step_player(&mut self.player, input, &self.config.world);

        self.collision_pass(now_ms);

        if self.player.in_charge {
            self.asteroids.refill_if_empty(&self.config.world, &mut self.rng);
            self.asteroids.step(&self.config.world);
        }

        self.broadcast_frame(now_ms);
    }

    // -------------------------------------------------------------------------
    // Inbound
    // -------------------------------------------------------------------------

    /// Apply every queued transport event. Handlers must tolerate any
    /// interleaving: handshakes resolve out of order relative to join
    /// announcements, and data can arrive from a peer the transport has
    /// not formally introduced yet.
    fn drain_events(&mut self, now: i64) {
        while let Some(event) = self.transport.poll_event() {
            match event {
                TransportEvent::Opened { id } => {
                    self.player.login_date = now;
                    self.ready = true;
                    info!(peer = %id, login = now, "session open");
                    self.update_authority();
                }
                TransportEvent::Connected { id, connection } => {
                    debug!(peer = %id, "peer connected");
                    self.registry.attach(id, connection, now);
                    self.update_authority();
                }
                TransportEvent::Data { from: _, message } => {
                    self.apply_message(message, now);
                }
                TransportEvent::Closed { id } => {
                    info!(peer = %id, "peer left");
                    self.registry.remove(&id);
                    self.update_authority();
                }
                TransportEvent::Errored { id, error } => {
                    warn!(peer = ?id, %error, "transport error");
                }
            }
        }
    }

    /// Dispatch one inbound message by payload kind. Any message refreshes
    /// the sender's liveness; each payload section is independent and
    /// optional.
    fn apply_message(&mut self, message: WireMessage, now: i64) {
        let sender = message.id;

        self.registry.touch(&sender, now);

        if let Some(player) = message.data.player {
            self.registry.observe_player(player, now);
            self.update_authority();
        }

        if let Some(list) = message.data.asteroids {
            if !self.player.in_charge {
                self.asteroids.replace(list);
            }
        }

        if let Some(hit) = message.data.hit {
            if self.player.in_charge {
                if self
                    .asteroids
                    .resolve_hit(hit.index, &self.config.world, &mut self.rng)
                {
                    debug!(peer = %sender, index = hit.index, "applied remote hit");
                } else {
                    debug!(peer = %sender, index = hit.index, "stale hit notice ignored");
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Election
    // -------------------------------------------------------------------------

    fn update_authority(&mut self) {
        let in_charge = election::self_is_authority(&self.player, &self.registry);
        if in_charge != self.player.in_charge {
            if in_charge {
                info!(peer = %self.player.id, "taking charge of the asteroid field");
            } else {
                info!(
                    peer = %self.player.id,
                    authority = %election::authority_id(&self.player, &self.registry),
                    "yielding the asteroid field"
                );
            }
        }
        self.player.in_charge = in_charge;
    }

    // -------------------------------------------------------------------------
    // Collisions
    // -------------------------------------------------------------------------

    /// Sweep own bullets against the current asteroid view. Bullets are
    /// spent locally no matter who owns the field; the asteroid side effects
    /// are applied canonically when in charge and forwarded as hit notices
    /// otherwise.
    fn collision_pass(&mut self, now: i64) {
        let hits = sweep_bullet_hits(&self.player.bullets, &self.asteroids.list);
        if hits.is_empty() {
            return;
        }

        if self.player.in_charge {
            // Descending index order keeps earlier indices valid across
            // removals; split fragments append at the tail.
            let mut indices: Vec<usize> = hits.iter().map(|h| h.asteroid).collect();
            indices.sort_unstable_by(|a, b| b.cmp(a));
            for index in indices {
                if self
                    .asteroids
                    .resolve_hit(index, &self.config.world, &mut self.rng)
                {
                    self.player.score += 1;
                }
            }
        } else {
            for hit in &hits {
                let notice = HitNotice {
                    index: hit.asteroid,
                    asteroid: self.asteroids.list[hit.asteroid],
                };
                debug!(index = hit.asteroid, "forwarding hit to authority");
                let message =
                    WireMessage::new(self.player.id.clone(), now).with_hit(notice);
                self.registry.broadcast(&message);
                self.player.score += 1;
                // The mirror keeps the asteroid until the authority's next
                // broadcast confirms the removal.
            }
        }

        // Sweep emits bullets in ascending order; remove back to front.
        for hit in hits.iter().rev() {
            self.player.bullets.remove(hit.bullet);
        }
    }

    // -------------------------------------------------------------------------
    // Outbound
    // -------------------------------------------------------------------------

    /// Broadcast this frame's state: own player always, the canonical
    /// asteroid list only when in charge.
    fn broadcast_frame(&mut self, now: i64) {
        let mut message =
            WireMessage::new(self.player.id.clone(), now).with_player(self.player.clone());
        if self.player.in_charge {
            message = message.with_asteroids(self.asteroids.list.clone());
        }
        self.registry.broadcast(&message);
    }

    // -------------------------------------------------------------------------
    // Frontend surface
    // -------------------------------------------------------------------------

    /// The local peer id.
    pub fn local_id(&self) -> &PeerId {
        &self.player.id
    }

    /// The local player, for physics display and the scoreboard.
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Whether this peer currently simulates the asteroid field.
    pub fn is_authority(&self) -> bool {
        self.player.in_charge
    }

    /// The asteroid view to draw: canonical when in charge, mirrored
    /// otherwise.
    pub fn asteroids(&self) -> &[crate::game::asteroid::Asteroid] {
        &self.asteroids.list
    }

    /// Read-only registry snapshot for rendering remote ships.
    pub fn peers(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Whether the transport has granted an identity and login time yet.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Replace the ship customization from the frontend's edit screen.
    pub fn set_customization(&mut self, customization: Customization) {
        self.player.customization = customization;
    }
}
