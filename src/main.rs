//! Astro Mesh Demo
//!
//! Drives a three-peer in-memory mesh through a scripted match: peers join
//! at staggered times, shoot at the shared asteroid field, one leaves
//! explicitly and one goes silent, exercising both authority handoff paths.

use anyhow::Result;
use chrono::Utc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use astro_mesh::{
    FRAME_INTERVAL_MS, LocalHub, PeerSession, SessionConfig, ShipInput, VERSION,
};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Astro Mesh v{}", VERSION);

    demo_match();
    Ok(())
}

/// Scripted inputs: every peer flies its own pattern.
fn scripted_input(peer_index: usize, frame: u64) -> ShipInput {
    match peer_index {
        // Circles and fires.
        0 => ShipInput {
            thrust: true,
            right: frame % 40 < 20,
            left: false,
            fire: true,
        },
        // Weaves and fires in bursts.
        1 => ShipInput {
            thrust: frame % 8 < 4,
            right: frame % 90 < 45,
            left: frame % 90 >= 45,
            fire: frame % 120 < 60,
        },
        // Drifts quietly.
        _ => ShipInput::idle(),
    }
}

fn demo_match() {
    info!("=== Starting Demo Match ===");

    let hub = LocalHub::new();
    let start = Utc::now().timestamp_millis();
    let mut now = start;

    let config = |seed: u64| SessionConfig {
        rng_seed: Some(seed),
        ..SessionConfig::default()
    };

    // Peers join at staggered times; the first to log in takes charge of
    // the asteroid field.
    let mut sessions = vec![PeerSession::new(hub.open(), config(1))];
    let mut running = vec![true];

    for frame in 0u64..900 {
        now += FRAME_INTERVAL_MS;

        match frame {
            10 => {
                sessions.push(PeerSession::new(hub.open(), config(2)));
                running.push(true);
                info!("second peer joined");
            }
            20 => {
                sessions.push(PeerSession::new(hub.open(), config(3)));
                running.push(true);
                info!("third peer joined");
            }
            // The founding peer leaves outright: its endpoint closes and
            // authority hands over immediately.
            300 => {
                sessions.remove(0);
                running.remove(0);
                info!("first peer left, expecting immediate handoff");
            }
            // The next authority merely goes silent: the survivor only
            // notices through the 2-second timeout.
            450 => {
                running[0] = false;
                info!("second peer went silent, expecting timeout eviction");
            }
            _ => {}
        }

        for (index, session) in sessions.iter_mut().enumerate() {
            if running[index] {
                session.frame(now, &scripted_input(index, frame));
            }
        }

        if frame % 150 == 0 {
            for session in sessions.iter().filter(|s| s.is_ready()) {
                info!(
                    peer = %session.local_id(),
                    authority = session.is_authority(),
                    asteroids = session.asteroids().len(),
                    score = session.player().score,
                    peers = session.peers().count(),
                    "frame {}", frame
                );
            }
        }
    }

    info!("=== Match Results ===");
    for (index, session) in sessions.iter().enumerate() {
        info!(
            peer = %session.local_id(),
            running = running[index],
            authority = session.is_authority(),
            score = session.player().score,
            bullets = session.player().bullets.len(),
            asteroids = session.asteroids().len(),
            "final state"
        );
    }
}
