//! Ship And Bullet Physics
//!
//! Per-frame integration of the local ship and its bullets. Runs on every
//! peer for its own player only; remote ships are never simulated, their
//! latest broadcast pose is rendered as-is.
//!
//! Customization points scale the base tuning: attack shapes bullets, speed
//! shapes thrust and top speed, control shapes turning and braking.

use crate::game::player::{Bullet, PlayerState, ShipInput};
use crate::game::world::World;

// =============================================================================
// SHIP TUNING
// =============================================================================

/// Ship hull width, used by the rendering frontend.
pub const SHIP_WIDTH: f64 = 1.2;
/// Ship hull height; bullets spawn half a hull ahead of center.
pub const SHIP_HEIGHT: f64 = 1.5;
/// Base frames between shots before the attack bonus shortens it.
pub const SHOT_MAX_DELAY: f64 = 65.0;
/// Base top speed before the speed bonus raises it.
pub const BASE_MAX_SPEED: f64 = 0.01;
/// Base thrust added to scalar speed per frame.
pub const MOTOR: f64 = 0.0005;
/// Coasting speed multiplier before the control bonus strengthens it.
pub const BRAKE: f64 = 0.996;
/// Base turn rate before the control bonus raises it.
pub const BASE_TURN_RATE: f64 = 0.02;
/// Angular velocity multiplier when no turn key is held.
pub const SPIN_DAMPING: f64 = 0.8;

// =============================================================================
// BULLET TUNING
// =============================================================================

/// Base bullet radius before the attack bonus grows it.
pub const BULLET_BASE_RADIUS: f64 = 0.1;
/// Base bullet life in frames before the attack bonus trades range for speed.
pub const BULLET_BASE_LIFE: f64 = 75.0;
/// Fraction of the nose offset converted into muzzle velocity.
pub const BULLET_SPEED_FACTOR: f64 = 0.14;

/// Run one physics frame for the local player: thrust, turning, firing and
/// bullet flight, in that order.
pub fn step_player(player: &mut PlayerState, input: &ShipInput, world: &World) {
    move_ship(player, input, world);
    turn_ship(player, input);
    fire(player, input);
    step_bullets(player, world);
}

/// Thrust and drift. Scalar speed is integrated along the heading, then
/// decomposed into axis velocities; the heading angle is measured from the
/// +y axis, so x takes the sine.
fn move_ship(player: &mut PlayerState, input: &ShipInput, world: &World) {
    let speed_bonus = f64::from(player.customization.speed);
    let control_bonus = f64::from(player.customization.control);
    let s = &mut player.ship;

    if input.thrust {
        s.v += MOTOR + speed_bonus * 0.000_05;

        let max_speed = BASE_MAX_SPEED + speed_bonus * 0.001;
        if s.v > max_speed {
            s.v = max_speed;
        }
    } else {
        s.v *= BRAKE - control_bonus * 0.000_5;
    }

    s.vx = s.v * s.angle.sin();
    s.vy = s.v * s.angle.cos();
    s.x += s.vx;
    s.y += s.vy;

    world.wrap(&mut s.x, &mut s.y);
}

/// Turning. Holding a key pins the angular velocity at the turn rate;
/// releasing both lets the spin damp out.
fn turn_ship(player: &mut PlayerState, input: &ShipInput) {
    let control_bonus = f64::from(player.customization.control);
    let s = &mut player.ship;

    let turn_rate = BASE_TURN_RATE + control_bonus * 0.000_8;

    if input.right {
        s.angular_v = turn_rate;
    } else if input.left {
        s.angular_v = -turn_rate;
    } else {
        s.angular_v *= SPIN_DAMPING;
    }

    s.angle += s.angular_v;
}

/// Firing. The delay counter runs down every frame; a shot is allowed once
/// it drops below zero and resets it. More attack means faster, bigger,
/// quicker-firing but shorter-lived bullets.
fn fire(player: &mut PlayerState, input: &ShipInput) {
    let attack = f64::from(player.customization.attack);
    let s = &mut player.ship;

    s.shot_delay -= 1.0;

    if !input.fire || s.shot_delay >= 0.0 {
        return;
    }

    s.shot_delay = SHOT_MAX_DELAY - attack * 0.6;

    let speed_bonus = 1.0 + attack * 0.01;

    // Muzzle sits ahead of the nose, further out for bigger bullets.
    let offset_len = SHIP_HEIGHT / 2.0 + attack / 100.0;
    let offset_x = offset_len * s.angle.sin();
    let offset_y = offset_len * s.angle.cos();

    player.bullets.push(Bullet {
        x: s.x + offset_x,
        y: s.y + offset_y,
        r: BULLET_BASE_RADIUS + attack * 0.005,
        // Ship velocity is inherited so bullets keep the shooter's inertia.
        vx: (offset_x * BULLET_SPEED_FACTOR + s.vx) * speed_bonus,
        vy: (offset_y * BULLET_SPEED_FACTOR + s.vy) * speed_bonus,
        life: BULLET_BASE_LIFE - attack * 0.5,
    });
}

/// Bullet flight: integrate, wrap, age, expire.
fn step_bullets(player: &mut PlayerState, world: &World) {
    for b in &mut player.bullets {
        b.x += b.vx;
        b.y += b.vy;
        world.wrap(&mut b.x, &mut b.y);
        b.life -= 1.0;
    }
    player.bullets.retain(|b| b.life >= 0.0);
}
