//! Collision Detection
//!
//! Circle-vs-circle checks between the local player's bullets and the
//! current asteroid view. Every peer runs the same pass against whatever
//! asteroid list it holds (canonical on the authority, mirrored elsewhere)
//! and resolves or forwards the hits per the authority rule in the session.

use crate::game::asteroid::Asteroid;
use crate::game::player::Bullet;

/// Check if two circles overlap: Euclidean center distance strictly below
/// the sum of radii. Compared squared to skip the square root.
#[inline]
pub fn circles_overlap(ax: f64, ay: f64, ar: f64, bx: f64, by: f64, br: f64) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    let combined = ar + br;
    dx * dx + dy * dy < combined * combined
}

/// A confirmed bullet-asteroid overlap, by index into each list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BulletHit {
    /// Index into the player's bullet list.
    pub bullet: usize,
    /// Index into the asteroid list at the time of the sweep.
    pub asteroid: usize,
}

/// Sweep all bullets against all asteroids.
///
/// Each bullet and each asteroid appears in at most one hit: a bullet is
/// spent on the first asteroid it overlaps, and an already-claimed asteroid
/// is skipped so two bullets arriving the same frame destroy two asteroids
/// rather than double-counting one.
pub fn sweep_bullet_hits(bullets: &[Bullet], asteroids: &[Asteroid]) -> Vec<BulletHit> {
    let mut hits = Vec::new();
    let mut claimed = vec![false; asteroids.len()];

    for (bi, b) in bullets.iter().enumerate() {
        for (ai, a) in asteroids.iter().enumerate() {
            if claimed[ai] {
                continue;
            }
            if circles_overlap(a.x, a.y, a.r, b.x, b.y, b.r) {
                claimed[ai] = true;
                hits.push(BulletHit {
                    bullet: bi,
                    asteroid: ai,
                });
                break;
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asteroid(x: f64, y: f64, r: f64) -> Asteroid {
        Asteroid {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            r,
        }
    }

    fn bullet(x: f64, y: f64, r: f64) -> Bullet {
        Bullet {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            r,
            life: 10.0,
        }
    }

    #[test]
    fn test_overlap_inside_combined_radius() {
        // d = 0.5, combined radius 1.6
        assert!(circles_overlap(0.0, 0.0, 1.0, 0.5, 0.0, 0.6));
    }

    #[test]
    fn test_no_overlap_outside_combined_radius() {
        // d = 3, combined radius 1.5
        assert!(!circles_overlap(0.0, 0.0, 1.0, 3.0, 0.0, 0.5));
    }

    #[test]
    fn test_touching_circles_do_not_collide() {
        // d exactly equals the combined radius; strict inequality.
        assert!(!circles_overlap(0.0, 0.0, 1.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn test_sweep_pairs_each_bullet_once() {
        let asteroids = vec![asteroid(0.0, 0.0, 1.0), asteroid(0.5, 0.0, 1.0)];
        let bullets = vec![bullet(0.2, 0.0, 0.1)];

        // One bullet overlapping both asteroids claims only the first.
        let hits = sweep_bullet_hits(&bullets, &asteroids);
        assert_eq!(
            hits,
            vec![BulletHit {
                bullet: 0,
                asteroid: 0
            }]
        );
    }

    #[test]
    fn test_sweep_two_bullets_two_asteroids() {
        let asteroids = vec![asteroid(0.0, 0.0, 1.0), asteroid(10.0, 10.0, 1.0)];
        let bullets = vec![bullet(0.1, 0.0, 0.1), bullet(10.1, 10.0, 0.1)];

        let hits = sweep_bullet_hits(&bullets, &asteroids);
        assert_eq!(hits.len(), 2);
        assert_eq!(
            hits[0],
            BulletHit {
                bullet: 0,
                asteroid: 0
            }
        );
        assert_eq!(
            hits[1],
            BulletHit {
                bullet: 1,
                asteroid: 1
            }
        );
    }

    #[test]
    fn test_sweep_shared_asteroid_single_claim() {
        let asteroids = vec![asteroid(0.0, 0.0, 1.0)];
        let bullets = vec![bullet(0.1, 0.0, 0.1), bullet(-0.1, 0.0, 0.1)];

        // Second bullet finds the asteroid already claimed.
        let hits = sweep_bullet_hits(&bullets, &asteroids);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bullet, 0);
    }

    #[test]
    fn test_sweep_empty_lists() {
        assert!(sweep_bullet_hits(&[], &[]).is_empty());
        assert!(sweep_bullet_hits(&[bullet(0.0, 0.0, 0.1)], &[]).is_empty());
    }
}
