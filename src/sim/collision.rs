//! Collision detection and response
//!
//! Resolvers take the ball mutably and everything else read-only. None of them
//! touch presentation state: peg hits are returned to the caller instead.

use glam::Vec2;
use rand::Rng;

use super::geometry::{BoardGeometry, Rect};
use super::state::{Ball, Obstacle, symmetric};
use crate::consts::{DIVIDER_NUDGE, DIVIDER_TOP_DAMPING, OBSTACLE_NUDGE};
use crate::settings::PhysicsSettings;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the surface
    pub point: Vec2,
    /// Surface normal at contact (pointing toward the ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// A peg struck during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PegHit {
    /// Index into `BoardGeometry::pegs`
    pub peg: usize,
    /// Ball speed just before the hit
    pub impact_speed: f32,
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check collision between a ball and a circle
pub fn ball_circle_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    center: Vec2,
    radius: f32,
) -> CollisionResult {
    let delta = ball_pos - center;
    let dist = delta.length();
    let reach = ball_radius + radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    // Coincident centers: push straight up
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::NEG_Y };
    CollisionResult {
        hit: true,
        point: center + normal * radius,
        normal,
        penetration: reach - dist,
    }
}

/// Check collision between a ball and an axis-aligned rectangle
///
/// The normal is axis-aligned: the ball is pushed out along whichever axis
/// needs the smaller correction.
pub fn ball_rect_collision(ball_pos: Vec2, ball_radius: f32, rect: &Rect) -> CollisionResult {
    let closest = rect.closest_point(ball_pos);
    if (ball_pos - closest).length_squared() >= ball_radius * ball_radius {
        return CollisionResult::miss();
    }

    // Push needed to clear the left/right and top/bottom faces
    let push_left = ball_pos.x + ball_radius - rect.min.x;
    let push_right = rect.max.x - ball_pos.x + ball_radius;
    let push_up = ball_pos.y + ball_radius - rect.min.y;
    let push_down = rect.max.y - ball_pos.y + ball_radius;

    let (px, nx) = if push_left < push_right {
        (push_left, -1.0)
    } else {
        (push_right, 1.0)
    };
    let (py, ny) = if push_up < push_down {
        (push_up, -1.0)
    } else {
        (push_down, 1.0)
    };

    if px < py {
        CollisionResult {
            hit: true,
            point: closest,
            normal: Vec2::new(nx, 0.0),
            penetration: px,
        }
    } else {
        CollisionResult {
            hit: true,
            point: closest,
            normal: Vec2::new(0.0, ny),
            penetration: py,
        }
    }
}

/// Bounce off the left and right canvas edges
pub fn resolve_walls(
    ball: &mut Ball,
    geometry: &BoardGeometry,
    settings: &PhysicsSettings,
) -> bool {
    let r = settings.ball_radius;

    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x = ball.vel.x.abs() * settings.bounce;
        true
    } else if ball.pos.x + r > geometry.width {
        ball.pos.x = geometry.width - r;
        ball.vel.x = -ball.vel.x.abs() * settings.bounce;
        true
    } else {
        false
    }
}

/// Resolve every overlapping peg near the ball, in lattice order
///
/// Overlaps are handled one after another rather than jointly. Each hit
/// reflects the velocity (if the ball is moving into the peg), scales it by
/// restitution, pushes the ball clear and adds a random lateral kick.
pub fn resolve_pegs<R: Rng + ?Sized>(
    ball: &mut Ball,
    geometry: &BoardGeometry,
    settings: &PhysicsSettings,
    rng: &mut R,
    hits: &mut Vec<PegHit>,
) {
    let reach = settings.ball_radius + settings.peg_radius;
    let rows = geometry.rows_near(ball.pos.y, reach);

    for (index, peg) in geometry.pegs_in_rows(rows) {
        let result =
            ball_circle_collision(ball.pos, settings.ball_radius, peg.pos, settings.peg_radius);
        if !result.hit {
            continue;
        }

        let impact_speed = ball.vel.length();
        if ball.vel.dot(result.normal) < 0.0 {
            ball.vel = reflect_velocity(ball.vel, result.normal) * settings.bounce;
        }
        ball.pos += result.normal * result.penetration;

        if settings.peg_randomness > 0.0 {
            ball.vel.x += symmetric(rng, settings.peg_randomness / 2.0);
        }

        hits.push(PegHit {
            peg: index,
            impact_speed,
        });
    }
}

/// Bounce off the slot dividers once the ball is down in the bin row
pub fn resolve_dividers(
    ball: &mut Ball,
    geometry: &BoardGeometry,
    settings: &PhysicsSettings,
) -> bool {
    let r = settings.ball_radius;
    if ball.pos.y + r < geometry.divider_top - r {
        return false;
    }

    let mut any = false;
    for divider in &geometry.dividers {
        let result = ball_rect_collision(ball.pos, r, divider);
        if !result.hit {
            continue;
        }
        any = true;
        ball.pos += result.normal * result.penetration;
        let speed_before = ball.vel.length();

        if result.normal.x != 0.0 {
            if ball.vel.x * result.normal.x < 0.0 {
                ball.vel.x = -ball.vel.x * settings.bounce;
            }
        } else {
            if ball.vel.y * result.normal.y < 0.0 {
                ball.vel.y = -ball.vel.y * settings.bounce * DIVIDER_TOP_DAMPING;
            }
            // Don't let a ball balance on a divider. The push only redirects
            // speed the top contact took away, never more.
            if result.normal.y < 0.0 && ball.vel.x.abs() < DIVIDER_NUDGE {
                let room = (speed_before * speed_before - ball.vel.y * ball.vel.y)
                    .max(0.0)
                    .sqrt();
                let push = DIVIDER_NUDGE.min(room).max(ball.vel.x.abs());
                let side = if ball.pos.x < divider.center().x { -1.0 } else { 1.0 };
                ball.vel.x = side * push;
            }
        }
    }
    any
}

/// Bounce off the moving obstacle; disabled entirely when its width is 0
pub fn resolve_obstacle(ball: &mut Ball, obstacle: &Obstacle, settings: &PhysicsSettings) -> bool {
    if !settings.obstacle_enabled() {
        return false;
    }

    let result = ball_rect_collision(ball.pos, settings.ball_radius, &obstacle.rect(settings));
    if !result.hit {
        return false;
    }

    ball.pos += result.normal * result.penetration;
    if result.normal.x != 0.0 {
        if ball.vel.x * result.normal.x < 0.0 {
            ball.vel.x = -ball.vel.x * settings.bounce;
        }
    } else if ball.vel.y * result.normal.y < 0.0 {
        ball.vel.y = -ball.vel.y * settings.bounce;
    }

    // Carry the ball along so it can't ride on top forever
    ball.vel.x += obstacle.direction * settings.obstacle_speed * OBSTACLE_NUDGE;
    true
}
