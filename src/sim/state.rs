//! Ball, obstacle and RNG state for a run

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{BoardGeometry, Rect};
use crate::consts::OBSTACLE_HEIGHT;
use crate::settings::PhysicsSettings;

/// Where a ball is in its drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallPhase {
    /// Moving through the board (or bouncing inside a bin)
    Falling,
    /// At floor height; slot is fixed, deciding whether to bounce or rest
    Settling,
    /// At rest. Terminal.
    Landed,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub phase: BallPhase,
    /// Fixed at first floor contact and never recomputed
    pub landed_slot: Option<usize>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            pos,
            vel,
            phase: BallPhase::Falling,
            landed_slot: None,
        }
    }

    #[inline]
    pub fn landed(&self) -> bool {
        self.phase == BallPhase::Landed
    }

    /// Force the ball to rest, keeping an already fixed slot
    pub fn force_land(&mut self, geometry: &BoardGeometry) -> usize {
        let slot = *self
            .landed_slot
            .get_or_insert_with(|| geometry.slot_for_x(self.pos.x));
        self.phase = BallPhase::Landed;
        self.vel = Vec2::ZERO;
        slot
    }
}

/// Horizontally oscillating rectangle between the pegs and the bins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Horizontal center
    pub x: f32,
    /// Vertical center
    pub y: f32,
    /// +1 moving right, -1 moving left
    pub direction: f32,
}

impl Obstacle {
    /// Centered obstacle, or `None` when the settings disable it
    pub fn spawn(geometry: &BoardGeometry, settings: &PhysicsSettings) -> Option<Self> {
        settings.obstacle_enabled().then(|| Self {
            x: geometry.width / 2.0,
            y: geometry.obstacle_y,
            direction: 1.0,
        })
    }

    pub fn rect(&self, settings: &PhysicsSettings) -> Rect {
        Rect::from_center(
            Vec2::new(self.x, self.y),
            Vec2::new(settings.obstacle_width, OBSTACLE_HEIGHT),
        )
    }

    /// Move one tick, reversing at the canvas edges
    pub fn advance(&mut self, geometry: &BoardGeometry, settings: &PhysicsSettings) {
        let half = settings.obstacle_width / 2.0;
        self.x += settings.obstacle_speed * self.direction;

        if self.x - half <= 0.0 {
            self.x = half;
            self.direction = 1.0;
        } else if self.x + half >= geometry.width {
            self.x = geometry.width - half;
            self.direction = -1.0;
        }
    }
}

/// Uniform draw in `[-half, half)`; finite for any finite `half`
#[inline]
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * half
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Fresh seed from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
