//! Physics settings
//!
//! A `Copy` snapshot read by every tick. Runs capture their own copy at start,
//! so edits never reach a drop that is already falling.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DrawError;

/// Largest ball radius accepted by `sanitized`
pub const MAX_BALL_RADIUS: f32 = 20.0;
/// Largest peg radius accepted by `sanitized`
pub const MAX_PEG_RADIUS: f32 = 15.0;
pub const MAX_GRAVITY: f32 = 1.0;
pub const MAX_PEG_RANDOMNESS: f32 = 10.0;
pub const MAX_INITIAL_VELOCITY: f32 = 10.0;
pub const MAX_OBSTACLE_WIDTH: f32 = 400.0;
pub const MAX_OBSTACLE_SPEED: f32 = 10.0;

/// Tunable physics parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Restitution coefficient (0-1)
    pub bounce: f32,
    /// Per-axis velocity retention per tick (0-1)
    pub friction: f32,
    pub ball_radius: f32,
    pub peg_radius: f32,
    /// Largest extra lateral velocity injected by a peg hit
    pub peg_randomness: f32,
    /// Largest lateral launch speed
    pub initial_velocity: f32,
    /// Obstacle width (0 disables the obstacle)
    pub obstacle_width: f32,
    pub obstacle_speed: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.12,
            bounce: 0.85,
            friction: 0.998,
            ball_radius: 6.0,
            peg_radius: 4.0,
            peg_randomness: 2.0,
            initial_velocity: 2.0,
            obstacle_width: 0.0,
            obstacle_speed: 2.0,
        }
    }
}

impl PhysicsSettings {
    /// Restore defaults in place
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Draw a new, playable set of settings
    pub fn randomize<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // Half of the boards get an obstacle
        let obstacle_width = if rng.random_bool(0.5) {
            rng.random_range(40.0..120.0)
        } else {
            0.0
        };

        Self {
            gravity: rng.random_range(0.06..0.2),
            bounce: rng.random_range(0.5..0.95),
            friction: rng.random_range(0.99..=1.0),
            ball_radius: rng.random_range(4.0..8.0),
            peg_radius: rng.random_range(3.0..6.0),
            peg_randomness: rng.random_range(0.5..3.0),
            initial_velocity: rng.random_range(0.0..3.0),
            obstacle_width,
            obstacle_speed: rng.random_range(0.5..3.0),
        }
    }

    /// Whether the moving obstacle takes part in the simulation
    #[inline]
    pub fn obstacle_enabled(&self) -> bool {
        self.obstacle_width > 0.0
    }

    /// Check every invariant, reporting the first one broken
    pub fn validate(&self) -> Result<(), DrawError> {
        let fields = [
            self.gravity,
            self.bounce,
            self.friction,
            self.ball_radius,
            self.peg_radius,
            self.peg_randomness,
            self.initial_velocity,
            self.obstacle_width,
            self.obstacle_speed,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(DrawError::InvalidSettings("all values must be finite"));
        }
        if fields.iter().any(|v| *v < 0.0) {
            return Err(DrawError::InvalidSettings("values must be non-negative"));
        }
        if self.bounce > 1.0 {
            return Err(DrawError::InvalidSettings("bounce must not exceed 1"));
        }
        if self.friction > 1.0 {
            return Err(DrawError::InvalidSettings("friction must not exceed 1"));
        }
        let limits = [
            (self.gravity, MAX_GRAVITY),
            (self.ball_radius, MAX_BALL_RADIUS),
            (self.peg_radius, MAX_PEG_RADIUS),
            (self.peg_randomness, MAX_PEG_RANDOMNESS),
            (self.initial_velocity, MAX_INITIAL_VELOCITY),
            (self.obstacle_width, MAX_OBSTACLE_WIDTH),
            (self.obstacle_speed, MAX_OBSTACLE_SPEED),
        ];
        if limits.iter().any(|(v, max)| v > max) {
            return Err(DrawError::InvalidSettings("values exceed their limits"));
        }
        Ok(())
    }

    /// Clamp every field into range; non-finite values fall back to defaults
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let fix = |v: f32, fallback: f32, max: f32| {
            if v.is_finite() {
                v.clamp(0.0, max)
            } else {
                fallback
            }
        };

        Self {
            gravity: fix(self.gravity, d.gravity, MAX_GRAVITY),
            bounce: fix(self.bounce, d.bounce, 1.0),
            friction: fix(self.friction, d.friction, 1.0),
            ball_radius: fix(self.ball_radius, d.ball_radius, MAX_BALL_RADIUS),
            peg_radius: fix(self.peg_radius, d.peg_radius, MAX_PEG_RADIUS),
            peg_randomness: fix(self.peg_randomness, d.peg_randomness, MAX_PEG_RANDOMNESS),
            initial_velocity: fix(self.initial_velocity, d.initial_velocity, MAX_INITIAL_VELOCITY),
            obstacle_width: fix(self.obstacle_width, d.obstacle_width, MAX_OBSTACLE_WIDTH),
            obstacle_speed: fix(self.obstacle_speed, d.obstacle_speed, MAX_OBSTACLE_SPEED),
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&json) {
            Ok(settings) => match settings.validate() {
                Ok(()) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Settings in {} rejected: {}", path.display(), e);
                    settings.sanitized()
                }
            },
            Err(e) => {
                log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Failed to write {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }
}
