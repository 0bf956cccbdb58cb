//! Plinko Draw - pick a winner by dropping a ball through a pegboard
//!
//! Core modules:
//! - `sim`: Board geometry, collision resolvers, single and batch simulators
//! - `engine`: Frame-driven simulation driver (start / frame / cancel)
//! - `settings`: Physics settings snapshot (randomize, reset, persist)
//! - `entries`: Weighted entry expansion and shuffling
//! - `audio`: Collision audio cues and sink abstraction
//! - `render`: Peg heat and draw intents for a rendering surface

pub mod audio;
pub mod engine;
pub mod entries;
pub mod error;
pub mod render;
pub mod settings;
pub mod sim;

pub use engine::{DrawListener, FrameStatus, SimState, Simulator};
pub use error::DrawError;
pub use settings::PhysicsSettings;

/// Board and simulation constants
pub mod consts {
    /// Nominal frame rate the tick cap is derived from
    pub const SIM_HZ: u32 = 60;
    /// Frame step used by headless drivers (seconds)
    pub const FRAME_DT: f64 = 1.0 / SIM_HZ as f64;

    /// Canvas dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const WIDE_CANVAS_WIDTH: f32 = 1200.0;
    pub const CANVAS_HEIGHT: f32 = 700.0;
    /// Entry count above which the board switches to the wide canvas
    pub const WIDE_MODE_THRESHOLD: usize = 20;

    /// Slot bounds
    pub const MIN_SLOTS: usize = 2;
    pub const MAX_SLOTS: usize = 40;

    /// Peg lattice
    pub const DEFAULT_ROWS: usize = 14;
    pub const PEG_SPACING: f32 = 40.0;
    pub const ROW_SPACING: f32 = 36.0;
    pub const FIRST_ROW_Y: f32 = 70.0;
    /// Horizontal space kept free of pegs (split across both edges)
    pub const LATTICE_MARGIN: f32 = 60.0;

    /// Bins and dividers
    pub const BIN_HEIGHT: f32 = 80.0;
    pub const FLOOR_MARGIN: f32 = 4.0;
    pub const DIVIDER_WIDTH: f32 = 4.0;

    /// Moving obstacle
    pub const OBSTACLE_HEIGHT: f32 = 8.0;
    /// Fraction of obstacle speed added to the ball's vx on a bounce
    pub const OBSTACLE_NUDGE: f32 = 0.3;

    /// Launch
    pub const LAUNCH_Y: f32 = 20.0;
    pub const LAUNCH_JITTER: f32 = 10.0;

    /// Settling
    /// Vertical speed below which a ball on the floor is at rest
    pub const SETTLE_SPEED: f32 = 1.0;
    /// Extra damping on floor bounces (on top of restitution)
    pub const FLOOR_DAMPING: f32 = 0.4;
    /// Extra damping on bounces off a divider's top
    pub const DIVIDER_TOP_DAMPING: f32 = 0.5;
    /// Lateral push for a ball sitting on a divider with no sideways speed
    pub const DIVIDER_NUDGE: f32 = 0.4;

    /// Stuck-ball fallback
    pub const STUCK_TIMEOUT_SECS: f64 = 20.0;
    pub const STUCK_TIMEOUT_TICKS: u32 = 20 * SIM_HZ;

    /// Delays before completion callbacks fire (seconds)
    pub const LANDING_DELAY_SECS: f64 = 0.5;
    pub const BATCH_FINALIZE_DELAY_SECS: f64 = 0.5;

    /// Batch spawn layout
    pub const BATCH_MARGIN_FRACTION: f32 = 0.12;
    pub const BATCH_SPREAD_FRACTION: f32 = 0.76;
    pub const BATCH_JITTER: f32 = 4.0;
    /// All batch balls are released within this many ticks
    pub const BATCH_RELEASE_TICKS: usize = 90;
}
