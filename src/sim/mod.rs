//! Pegboard simulation
//!
//! Pure physics and outcome logic:
//! - Settings are passed in as a snapshot, never read from global state
//! - Randomness comes from a caller-supplied RNG only
//! - Stable iteration order (lattice order for pegs, release order for balls)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod outcome;
pub mod state;
pub mod stats;
pub mod tick;

pub use collision::{CollisionResult, PegHit, reflect_velocity};
pub use geometry::{BoardGeometry, Peg, Rect, canvas_width_for, slot_count};
pub use outcome::{display_list, entry_for_slot};
pub use state::{Ball, BallPhase, Obstacle, RngState};
pub use stats::DistributionStats;
pub use tick::{BatchRun, SingleDrop, TickReport, step_ball};
