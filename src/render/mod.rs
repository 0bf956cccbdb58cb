//! Presentation projection of engine state
//!
//! Nothing here feeds back into physics.

pub mod heat;
pub mod scene;

pub use heat::PegHeat;
pub use scene::{CommandList, DrawCommand, Rgba, SceneView, Surface, draw_scene};
