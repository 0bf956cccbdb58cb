//! Peg heat: display-only glow on recently struck pegs

use crate::sim::PegHit;

/// Per-tick heat retention in single-drop mode
pub const HEAT_DECAY: f32 = 0.9;
/// Slower decay in batch mode so the busy pegs stay visible
pub const HEAT_DECAY_BULK: f32 = 0.97;
/// Heat below this snaps to zero
const HEAT_EPSILON: f32 = 0.01;

/// Heat value (0-1) for every peg of a board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PegHeat {
    values: Vec<f32>,
}

impl PegHeat {
    pub fn new(peg_count: usize) -> Self {
        Self {
            values: vec![0.0; peg_count],
        }
    }

    /// Resize for a new board and cool everything down
    pub fn reset(&mut self, peg_count: usize) {
        self.values.clear();
        self.values.resize(peg_count, 0.0);
    }

    /// Brighten every peg hit this tick
    pub fn apply_hits(&mut self, hits: &[PegHit]) {
        for hit in hits {
            if let Some(v) = self.values.get_mut(hit.peg) {
                *v = 1.0;
            }
        }
    }

    /// Cool every peg by one tick
    pub fn decay(&mut self, bulk: bool) {
        let factor = if bulk { HEAT_DECAY_BULK } else { HEAT_DECAY };
        for v in &mut self.values {
            *v *= factor;
            if *v < HEAT_EPSILON {
                *v = 0.0;
            }
        }
    }

    pub fn get(&self, peg: usize) -> f32 {
        self.values.get(peg).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
