//! Board geometry: peg lattice, slots and dividers
//!
//! Everything here is a pure function of (width, height, entry count, rows).
//! Coordinates are canvas space: origin top-left, y grows downward.

use std::ops::Range;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from its center and full size
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// A fixed peg in the lattice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub row: usize,
}

/// Full board layout for one (width, height, entry count, rows) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub width: f32,
    pub height: f32,
    pub rows: usize,
    pub num_slots: usize,
    pub slot_width: f32,
    /// Pegs in lattice order (row-major, left to right)
    pub pegs: Vec<Peg>,
    /// Index range into `pegs` for each row
    pub row_ranges: Vec<Range<usize>>,
    /// One bar per slot boundary, `num_slots + 1` in total
    pub dividers: Vec<Rect>,
    /// Top of the divider bars
    pub divider_top: f32,
    /// Floor line of the bins
    pub bin_floor: f32,
    /// Vertical center of the obstacle band
    pub obstacle_y: f32,
}

/// Slot count for a display list of `entry_count` entries
#[inline]
pub fn slot_count(entry_count: usize) -> usize {
    entry_count.clamp(MIN_SLOTS, MAX_SLOTS)
}

/// Canvas width for an entry count (wide mode past the threshold)
#[inline]
pub fn canvas_width_for(entry_count: usize) -> f32 {
    if entry_count > WIDE_MODE_THRESHOLD {
        WIDE_CANVAS_WIDTH
    } else {
        CANVAS_WIDTH
    }
}

impl BoardGeometry {
    pub fn new(width: f32, height: f32, entry_count: usize, rows: usize) -> Self {
        let num_slots = slot_count(entry_count);
        let slot_width = width / num_slots as f32;

        // Triangular lattice: even rows full, odd rows one short and offset
        let full_row = ((width - LATTICE_MARGIN) / PEG_SPACING).floor().max(0.0) as usize + 1;
        let mut pegs = Vec::with_capacity(full_row * rows);
        let mut row_ranges = Vec::with_capacity(rows);

        for row in 0..rows {
            let count = if row % 2 == 0 {
                full_row
            } else {
                full_row.saturating_sub(1)
            };
            let span = count.saturating_sub(1) as f32 * PEG_SPACING;
            let start_x = (width - span) / 2.0;
            let y = FIRST_ROW_Y + row as f32 * ROW_SPACING;

            let first = pegs.len();
            for i in 0..count {
                pegs.push(Peg {
                    pos: Vec2::new(start_x + i as f32 * PEG_SPACING, y),
                    row,
                });
            }
            row_ranges.push(first..pegs.len());
        }

        let divider_top = height - BIN_HEIGHT;
        let dividers = (0..=num_slots)
            .map(|i| {
                let x = i as f32 * slot_width;
                Rect::new(
                    Vec2::new(x - DIVIDER_WIDTH / 2.0, divider_top),
                    Vec2::new(x + DIVIDER_WIDTH / 2.0, height),
                )
            })
            .collect();

        let last_row_y = FIRST_ROW_Y + rows.saturating_sub(1) as f32 * ROW_SPACING;

        Self {
            width,
            height,
            rows,
            num_slots,
            slot_width,
            pegs,
            row_ranges,
            dividers,
            divider_top,
            bin_floor: height - FLOOR_MARGIN,
            obstacle_y: (last_row_y + divider_top) / 2.0,
        }
    }

    /// Default board for a display list of `entry_count` entries
    pub fn for_entries(entry_count: usize) -> Self {
        Self::new(
            canvas_width_for(entry_count),
            CANVAS_HEIGHT,
            entry_count,
            DEFAULT_ROWS,
        )
    }

    /// Slot under horizontal position `x`, always in `[0, num_slots)`
    pub fn slot_for_x(&self, x: f32) -> usize {
        let idx = (x / self.slot_width).floor();
        if idx.is_nan() || idx <= 0.0 {
            0
        } else if idx >= self.num_slots as f32 {
            self.num_slots - 1
        } else {
            idx as usize
        }
    }

    /// Horizontal center of a slot
    pub fn slot_center(&self, slot: usize) -> f32 {
        (slot as f32 + 0.5) * self.slot_width
    }

    /// Rows whose pegs can touch a ball at height `y` within `reach`
    pub fn rows_near(&self, y: f32, reach: f32) -> Range<usize> {
        if self.rows == 0 || !y.is_finite() {
            return 0..0;
        }
        let lo = ((y - reach - FIRST_ROW_Y) / ROW_SPACING).ceil();
        let hi = ((y + reach - FIRST_ROW_Y) / ROW_SPACING).floor();
        if hi < 0.0 || lo > (self.rows - 1) as f32 || lo > hi {
            return 0..0;
        }
        let lo = lo.max(0.0) as usize;
        let hi = (hi as usize).min(self.rows - 1);
        lo..hi + 1
    }

    /// Pegs from the given rows, in lattice order, with their indices
    pub fn pegs_in_rows(&self, rows: Range<usize>) -> impl Iterator<Item = (usize, &Peg)> {
        let range = if rows.start < rows.end {
            match (self.row_ranges.get(rows.start), self.row_ranges.get(rows.end - 1)) {
                (Some(first), Some(last)) => first.start..last.end,
                _ => 0..0,
            }
        } else {
            0..0
        };
        self.pegs[range.clone()]
            .iter()
            .enumerate()
            .map(move |(i, peg)| (range.start + i, peg))
    }
}
