//! Draw intents for one frame of the board
//!
//! The engine never owns a graphics API. It describes the frame in terms of a
//! few primitives and any `Surface` (canvas, GPU batcher, recorder) draws them.

use glam::Vec2;

use super::heat::PegHeat;
use crate::consts::BIN_HEIGHT;
use crate::settings::PhysicsSettings;
use crate::sim::{Ball, BoardGeometry, Obstacle, Rect};

/// Linear RGBA color
pub type Rgba = [f32; 4];

const BACKGROUND_TOP: Rgba = [0.06, 0.07, 0.16, 1.0];
const BACKGROUND_BOTTOM: Rgba = [0.02, 0.02, 0.06, 1.0];
const PEG_COLD: Rgba = [0.55, 0.6, 0.75, 1.0];
const PEG_HOT: Rgba = [1.0, 0.85, 0.3, 1.0];
const DIVIDER_COLOR: Rgba = [0.7, 0.72, 0.8, 1.0];
const OBSTACLE_COLOR: Rgba = [0.9, 0.3, 0.35, 1.0];
const HIGHLIGHT_COLOR: Rgba = [1.0, 0.8, 0.2, 0.35];
const LABEL_COLOR: Rgba = [0.95, 0.95, 0.95, 1.0];
const LABEL_SIZE: f32 = 12.0;
/// Rough glyph width used to fit labels into a slot
const GLYPH_WIDTH: f32 = 7.0;

/// Speed mapped to the hottest ball color
const BALL_FAST_SPEED: f32 = 10.0;

/// Primitive drawing operations
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn fill_vertical_gradient(&mut self, rect: Rect, top: Rgba, bottom: Rgba);
    fn text(&mut self, pos: Vec2, text: &str, size: f32, color: Rgba);
}

/// Read-only view of everything a frame shows
#[derive(Debug, Clone)]
pub struct SceneView<'a> {
    pub geometry: &'a BoardGeometry,
    pub settings: &'a PhysicsSettings,
    pub balls: Vec<&'a Ball>,
    pub obstacle: Option<&'a Obstacle>,
    pub heat: &'a PegHeat,
    pub highlighted_slot: Option<usize>,
    /// One label per slot (may be shorter than the slot count)
    pub labels: &'a [String],
}

#[inline]
fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Ball color by speed (slow=blue, medium=green, fast=red/orange)
fn velocity_color(speed: f32) -> Rgba {
    let t = (speed / BALL_FAST_SPEED).clamp(0.0, 1.0);

    let (r, g, b) = if t < 0.33 {
        let u = t / 0.33;
        (0.2, 0.4 + 0.4 * u, 1.0)
    } else if t < 0.66 {
        let u = (t - 0.33) / 0.33;
        (0.2 + 0.8 * u, 0.8, 1.0 - 0.8 * u)
    } else {
        let u = (t - 0.66) / 0.34;
        (1.0, 0.8 - 0.5 * u, 0.2)
    };

    [r, g, b, 1.0]
}

/// Shorten a label to fit `width`, marking the cut with an ellipsis
fn fit_label(label: &str, width: f32) -> String {
    let max_chars = (width / GLYPH_WIDTH).floor().max(1.0) as usize;
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Issue the draw intents for one frame
pub fn draw_scene<S: Surface + ?Sized>(surface: &mut S, view: &SceneView<'_>) {
    let g = view.geometry;

    surface.fill_vertical_gradient(
        Rect::new(Vec2::ZERO, Vec2::new(g.width, g.height)),
        BACKGROUND_TOP,
        BACKGROUND_BOTTOM,
    );

    if let Some(slot) = view.highlighted_slot.filter(|s| *s < g.num_slots) {
        let x = slot as f32 * g.slot_width;
        surface.fill_rect(
            Rect::new(Vec2::new(x, g.divider_top), Vec2::new(x + g.slot_width, g.height)),
            HIGHLIGHT_COLOR,
        );
    }

    for (i, peg) in g.pegs.iter().enumerate() {
        let color = lerp_color(PEG_COLD, PEG_HOT, view.heat.get(i));
        // Hot pegs swell slightly
        let radius = view.settings.peg_radius * (1.0 + 0.3 * view.heat.get(i));
        surface.fill_circle(peg.pos, radius, color);
    }

    for divider in &g.dividers {
        surface.fill_rect(*divider, DIVIDER_COLOR);
    }

    if let Some(obstacle) = view.obstacle {
        surface.fill_rect(obstacle.rect(view.settings), OBSTACLE_COLOR);
    }

    let label_y = g.height - BIN_HEIGHT / 2.0;
    for (slot, label) in view.labels.iter().take(g.num_slots).enumerate() {
        let text = fit_label(label, g.slot_width);
        surface.text(Vec2::new(g.slot_center(slot), label_y), &text, LABEL_SIZE, LABEL_COLOR);
    }

    for ball in &view.balls {
        surface.fill_circle(ball.pos, view.settings.ball_radius, velocity_color(ball.vel.length()));
    }
}

/// A recorded draw intent
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { rect: Rect, color: Rgba },
    Circle { center: Vec2, radius: f32, color: Rgba },
    Gradient { rect: Rect, top: Rgba, bottom: Rgba },
    Text { pos: Vec2, text: String, size: f32, color: Rgba },
}

/// Surface that records commands instead of drawing them
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    pub commands: Vec<DrawCommand>,
}

impl CommandList {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for CommandList {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, top: Rgba, bottom: Rgba) {
        self.commands.push(DrawCommand::Gradient { rect, top, bottom });
    }

    fn text(&mut self, pos: Vec2, text: &str, size: f32, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
            size,
            color,
        });
    }
}
