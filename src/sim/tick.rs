//! Fixed tick simulation
//!
//! One tick integrates every live ball once. `SingleDrop` runs the draw;
//! `BatchRun` drops many independent balls on one shared timeline to measure
//! the slot distribution.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::collision::{PegHit, resolve_dividers, resolve_obstacle, resolve_pegs, resolve_walls};
use super::geometry::BoardGeometry;
use super::state::{Ball, BallPhase, Obstacle, symmetric};
use crate::consts::*;
use crate::settings::PhysicsSettings;

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Pegs struck this tick, in resolution order
    pub peg_hits: Vec<PegHit>,
    /// Slot fixed this tick (single drop only)
    pub slot_decided: Option<usize>,
    /// The run reached its terminal state this tick
    pub landed: bool,
    /// Landing was forced by the stuck timeout
    pub forced: bool,
}

/// Advance one ball by one tick
///
/// Order: gravity, friction, integrate, then walls, pegs, obstacle, dividers.
/// Returns the slot if it was fixed during this step.
pub fn step_ball<R: Rng + ?Sized>(
    ball: &mut Ball,
    geometry: &BoardGeometry,
    settings: &PhysicsSettings,
    obstacle: Option<&Obstacle>,
    rng: &mut R,
    hits: &mut Vec<PegHit>,
) -> Option<usize> {
    if ball.landed() {
        return None;
    }

    ball.vel.y += settings.gravity;
    ball.vel *= settings.friction;
    ball.pos += ball.vel;

    resolve_walls(ball, geometry, settings);
    resolve_pegs(ball, geometry, settings, rng, hits);
    if let Some(obstacle) = obstacle {
        resolve_obstacle(ball, obstacle, settings);
    }
    resolve_dividers(ball, geometry, settings);

    let floor = geometry.bin_floor - settings.ball_radius;
    if ball.pos.y < floor {
        return None;
    }

    ball.pos.y = floor;
    ball.phase = BallPhase::Settling;
    let decided = match ball.landed_slot {
        Some(_) => None,
        None => {
            let slot = geometry.slot_for_x(ball.pos.x);
            ball.landed_slot = Some(slot);
            Some(slot)
        }
    };
    settle(ball, settings);
    decided
}

/// Settling: bounce back up if still moving, otherwise come to rest
fn settle(ball: &mut Ball, settings: &PhysicsSettings) {
    if ball.vel.y.abs() > SETTLE_SPEED {
        ball.vel.y = -ball.vel.y.abs() * settings.bounce * FLOOR_DAMPING;
        ball.phase = BallPhase::Falling;
    } else {
        ball.vel = Vec2::ZERO;
        ball.phase = BallPhase::Landed;
    }
}

/// Whether a run started at `started_at` has hit the stuck timeout
fn timed_out(ticks: u32, started_at: f64, now: f64) -> bool {
    ticks >= STUCK_TIMEOUT_TICKS || now - started_at >= STUCK_TIMEOUT_SECS
}

/// One ball dropped to pick a winner
#[derive(Debug, Clone)]
pub struct SingleDrop {
    ball: Ball,
    obstacle: Option<Obstacle>,
    ticks: u32,
    started_at: f64,
}

impl SingleDrop {
    /// Launch a ball from the top center with a random lateral speed
    pub fn launch<R: Rng + ?Sized>(
        geometry: &BoardGeometry,
        settings: &PhysicsSettings,
        rng: &mut R,
        now: f64,
    ) -> Self {
        let x = geometry.width / 2.0 + rng.random_range(-LAUNCH_JITTER..=LAUNCH_JITTER);
        let vx = if settings.initial_velocity > 0.0 {
            symmetric(rng, settings.initial_velocity)
        } else {
            0.0
        };

        Self {
            ball: Ball::new(0, Vec2::new(x, LAUNCH_Y), Vec2::new(vx, 0.0)),
            obstacle: Obstacle::spawn(geometry, settings),
            ticks: 0,
            started_at: now,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.obstacle.as_ref()
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_landed(&self) -> bool {
        self.ball.landed()
    }

    pub fn landed_slot(&self) -> Option<usize> {
        self.ball.landed_slot
    }

    /// Advance one tick. Does nothing once landed.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        geometry: &BoardGeometry,
        settings: &PhysicsSettings,
        rng: &mut R,
        now: f64,
    ) -> TickReport {
        let mut report = TickReport::default();
        if self.ball.landed() {
            return report;
        }

        if timed_out(self.ticks, self.started_at, now) {
            let had_slot = self.ball.landed_slot.is_some();
            let slot = self.ball.force_land(geometry);
            log::warn!(
                "Drop stuck after {} ticks at ({:.1}, {:.1}), forcing slot {}",
                self.ticks,
                self.ball.pos.x,
                self.ball.pos.y,
                slot
            );
            if !had_slot {
                report.slot_decided = Some(slot);
            }
            report.landed = true;
            report.forced = true;
            return report;
        }

        self.ticks += 1;
        if let Some(obstacle) = self.obstacle.as_mut() {
            obstacle.advance(geometry, settings);
        }

        report.slot_decided = step_ball(
            &mut self.ball,
            geometry,
            settings,
            self.obstacle.as_ref(),
            rng,
            &mut report.peg_hits,
        );
        report.landed = self.ball.landed();
        report
    }
}

/// Many balls on one timeline, for distribution testing
#[derive(Debug, Clone)]
pub struct BatchRun {
    balls: Vec<Ball>,
    /// Shuffled ball indices; the first `released` are in play
    release_order: Vec<usize>,
    released: usize,
    per_tick: usize,
    obstacle: Option<Obstacle>,
    ticks: u32,
    started_at: f64,
}

impl BatchRun {
    /// Spread `ball_count` balls across the interior of the board
    pub fn new<R: Rng + ?Sized>(
        geometry: &BoardGeometry,
        ball_count: usize,
        settings: &PhysicsSettings,
        rng: &mut R,
        now: f64,
    ) -> Self {
        let margin = geometry.width * BATCH_MARGIN_FRACTION;
        let spread = geometry.width * BATCH_SPREAD_FRACTION;
        let r = settings.ball_radius;

        let balls = (0..ball_count)
            .map(|i| {
                let t = (i as f32 + 0.5) / ball_count as f32;
                let jitter = rng.random_range(-BATCH_JITTER..=BATCH_JITTER);
                let x = (margin + t * spread + jitter).clamp(r, geometry.width - r);
                let vx = if settings.initial_velocity > 0.0 {
                    symmetric(rng, settings.initial_velocity)
                } else {
                    0.0
                };
                let vy = rng.random_range(0.0..1.0);
                Ball::new(i as u32, Vec2::new(x, LAUNCH_Y), Vec2::new(vx, vy))
            })
            .collect();

        // Drop order must not follow spawn position
        let mut release_order: Vec<usize> = (0..ball_count).collect();
        release_order.shuffle(rng);

        Self {
            balls,
            release_order,
            released: 0,
            per_tick: ball_count.div_ceil(BATCH_RELEASE_TICKS).max(1),
            obstacle: Obstacle::spawn(geometry, settings),
            ticks: 0,
            started_at: now,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Balls currently in play (released), in release order
    pub fn released_balls(&self) -> impl Iterator<Item = &Ball> {
        self.release_order[..self.released].iter().map(|&i| &self.balls[i])
    }

    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.obstacle.as_ref()
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn landed_count(&self) -> usize {
        self.balls.iter().filter(|b| b.landed()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.balls.iter().all(|b| b.landed())
    }

    /// Advance every released, unlanded ball one tick
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        geometry: &BoardGeometry,
        settings: &PhysicsSettings,
        rng: &mut R,
        now: f64,
    ) -> TickReport {
        let mut report = TickReport::default();
        if self.is_complete() {
            report.landed = true;
            return report;
        }

        if timed_out(self.ticks, self.started_at, now) {
            let stuck = self.balls.len() - self.landed_count();
            for ball in self.balls.iter_mut().filter(|b| !b.landed()) {
                ball.force_land(geometry);
            }
            self.released = self.balls.len();
            log::warn!(
                "Batch stuck after {} ticks, force-landed {} balls",
                self.ticks,
                stuck
            );
            report.landed = true;
            report.forced = true;
            return report;
        }

        self.ticks += 1;
        self.released = (self.released + self.per_tick).min(self.balls.len());

        if let Some(obstacle) = self.obstacle.as_mut() {
            obstacle.advance(geometry, settings);
        }

        for &i in &self.release_order[..self.released] {
            step_ball(
                &mut self.balls[i],
                geometry,
                settings,
                self.obstacle.as_ref(),
                rng,
                &mut report.peg_hits,
            );
        }

        report.landed = self.is_complete();
        report
    }

    /// Per-slot landed counts
    pub fn results(&self, num_slots: usize) -> Vec<u32> {
        let mut counts = vec![0u32; num_slots];
        for slot in self.balls.iter().filter_map(|b| b.landed_slot) {
            if let Some(count) = counts.get_mut(slot) {
                *count += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run_to_end(
        drop: &mut SingleDrop,
        g: &BoardGeometry,
        s: &PhysicsSettings,
        rng: &mut Pcg32,
    ) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for _ in 0..=STUCK_TIMEOUT_TICKS + 1 {
            let report = drop.tick(g, s, rng, 0.0);
            let done = report.landed;
            reports.push(report);
            if done {
                break;
            }
        }
        reports
    }

    #[test]
    fn test_single_drop_lands_in_range() {
        let g = BoardGeometry::for_entries(6);
        let s = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(12345);
        let mut drop = SingleDrop::launch(&g, &s, &mut rng, 0.0);

        let reports = run_to_end(&mut drop, &g, &s, &mut rng);

        assert!(drop.is_landed());
        let slot = drop.landed_slot().unwrap();
        assert!(slot < g.num_slots);
        // Slot is reported exactly once
        let decided: Vec<usize> = reports.iter().filter_map(|r| r.slot_decided).collect();
        assert_eq!(decided, vec![slot]);
        assert!(reports.iter().any(|r| !r.peg_hits.is_empty()));
    }

    #[test]
    fn test_launch_with_huge_speed_stays_finite() {
        let g = BoardGeometry::for_entries(4);
        let s = PhysicsSettings {
            initial_velocity: f32::MAX,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);

        let drop = SingleDrop::launch(&g, &s, &mut rng, 0.0);
        assert!(drop.ball().vel.x.is_finite());

        let run = BatchRun::new(&g, 10, &s, &mut rng, 0.0);
        assert!(run.balls().iter().all(|b| b.vel.x.is_finite()));
    }

    #[test]
    fn test_first_floor_contact_is_final() {
        let g = BoardGeometry::new(800.0, 700.0, 4, 4);
        let s = PhysicsSettings {
            peg_randomness: 0.0,
            ..Default::default()
        };
        let floor = g.bin_floor - s.ball_radius;
        // Fast ball about to hit the floor in slot 1, moving right
        let mut ball = Ball::new(0, Vec2::new(300.0, floor - 1.0), Vec2::new(0.5, 10.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let mut hits = Vec::new();

        let decided = step_ball(&mut ball, &g, &s, None, &mut rng, &mut hits);
        assert_eq!(decided, Some(1));
        assert_eq!(ball.phase, BallPhase::Falling);
        assert!(ball.vel.y < 0.0);

        // Teleport into another bin: the slot must not change
        ball.pos.x = 700.0;
        for _ in 0..500 {
            assert_eq!(step_ball(&mut ball, &g, &s, None, &mut rng, &mut hits), None);
            if ball.landed() {
                break;
            }
        }
        assert!(ball.landed());
        assert_eq!(ball.landed_slot, Some(1));
    }

    #[test]
    fn test_stuck_ball_forced_by_tick_cap() {
        let g = BoardGeometry::for_entries(4);
        // Weightless ball never reaches the floor
        let s = PhysicsSettings {
            gravity: 0.0,
            initial_velocity: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut drop = SingleDrop::launch(&g, &s, &mut rng, 0.0);

        let reports = run_to_end(&mut drop, &g, &s, &mut rng);
        let last = reports.last().unwrap();
        assert!(last.landed && last.forced);
        assert_eq!(last.slot_decided, Some(g.slot_for_x(drop.ball().pos.x)));
        assert_eq!(drop.ticks(), STUCK_TIMEOUT_TICKS);
    }

    #[test]
    fn test_stuck_ball_forced_by_wall_clock() {
        let g = BoardGeometry::for_entries(4);
        let s = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut drop = SingleDrop::launch(&g, &s, &mut rng, 100.0);

        drop.tick(&g, &s, &mut rng, 100.0);
        let report = drop.tick(&g, &s, &mut rng, 100.0 + STUCK_TIMEOUT_SECS);
        assert!(report.forced);
        assert!(drop.is_landed());
    }

    #[test]
    fn test_zero_width_obstacle_matches_no_obstacle() {
        let g = BoardGeometry::for_entries(8);
        let s = PhysicsSettings::default();
        assert_eq!(s.obstacle_width, 0.0);
        // Obstacle placed right in the path, but disabled by width 0
        let obstacle = Obstacle {
            x: g.width / 2.0,
            y: g.obstacle_y,
            direction: 1.0,
        };

        let mut a = Ball::new(0, Vec2::new(g.width / 2.0, LAUNCH_Y), Vec2::new(0.3, 0.0));
        let mut b = a.clone();
        let mut rng_a = Pcg32::seed_from_u64(77);
        let mut rng_b = Pcg32::seed_from_u64(77);

        for _ in 0..2000 {
            step_ball(&mut a, &g, &s, Some(&obstacle), &mut rng_a, &mut Vec::new());
            step_ball(&mut b, &g, &s, None, &mut rng_b, &mut Vec::new());
            assert_eq!(a.pos.to_array().map(f32::to_bits), b.pos.to_array().map(f32::to_bits));
            assert_eq!(a.vel.to_array().map(f32::to_bits), b.vel.to_array().map(f32::to_bits));
        }
        assert_eq!(a.landed_slot, b.landed_slot);
    }

    #[test]
    fn test_single_drop_deterministic_per_seed() {
        let g = BoardGeometry::for_entries(10);
        let s = PhysicsSettings::default();

        let run = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut drop = SingleDrop::launch(&g, &s, &mut rng, 0.0);
            run_to_end(&mut drop, &g, &s, &mut rng);
            (drop.landed_slot(), drop.ticks())
        };

        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_batch_counts_sum_to_ball_count() {
        let g = BoardGeometry::for_entries(5);
        let s = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(21);
        let mut batch = BatchRun::new(&g, 150, &s, &mut rng, 0.0);

        let mut ticks = 0;
        while !batch.tick(&g, &s, &mut rng, 0.0).landed {
            ticks += 1;
            assert!(ticks <= STUCK_TIMEOUT_TICKS + 1);
        }

        let results = batch.results(g.num_slots);
        assert_eq!(results.len(), 5);
        assert_eq!(results.iter().sum::<u32>(), 150);
        assert_eq!(batch.landed_count(), 150);
    }

    #[test]
    fn test_batch_releases_gradually() {
        let g = BoardGeometry::for_entries(5);
        let s = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let count = BATCH_RELEASE_TICKS * 3;
        let mut batch = BatchRun::new(&g, count, &s, &mut rng, 0.0);

        batch.tick(&g, &s, &mut rng, 0.0);
        assert_eq!(batch.released_balls().count(), 3);

        // Unreleased balls have not moved
        let still = batch
            .balls()
            .iter()
            .filter(|b| b.pos.y == LAUNCH_Y && b.phase == BallPhase::Falling)
            .count();
        assert!(still >= count - 3);
    }

    #[test]
    fn test_batch_spawn_spread() {
        let g = BoardGeometry::for_entries(10);
        let s = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let batch = BatchRun::new(&g, 500, &s, &mut rng, 0.0);

        let lo = g.width * BATCH_MARGIN_FRACTION - BATCH_JITTER;
        let hi = g.width * (BATCH_MARGIN_FRACTION + BATCH_SPREAD_FRACTION) + BATCH_JITTER;
        assert!(batch.balls().iter().all(|b| b.pos.x >= lo && b.pos.x <= hi));
    }

    #[test]
    fn test_batch_timeout_lands_everything() {
        let g = BoardGeometry::for_entries(3);
        let s = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut batch = BatchRun::new(&g, 40, &s, &mut rng, 0.0);

        batch.tick(&g, &s, &mut rng, 0.0);
        let report = batch.tick(&g, &s, &mut rng, STUCK_TIMEOUT_SECS);
        assert!(report.forced && report.landed);
        assert!(batch.is_complete());
        assert_eq!(batch.results(g.num_slots).iter().sum::<u32>(), 40);
    }
}
