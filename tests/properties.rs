//! Property-based tests for the pegboard physics
//!
//! Invariants checked across random settings and board sizes:
//! - Every drop terminates inside the tick cap
//! - Landed slots are always in range
//! - Slot counts stay clamped
//! - Peg, wall and divider contacts never add speed when randomness is off
//! - Batch results conserve the ball count

use glam::Vec2;
use plinko_draw::PhysicsSettings;
use plinko_draw::consts::{FRAME_DT, MAX_SLOTS, MIN_SLOTS, STUCK_TIMEOUT_TICKS};
use plinko_draw::sim::collision::{resolve_dividers, resolve_pegs, resolve_walls};
use plinko_draw::sim::{Ball, BatchRun, BoardGeometry, SingleDrop, slot_count};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Settings inside the randomizer's ranges, obstacle included
fn any_settings() -> impl Strategy<Value = PhysicsSettings> {
    (
        0.05f32..0.4,
        0.0f32..=1.0,
        0.97f32..=1.0,
        3.0f32..10.0,
        2.0f32..8.0,
        0.0f32..5.0,
        0.0f32..5.0,
        prop_oneof![Just(0.0f32), 40.0f32..120.0],
        0.5f32..5.0,
    )
        .prop_map(|fields| {
            let (gravity, bounce, friction, ball_radius, peg_radius) =
                (fields.0, fields.1, fields.2, fields.3, fields.4);
            let (peg_randomness, initial_velocity, obstacle_width, obstacle_speed) =
                (fields.5, fields.6, fields.7, fields.8);
            PhysicsSettings {
                gravity,
                bounce,
                friction,
                ball_radius,
                peg_radius,
                peg_randomness,
                initial_velocity,
                obstacle_width,
                obstacle_speed,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn drop_terminates_in_range(
        settings in any_settings(),
        entries in 2usize..30,
        seed in any::<u64>(),
    ) {
        let geometry = BoardGeometry::for_entries(entries);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut drop = SingleDrop::launch(&geometry, &settings, &mut rng, 0.0);

        let mut decided = 0;
        let mut frames = 0u32;
        while !drop.is_landed() {
            prop_assert!(frames <= STUCK_TIMEOUT_TICKS + 1);
            let report = drop.tick(&geometry, &settings, &mut rng, frames as f64 * FRAME_DT);
            if report.slot_decided.is_some() {
                decided += 1;
            }
            frames += 1;
        }

        prop_assert_eq!(decided, 1);
        let slot = drop.landed_slot();
        prop_assert!(matches!(slot, Some(s) if s < geometry.num_slots));
    }

    #[test]
    fn slot_count_is_clamped(entries in 0usize..500) {
        let n = slot_count(entries);
        prop_assert!((MIN_SLOTS..=MAX_SLOTS).contains(&n));
        if (MIN_SLOTS..=MAX_SLOTS).contains(&entries) {
            prop_assert_eq!(n, entries);
        }
    }

    #[test]
    fn slot_for_x_in_range(entries in 2usize..40, x in -1000.0f32..3000.0) {
        let geometry = BoardGeometry::for_entries(entries);
        prop_assert!(geometry.slot_for_x(x) < geometry.num_slots);
    }

    #[test]
    fn peg_contact_never_adds_speed(
        bounce in 0.0f32..=1.0,
        angle in 0.0f32..std::f32::consts::TAU,
        depth in 0.1f32..0.9,
        vx in -6.0f32..6.0,
        vy in -6.0f32..6.0,
        peg in 0usize..20,
    ) {
        let geometry = BoardGeometry::for_entries(8);
        let settings = PhysicsSettings {
            bounce,
            peg_randomness: 0.0,
            ..PhysicsSettings::default()
        };
        let center = geometry.pegs[peg].pos;
        let reach = settings.ball_radius + settings.peg_radius;
        let pos = center + Vec2::from_angle(angle) * reach * depth;

        let mut ball = Ball::new(0, pos, Vec2::new(vx, vy));
        let before = ball.vel.length();
        let mut rng = Pcg32::seed_from_u64(0);
        let mut hits = Vec::new();
        resolve_pegs(&mut ball, &geometry, &settings, &mut rng, &mut hits);

        prop_assert!(ball.vel.length() <= before + 1e-4);
    }

    #[test]
    fn wall_contact_never_adds_speed(
        bounce in 0.0f32..=1.0,
        overshoot in 0.0f32..5.0,
        right in any::<bool>(),
        vx in 0.1f32..8.0,
        vy in -6.0f32..6.0,
    ) {
        let geometry = BoardGeometry::for_entries(8);
        let settings = PhysicsSettings { bounce, ..PhysicsSettings::default() };
        let r = settings.ball_radius;
        let (x, vx) = if right {
            (geometry.width - r + overshoot, vx)
        } else {
            (r - overshoot, -vx)
        };

        let mut ball = Ball::new(0, Vec2::new(x, 300.0), Vec2::new(vx, vy));
        let before = ball.vel.length();
        resolve_walls(&mut ball, &geometry, &settings);

        prop_assert!(ball.vel.length() <= before + 1e-4);
        prop_assert!(ball.pos.x >= r && ball.pos.x <= geometry.width - r);
    }

    #[test]
    fn divider_top_contact_never_adds_speed(
        bounce in 0.0f32..=1.0,
        depth in 0.1f32..3.0,
        offset in -1.5f32..1.5,
        divider in 1usize..8,
        vx in -1.0f32..1.0,
        vy in 0.0f32..4.0,
    ) {
        let geometry = BoardGeometry::for_entries(8);
        let settings = PhysicsSettings { bounce, ..PhysicsSettings::default() };
        let rect = geometry.dividers[divider];
        let x = rect.center().x + offset;
        let y = rect.min.y - settings.ball_radius + depth;

        let mut ball = Ball::new(0, Vec2::new(x, y), Vec2::new(vx, vy));
        let before = ball.vel.length();
        prop_assert!(resolve_dividers(&mut ball, &geometry, &settings));

        prop_assert!(ball.vel.y <= 0.0);
        prop_assert!(ball.vel.length() <= before + 1e-4);
    }

    #[test]
    fn divider_side_contact_never_adds_speed(
        bounce in 0.0f32..=1.0,
        depth in 0.5f32..4.0,
        divider in 1usize..8,
        vx in 0.1f32..6.0,
        vy in -3.0f32..3.0,
    ) {
        let geometry = BoardGeometry::for_entries(8);
        let settings = PhysicsSettings { bounce, ..PhysicsSettings::default() };
        let rect = geometry.dividers[divider];
        let y = (rect.min.y + rect.max.y) / 2.0;
        let x = rect.min.x - settings.ball_radius + depth;

        let mut ball = Ball::new(0, Vec2::new(x, y), Vec2::new(vx, vy));
        let before = ball.vel.length();
        prop_assert!(resolve_dividers(&mut ball, &geometry, &settings));

        prop_assert!(ball.vel.x <= 0.0);
        prop_assert!(ball.vel.length() <= before + 1e-4);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn batch_conserves_balls(
        slots in 2usize..16,
        balls in 1usize..150,
        seed in any::<u64>(),
    ) {
        let geometry = BoardGeometry::for_entries(slots);
        let settings = PhysicsSettings::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut run = BatchRun::new(&geometry, balls, &settings, &mut rng, 0.0);

        let mut frames = 0u32;
        while !run.is_complete() {
            prop_assert!(frames <= STUCK_TIMEOUT_TICKS + 1);
            run.tick(&geometry, &settings, &mut rng, frames as f64 * FRAME_DT);
            frames += 1;
        }

        let results = run.results(geometry.num_slots);
        prop_assert_eq!(results.len(), slots);
        prop_assert_eq!(results.iter().sum::<u32>() as usize, balls);
    }
}
