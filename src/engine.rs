//! Frame-driven simulation driver
//!
//! The host calls `frame(now)` once per display frame for as long as it
//! returns `FrameStatus::Continue`. Each run owns a settings snapshot and its
//! listener; cancelling drops both, so nothing fires for a cancelled run.

use rand_pcg::Pcg32;

use crate::audio::{AudioSink, peg_hit_cue};
use crate::consts::{BATCH_FINALIZE_DELAY_SECS, LANDING_DELAY_SECS, MIN_SLOTS};
use crate::error::DrawError;
use crate::render::{PegHeat, SceneView};
use crate::settings::PhysicsSettings;
use crate::sim::{
    BatchRun, BoardGeometry, DistributionStats, RngState, SingleDrop, canvas_width_for,
    display_list, entry_for_slot, slot_count,
};

/// Mixed into the seed of `Simulator::host_rng`
const HOST_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Callbacks for one run. Every method has a no-op default.
pub trait DrawListener {
    /// Slot fixed at first floor contact (before the landing delay)
    fn on_highlighted_slot_change(&mut self, _slot: usize) {}
    /// Entry under the fixed slot (before the landing delay)
    fn on_displayed_winner_change(&mut self, _name: &str) {}
    /// Winner of a single drop, once, after the landing delay
    fn on_complete(&mut self, _winner: &str) {}
    /// Per-slot counts of a batch test, once, after the finalize delay
    fn on_test_complete(&mut self, _results: &[u32]) {}
}

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stopped,
}

/// A single drop in flight
pub struct SingleRun {
    drop: SingleDrop,
    settings: PhysicsSettings,
    display: Vec<String>,
    listener: Box<dyn DrawListener>,
    highlighted_slot: Option<usize>,
    /// Set once landed: when `on_complete` fires
    complete_at: Option<f64>,
}

/// A batch distribution test in flight
pub struct BatchTest {
    run: BatchRun,
    settings: PhysicsSettings,
    listener: Box<dyn DrawListener>,
    /// Set once every ball landed: when `on_test_complete` fires
    finalize_at: Option<f64>,
}

/// Driver state
pub enum SimState {
    Idle,
    RunningSingle(Box<SingleRun>),
    RunningBatch(Box<BatchTest>),
    Cancelled,
}

impl SimState {
    pub fn name(&self) -> &'static str {
        match self {
            SimState::Idle => "idle",
            SimState::RunningSingle(_) => "single",
            SimState::RunningBatch(_) => "batch",
            SimState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Debug for SimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimState::{}", self.name())
    }
}

/// Owns the board, the RNG and the current run
pub struct Simulator {
    state: SimState,
    geometry: BoardGeometry,
    rng_state: RngState,
    rng: Pcg32,
    heat: PegHeat,
    audio: Option<Box<dyn AudioSink>>,
}

impl Simulator {
    /// Create a simulator with a fixed seed (reproducible runs)
    pub fn new(seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let geometry = BoardGeometry::for_entries(MIN_SLOTS);
        Self {
            state: SimState::Idle,
            heat: PegHeat::new(geometry.pegs.len()),
            geometry,
            rng: rng_state.to_rng(),
            rng_state,
            audio: None,
        }
    }

    /// Create a simulator seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(RngState::from_entropy().seed)
    }

    /// Route peg-hit cues of single drops to `sink`
    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// RNG for host-side draws (entry shuffle, settings randomization)
    ///
    /// Derived from the simulator seed, so one seed reproduces a whole draw.
    /// The stream is independent of the physics RNG.
    pub fn host_rng(&self) -> Pcg32 {
        RngState::new(self.rng_state.seed ^ HOST_SEED_SALT).to_rng()
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn heat(&self) -> &PegHeat {
        &self.heat
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state,
            SimState::RunningSingle(_) | SimState::RunningBatch(_)
        )
    }

    /// Rebuild the board only when its slot count or width changes
    fn ensure_board(&mut self, entry_count: usize) {
        let width = canvas_width_for(entry_count);
        if self.geometry.num_slots != slot_count(entry_count) || self.geometry.width != width {
            self.geometry = BoardGeometry::for_entries(entry_count);
            log::debug!(
                "Board rebuilt: {} slots, {} pegs, width {}",
                self.geometry.num_slots,
                self.geometry.pegs.len(),
                self.geometry.width
            );
        }
        self.heat.reset(self.geometry.pegs.len());
    }

    fn snapshot(settings: &PhysicsSettings) -> PhysicsSettings {
        let snapshot = settings.sanitized();
        if snapshot != *settings {
            log::warn!("Settings out of range, clamped for this run: {:?}", snapshot);
        }
        snapshot
    }

    /// Start a single drop over a pre-shuffled entry list
    ///
    /// Refuses (without touching any state) when fewer than two entries are
    /// given. A run already in progress is cancelled first.
    pub fn start_single(
        &mut self,
        entries: &[String],
        settings: &PhysicsSettings,
        listener: Box<dyn DrawListener>,
        now: f64,
    ) -> Result<(), DrawError> {
        if entries.len() < MIN_SLOTS {
            log::info!("Drop refused: {} entries", entries.len());
            return Err(DrawError::InsufficientEntries {
                found: entries.len(),
            });
        }
        if self.is_running() {
            self.cancel();
        }

        let settings = Self::snapshot(settings);
        let display = display_list(entries);
        self.ensure_board(display.len());
        let drop = SingleDrop::launch(&self.geometry, &settings, &mut self.rng, now);

        log::info!(
            "Drop started: {} entries on {} slots",
            entries.len(),
            self.geometry.num_slots
        );
        self.state = SimState::RunningSingle(Box::new(SingleRun {
            drop,
            settings,
            display,
            listener,
            highlighted_slot: None,
            complete_at: None,
        }));
        Ok(())
    }

    /// Start a batch distribution test of `ball_count` balls
    pub fn start_batch(
        &mut self,
        num_slots: usize,
        ball_count: usize,
        settings: &PhysicsSettings,
        listener: Box<dyn DrawListener>,
        now: f64,
    ) -> Result<(), DrawError> {
        if ball_count == 0 {
            log::info!("Batch refused: no balls");
            return Err(DrawError::EmptyBatch);
        }
        if self.is_running() {
            self.cancel();
        }

        let settings = Self::snapshot(settings);
        self.ensure_board(num_slots);
        let run = BatchRun::new(&self.geometry, ball_count, &settings, &mut self.rng, now);

        log::info!(
            "Batch started: {} balls on {} slots",
            ball_count,
            self.geometry.num_slots
        );
        self.state = SimState::RunningBatch(Box::new(BatchTest {
            run,
            settings,
            listener,
            finalize_at: None,
        }));
        Ok(())
    }

    /// Stop the current run; no further callbacks fire for it
    pub fn cancel(&mut self) {
        if self.is_running() {
            log::info!("Cancelled {} run", self.state.name());
            self.state = SimState::Cancelled;
        }
    }

    /// Advance one frame
    pub fn frame(&mut self, now: f64) -> FrameStatus {
        match self.state {
            SimState::Idle | SimState::Cancelled => FrameStatus::Stopped,
            SimState::RunningSingle(_) => self.frame_single(now),
            SimState::RunningBatch(_) => self.frame_batch(now),
        }
    }

    fn frame_single(&mut self, now: f64) -> FrameStatus {
        let SimState::RunningSingle(run) = &mut self.state else {
            return FrameStatus::Stopped;
        };

        if let Some(at) = run.complete_at {
            if now < at {
                return FrameStatus::Continue;
            }
            self.finish_single();
            return FrameStatus::Stopped;
        }

        let report = run.drop.tick(&self.geometry, &run.settings, &mut self.rng, now);

        self.heat.decay(false);
        self.heat.apply_hits(&report.peg_hits);
        if let Some(audio) = self.audio.as_mut() {
            for hit in &report.peg_hits {
                audio.play(peg_hit_cue(hit.impact_speed));
            }
        }

        if let Some(slot) = report.slot_decided {
            run.highlighted_slot = Some(slot);
            run.listener.on_highlighted_slot_change(slot);
            match entry_for_slot(&run.display, slot) {
                Some(name) => run.listener.on_displayed_winner_change(name),
                None => log::error!(
                    "Slot {} has no entry ({} displayed)",
                    slot,
                    run.display.len()
                ),
            }
        }

        if report.landed {
            log::debug!(
                "Ball landed after {} ticks{}",
                run.drop.ticks(),
                if report.forced { " (forced)" } else { "" }
            );
            run.complete_at = Some(now + LANDING_DELAY_SECS);
        }
        FrameStatus::Continue
    }

    fn finish_single(&mut self) {
        let SimState::RunningSingle(mut run) = std::mem::replace(&mut self.state, SimState::Idle)
        else {
            return;
        };

        let winner = run
            .drop
            .landed_slot()
            .and_then(|slot| entry_for_slot(&run.display, slot))
            .cloned();
        match winner {
            Some(winner) => {
                log::info!("Winner: {}", winner);
                run.listener.on_complete(&winner);
            }
            None => log::error!(
                "Landed slot {:?} outside display list of {}, no winner",
                run.drop.landed_slot(),
                run.display.len()
            ),
        }
    }

    fn frame_batch(&mut self, now: f64) -> FrameStatus {
        let SimState::RunningBatch(test) = &mut self.state else {
            return FrameStatus::Stopped;
        };

        if let Some(at) = test.finalize_at {
            if now < at {
                return FrameStatus::Continue;
            }
            self.finish_batch();
            return FrameStatus::Stopped;
        }

        let report = test.run.tick(&self.geometry, &test.settings, &mut self.rng, now);
        self.heat.decay(true);
        self.heat.apply_hits(&report.peg_hits);

        if report.landed {
            log::debug!(
                "Batch landed after {} ticks{}",
                test.run.ticks(),
                if report.forced { " (forced)" } else { "" }
            );
            test.finalize_at = Some(now + BATCH_FINALIZE_DELAY_SECS);
        }
        FrameStatus::Continue
    }

    fn finish_batch(&mut self) {
        let SimState::RunningBatch(mut test) = std::mem::replace(&mut self.state, SimState::Idle)
        else {
            return;
        };

        let results = test.run.results(self.geometry.num_slots);
        let stats = DistributionStats::from_counts(&results);
        log::info!(
            "Batch complete: {} balls, std dev {:.2}, max deviation {:.2} pp",
            stats.total,
            stats.std_dev,
            stats.max_deviation()
        );
        test.listener.on_test_complete(&results);
    }

    /// Drive frames on a synthetic clock until the run stops
    ///
    /// Returns the clock value at which the last frame ran.
    pub fn run_to_completion(&mut self, mut now: f64, dt: f64) -> f64 {
        while self.frame(now) == FrameStatus::Continue {
            now += dt;
        }
        now
    }

    /// Read-only view of the current run for rendering
    pub fn scene(&self) -> Option<SceneView<'_>> {
        match &self.state {
            SimState::RunningSingle(run) => Some(SceneView {
                geometry: &self.geometry,
                settings: &run.settings,
                balls: vec![run.drop.ball()],
                obstacle: run.drop.obstacle(),
                heat: &self.heat,
                highlighted_slot: run.highlighted_slot,
                labels: &run.display,
            }),
            SimState::RunningBatch(test) => Some(SceneView {
                geometry: &self.geometry,
                settings: &test.settings,
                balls: test.run.released_balls().collect(),
                obstacle: test.run.obstacle(),
                heat: &self.heat,
                highlighted_slot: None,
                labels: &[],
            }),
            SimState::Idle | SimState::Cancelled => None,
        }
    }
}
