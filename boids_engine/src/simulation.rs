use std::{sync::Arc, time::Duration};

use glam::Vec2;
use tracing::{debug, info, warn};

use crate::{
    birdwatcher::{Birdwatcher, BoidReport},
    flock::Flock,
    options::{OverlayFlags, Reseed, SettingsError, SettingsUpdate, SimulationSettings, Viewport},
    render::{Renderer, Surface},
    ticker::{EveryFrame, Ticker},
};

/// What happened on a scheduling opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Stepped,
    /// the ticker asked to wait
    Skipped,
    Paused,
    Stopped,
}

/// Everything one running simulation owns: the population, the settings
/// snapshot it steps with, the viewport, the overlays, the selection and the
/// ticker deciding when to advance.
///
/// Changes that need a fresh population only mark it as pending; the re-seed
/// happens at the start of the next frame, never in the middle of a step.
pub struct Simulation {
    flock: Flock,
    settings: Arc<SimulationSettings>,
    viewport: Viewport,
    overlays: OverlayFlags,
    birdwatcher: Birdwatcher,
    ticker: Box<dyn Ticker>,
    paused: bool,
    stopped: bool,
    reseed_pending: bool,
    ticks: u64,
}

impl Simulation {
    pub fn new(settings: SimulationSettings, viewport: Viewport, seed: u64) -> Self {
        info!(
            boids = settings.num_boids,
            width = viewport.width,
            height = viewport.height,
            seed,
            "starting simulation"
        );

        Simulation {
            flock: Flock::new(&settings, &viewport, seed),
            settings: Arc::new(settings),
            viewport,
            overlays: OverlayFlags::default(),
            birdwatcher: Birdwatcher::new(),
            ticker: Box::new(EveryFrame),
            paused: false,
            stopped: false,
            reseed_pending: false,
            ticks: 0,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Ticker + 'static) -> Self {
        self.set_ticker(ticker);
        self
    }

    pub fn set_ticker(&mut self, ticker: impl Ticker + 'static) {
        self.ticker = Box::new(ticker);
    }

    pub fn request_tick(&mut self) {
        self.ticker.request_tick();
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    /// The live snapshot. Holding on to it is fine: updates swap in a new one.
    pub fn settings(&self) -> Arc<SimulationSettings> {
        Arc::clone(&self.settings)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn overlays(&self) -> OverlayFlags {
        self.overlays
    }

    pub fn set_overlays(&mut self, overlays: OverlayFlags) {
        self.overlays = overlays;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!(paused = self.paused, "toggled pause");
    }

    pub fn reseed_pending(&self) -> bool {
        self.reseed_pending
    }

    /// Applies a single-field patch. A rejected patch leaves the current
    /// snapshot live.
    pub fn update_setting(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let (next, reseed) = match self.settings.apply(update.clone()) {
            Ok(res) => res,
            Err(err) => {
                warn!(?update, %err, "rejected settings update");
                return Err(err);
            }
        };

        self.settings = Arc::new(next);
        if reseed == Reseed::Yes {
            self.schedule_reseed();
        }
        Ok(())
    }

    /// Swaps in a whole new snapshot, re-seeding if the population size or the
    /// speed mode changed.
    pub fn replace_settings(&mut self, settings: SimulationSettings) {
        if settings.num_boids != self.settings.num_boids
            || settings.constant_speed != self.settings.constant_speed
        {
            self.schedule_reseed();
        }
        self.settings = Arc::new(settings);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        info!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
        self.schedule_reseed();
    }

    /// Re-seeds with the current settings at the start of the next frame.
    pub fn reset(&mut self) {
        self.schedule_reseed();
    }

    /// Stops scheduling further ticks for good.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    fn schedule_reseed(&mut self) {
        self.reseed_pending = true;
    }

    fn flush_pending(&mut self) {
        if !self.reseed_pending {
            return;
        }
        self.reseed_pending = false;
        self.flock.restart(&self.settings, &self.viewport);
        self.birdwatcher.watch(&self.flock);
    }

    /// Runs the deferred work, then advances by one tick unless paused or the
    /// ticker says to wait.
    pub fn advance(&mut self, now: Duration) -> FrameOutcome {
        if self.stopped {
            return FrameOutcome::Stopped;
        }

        self.flush_pending();

        if self.paused {
            return FrameOutcome::Paused;
        }

        if !self.ticker.should_tick(now) {
            return FrameOutcome::Skipped;
        }

        self.step();
        FrameOutcome::Stepped
    }

    /// A whole frame: [`Simulation::advance`], then a render if it stepped.
    pub fn frame(&mut self, now: Duration, surface: &mut dyn Surface) -> FrameOutcome {
        let outcome = self.advance(now);
        if outcome == FrameOutcome::Stepped {
            self.render(surface);
        }
        outcome
    }

    /// Advances the population once, regardless of pause and ticker.
    pub fn step(&mut self) {
        self.flock.update(&self.settings, &self.viewport);
        self.birdwatcher.watch(&self.flock);
        self.ticks += 1;
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        Renderer::new(&self.settings, self.viewport, self.overlays).render_frame(surface, &self.flock);
    }

    /// Selects the boid under `point`, clearing the selection on a miss.
    pub fn select_at(&mut self, point: Vec2) -> Option<usize> {
        self.birdwatcher
            .select_at(&self.flock, point, self.settings.effective_scale())
    }

    pub fn clear_selection(&mut self) {
        self.birdwatcher.clear();
    }

    pub fn selected_report(&self) -> Option<&BoidReport> {
        self.birdwatcher.report()
    }
}
