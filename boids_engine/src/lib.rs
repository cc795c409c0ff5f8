use birdwatcher::BoidReport;
use flock::Flock;
use options::{SimulationSettings, Viewport};

pub mod boid;
pub mod flock;

pub mod birdwatcher;
pub mod color;
pub mod math_helpers;
pub mod options;
pub mod render;
pub mod simulation;
pub mod ticker;

/// Nose to base length of a boid triangle at scale 1.
pub const BOID_LENGTH: f32 = 15.;
/// Half of the base width of a boid triangle at scale 1.
pub const BOID_HALF_WIDTH: f32 = 5.;
/// Number of past positions kept per boid.
pub const TRAIL_CAPACITY: usize = 50;
/// Distance from an edge under which wraparound ghosts are drawn.
pub const GHOST_EDGE_THRESHOLD: f32 = 30.;

/// Runs a flock headless for `no_iter` ticks and reports on every boid.
pub fn flock_base(no_iter: u64, settings: SimulationSettings, viewport: Viewport, seed: u64) -> Vec<BoidReport> {
    let mut flock = Flock::new(&settings, &viewport, seed);

    (0..no_iter).for_each(|_| {
        flock.update(&settings, &viewport);
    });

    flock.view().iter().map(BoidReport::from).collect()
}
