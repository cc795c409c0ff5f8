use std::fmt;

use glam::Vec2;
use serde::Serialize;
use tracing::debug;

use crate::{boid::Boid, flock::Flock};

/// Live state of a single boid, as shown in an info panel.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoidReport {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    /// heading in degrees, (-180, 180]
    pub direction: f32,
    pub trail_len: usize,
}

impl From<&Boid> for BoidReport {
    fn from(boid: &Boid) -> Self {
        BoidReport {
            id: boid.id,
            x: boid.position.x,
            y: boid.position.y,
            dx: boid.velocity.x,
            dy: boid.velocity.y,
            speed: boid.speed(),
            direction: boid.heading().to_degrees(),
            trail_len: boid.trail_len(),
        }
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.).round() / 100.
}

impl fmt::Display for BoidReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Boid #{}", self.id)?;
        writeln!(f, "Position: ({}, {})", self.x.round(), self.y.round())?;
        writeln!(f, "Velocity: ({}, {})", round2(self.dx), round2(self.dy))?;
        writeln!(f, "Speed: {}", round2(self.speed))?;
        writeln!(f, "Direction: {}°", self.direction.round())?;
        write!(f, "Trail Length: {}", self.trail_len)
    }
}

/// A boid id pinned to the population generation it was picked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub generation: u64,
    pub id: usize,
}

/// Keeps track of the selected boid and its latest report. It only ever
/// reads the flock.
#[derive(Debug, Default)]
pub struct Birdwatcher {
    selection: Option<Selection>,
    report: Option<BoidReport>,
}

impl Birdwatcher {
    pub fn new() -> Self {
        Default::default()
    }

    /// Selects the first boid under `point`, or clears the selection when
    /// there is none. Returns the id picked.
    pub fn select_at(&mut self, flock: &Flock, point: Vec2, scale: f32) -> Option<usize> {
        match flock.hit_test(point, scale) {
            Some(boid) => {
                debug!(id = boid.id, generation = flock.generation(), "selected boid");
                self.selection = Some(Selection {
                    generation: flock.generation(),
                    id: boid.id,
                });
                self.report = Some(boid.into());
                Some(boid.id)
            }
            None => {
                self.clear();
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.report = None;
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// The selected boid, if it still belongs to the flock's live generation.
    pub fn selected<'a>(&self, flock: &'a Flock) -> Option<&'a Boid> {
        let selection = self.selection?;
        if selection.generation != flock.generation() {
            return None;
        }
        flock.find(selection.id)
    }

    /// Refreshes the report from the flock, dropping a selection that went
    /// stale with a re-seed.
    pub fn watch(&mut self, flock: &Flock) {
        if self.selection.is_none() {
            return;
        }

        match self.selected(flock).map(BoidReport::from) {
            Some(report) => self.report = Some(report),
            None => {
                debug!("selected boid no longer exists");
                self.clear();
            }
        }
    }

    pub fn report(&self) -> Option<&BoidReport> {
        self.report.as_ref()
    }
}
