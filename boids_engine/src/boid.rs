use std::fmt::Debug;

use circular_queue::CircularQueue;
use glam::f32::Vec2;

use crate::{
    math_helpers::{distance, heading, in_local_triangle, rotate},
    options::{SimulationSettings, Viewport},
    BOID_HALF_WIDTH, BOID_LENGTH, TRAIL_CAPACITY,
};

#[derive(Debug, Clone)]
pub struct Boid {
    // sequential id starting from 1, unique within a generation
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    trail: CircularQueue<Vec2>,
}

impl Boid {
    /// Creates a new [`Boid`] with an empty trail.
    pub fn new(x: f32, y: f32, velocity: Vec2, id: usize) -> Self {
        Boid {
            id,
            position: Vec2::new(x, y),
            velocity,
            trail: CircularQueue::with_capacity(TRAIL_CAPACITY),
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Heading in radians, `atan2(dy, dx)`.
    pub fn heading(&self) -> f32 {
        heading(self.velocity)
    }

    /// Past positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &Vec2> {
        self.trail.asc_iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Steers towards the centre of mass of every boid within the visual
    /// range. The boid itself is part of the average.
    pub fn cohesion(&self, others: &[Boid], settings: &SimulationSettings, viewport: &Viewport) -> Vec2 {
        let range = settings.scaled_visual_range();
        let mut center = Vec2::ZERO;
        let mut count = 0;

        for other in others {
            if distance(self.position, other.position, settings.wraparound_mode, viewport) < range {
                center += other.position;
                count += 1;
            }
        }

        if count > 0 {
            center /= count as f32;
            (center - self.position) * settings.centering_factor
        } else {
            Vec2::ZERO
        }
    }

    /// Moves away from every other boid closer than the minimum distance,
    /// proportionally to how close they are. Not normalised per neighbour.
    pub fn separation(&self, others: &[Boid], settings: &SimulationSettings, viewport: &Viewport) -> Vec2 {
        let min_distance = settings.scaled_min_distance();
        let mut res = Vec2::ZERO;

        for other in others {
            if other.id == self.id {
                continue;
            }

            if distance(self.position, other.position, settings.wraparound_mode, viewport) < min_distance {
                res += self.position - other.position;
            }
        }

        res * settings.avoid_factor
    }

    /// Matches the average velocity of every boid within the visual range,
    /// the boid's own current velocity included.
    pub fn alignment(&self, others: &[Boid], settings: &SimulationSettings, viewport: &Viewport) -> Vec2 {
        let range = settings.scaled_visual_range();
        let mut avg = Vec2::ZERO;
        let mut count = 0;

        for other in others {
            if distance(self.position, other.position, settings.wraparound_mode, viewport) < range {
                avg += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            avg /= count as f32;
            (avg - self.velocity) * settings.matching_factor
        } else {
            Vec2::ZERO
        }
    }

    pub fn limit_speed(&mut self, settings: &SimulationSettings) {
        let speed = self.speed();

        if settings.constant_speed {
            let constant = settings.scaled_constant_speed();
            self.velocity = if speed > 0. {
                self.velocity / speed * constant
            } else {
                // a stationary boid has no heading to keep, send it along +x
                Vec2::new(constant, 0.)
            };
            return;
        }

        let max_speed = settings.scaled_max_speed();
        let min_speed = settings.scaled_min_speed();

        if speed > max_speed {
            self.velocity = self.velocity / speed * max_speed;
        } else if speed > 0. && speed < min_speed {
            self.velocity = self.velocity / speed * min_speed;
        }
    }

    /// Wraps the position around the edges, or nudges the velocity back
    /// towards the inside when the boid is within the margins.
    pub fn keep_within_bounds(&mut self, settings: &SimulationSettings, viewport: &Viewport) {
        if settings.wraparound_mode {
            if self.position.x < 0. {
                self.position.x = viewport.width;
            }
            if self.position.x > viewport.width {
                self.position.x = 0.;
            }
            if self.position.y < 0. {
                self.position.y = viewport.height;
            }
            if self.position.y > viewport.height {
                self.position.y = 0.;
            }
        } else {
            let (margin_x, margin_y) = viewport.margins(settings.margin_fraction);
            let turn = settings.scaled_turn_factor();

            if self.position.x < margin_x {
                self.velocity.x += turn;
            }
            if self.position.x > viewport.width - margin_x {
                self.velocity.x -= turn;
            }
            if self.position.y < margin_y {
                self.velocity.y += turn;
            }
            if self.position.y > viewport.height - margin_y {
                self.velocity.y -= turn;
            }
        }
    }

    // Actually shifts the individual's location
    pub fn update_location(&mut self) {
        self.position += self.velocity;
        self.trail.push(self.position);
    }

    /// Whether `point` lies inside the triangle this boid is drawn as.
    pub fn contains_point(&self, point: Vec2, scale: f32) -> bool {
        let local = rotate(point - self.position, -self.heading());
        in_local_triangle(local, BOID_LENGTH * scale, BOID_HALF_WIDTH * scale)
    }
}
