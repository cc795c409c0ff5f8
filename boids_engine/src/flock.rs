use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::boid::Boid;
use crate::options::{SimulationSettings, Viewport};

/// The live population together with the random source used to seed it.
///
/// Each call to [`Flock::restart`] starts a new generation: ids run from 1
/// again, so anything holding an id from an older generation has to compare
/// generations before trusting it.
pub struct Flock {
    boids: Vec<Boid>,
    rng: Xoshiro256PlusPlus,
    generation: u64,
}

impl Flock {
    pub fn new(settings: &SimulationSettings, viewport: &Viewport, seed: u64) -> Self {
        let mut flock = Flock {
            boids: Vec::new(),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            generation: 0,
        };
        flock.restart(settings, viewport);
        flock
    }

    /// Wraps an existing population, mostly useful for hand-placed scenarios.
    pub fn from_boids(boids: Vec<Boid>, seed: u64) -> Self {
        Flock {
            boids,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            generation: 1,
        }
    }

    pub fn view(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advances every boid by one tick.
    ///
    /// Rules run per boid, in population order, and write straight back into
    /// the population: a boid later in the order already sees the moved
    /// positions and steered velocities of the ones before it. Within one boid
    /// the order is cohesion, separation, alignment, speed limit, bounds, then
    /// integration and the trail.
    pub fn update(&mut self, settings: &SimulationSettings, viewport: &Viewport) {
        for i in 0..self.boids.len() {
            let cohesion = self.boids[i].cohesion(&self.boids, settings, viewport);
            self.boids[i].velocity += cohesion;

            let separation = self.boids[i].separation(&self.boids, settings, viewport);
            self.boids[i].velocity += separation;

            let alignment = self.boids[i].alignment(&self.boids, settings, viewport);
            self.boids[i].velocity += alignment;

            let boid = &mut self.boids[i];
            boid.limit_speed(settings);
            boid.keep_within_bounds(settings, viewport);
            boid.update_location();
        }
    }

    /// Throws the current population away and seeds a new generation.
    pub fn restart(&mut self, settings: &SimulationSettings, viewport: &Viewport) {
        self.generation += 1;
        self.boids = (1..=settings.num_boids)
            .map(|id| self.seed_boid(settings, viewport, id))
            .collect();

        debug!(
            generation = self.generation,
            boids = self.boids.len(),
            width = viewport.width,
            height = viewport.height,
            "seeded flock"
        );
    }

    fn seed_boid(&mut self, settings: &SimulationSettings, viewport: &Viewport, id: usize) -> Boid {
        let speed = if settings.constant_speed {
            settings.constant_speed_value
        } else {
            let range = settings.speed_limit - settings.min_speed_limit;
            settings.min_speed_limit + self.rng.gen::<f32>() * range
        };
        let angle = self.rng.gen::<f32>() * TAU;
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;

        // x in [0, width), y in [0, height)
        let x = self.rng.gen::<f32>() * viewport.width;
        let y = self.rng.gen::<f32>() * viewport.height;

        Boid::new(x, y, velocity, id)
    }

    pub fn find(&self, id: usize) -> Option<&Boid> {
        self.boids.iter().find(|b| b.id == id)
    }

    /// First boid, in population order, whose triangle contains `point`.
    pub fn hit_test(&self, point: Vec2, scale: f32) -> Option<&Boid> {
        self.boids.iter().find(|b| b.contains_point(point, scale))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::rstest;

    use crate::{
        boid::Boid,
        flock::Flock,
        options::{SimulationSettings, Viewport},
        TRAIL_CAPACITY,
    };

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    fn viewport() -> Viewport {
        Viewport::new(800., 600.)
    }

    #[test]
    fn seeding_assigns_sequential_ids() {
        let settings = SimulationSettings {
            num_boids: 42,
            ..Default::default()
        };
        let flock = Flock::new(&settings, &viewport(), 7);

        let ids: Vec<usize> = flock.view().iter().map(|b| b.id).collect();
        assert_eq!(ids, (1..=42).collect::<Vec<_>>());
        assert_eq!(flock.generation(), 1);
    }

    #[test]
    fn restart_starts_a_new_generation() {
        let settings = SimulationSettings::default();
        let mut flock = Flock::new(&settings, &viewport(), 7);
        let smaller = SimulationSettings {
            num_boids: 3,
            ..Default::default()
        };

        flock.restart(&smaller, &viewport());

        assert_eq!(flock.generation(), 2);
        assert_eq!(flock.len(), 3);
        assert!(flock.find(50).is_none());
        assert!(flock.view().iter().all(|b| b.trail_len() == 0));
    }

    #[test]
    fn seeded_boids_start_inside_the_viewport_within_speed_bounds() {
        let settings = SimulationSettings::default();
        let flock = Flock::new(&settings, &viewport(), 11);

        for b in flock.view() {
            assert!(b.position.x >= 0. && b.position.x < 800.);
            assert!(b.position.y >= 0. && b.position.y < 600.);
            assert!(b.speed() >= 5. - 1e-3 && b.speed() <= 15. + 1e-3);
        }
    }

    #[test]
    fn constant_mode_seeds_the_unscaled_constant_speed() {
        let settings = SimulationSettings {
            constant_speed: true,
            scale: 2.,
            ..Default::default()
        };
        let flock = Flock::new(&settings, &viewport(), 3);

        for b in flock.view() {
            assert_eqf32!(b.speed(), 10.);
        }
    }

    #[test]
    fn same_seed_same_flight() {
        let settings = SimulationSettings::default();
        let mut a = Flock::new(&settings, &viewport(), 1234);
        let mut b = Flock::new(&settings, &viewport(), 1234);

        for _ in 0..20 {
            a.update(&settings, &viewport());
            b.update(&settings, &viewport());
        }

        for (x, y) in a.view().iter().zip(b.view()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.velocity, y.velocity);
        }
    }

    #[test]
    fn empty_flock_update_is_a_no_op() {
        let settings = SimulationSettings {
            num_boids: 0,
            ..Default::default()
        };
        let mut flock = Flock::new(&settings, &viewport(), 0);
        flock.update(&settings, &viewport());
        assert!(flock.is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(TRAIL_CAPACITY)]
    #[case(TRAIL_CAPACITY + 17)]
    fn trail_length_follows_ticks(#[case] ticks: usize) {
        let settings = SimulationSettings {
            num_boids: 10,
            ..Default::default()
        };
        let mut flock = Flock::new(&settings, &viewport(), 5);
        for _ in 0..ticks {
            flock.update(&settings, &viewport());
        }

        for b in flock.view() {
            assert_eq!(b.trail_len(), ticks.min(TRAIL_CAPACITY));
        }
    }

    #[test]
    fn variable_speed_stays_in_bounds_with_wraparound() {
        let settings = SimulationSettings {
            wraparound_mode: true,
            ..Default::default()
        };
        let mut flock = Flock::new(&settings, &viewport(), 99);

        for _ in 0..30 {
            flock.update(&settings, &viewport());
            for b in flock.view() {
                let speed = b.speed();
                assert!(speed == 0. || (speed >= 5. - 1e-3 && speed <= 15. + 1e-3));
            }
        }
    }

    #[test]
    fn constant_speed_holds_every_tick() {
        let settings = SimulationSettings {
            wraparound_mode: true,
            constant_speed: true,
            ..Default::default()
        };
        let mut flock = Flock::new(&settings, &viewport(), 21);

        for _ in 0..10 {
            flock.update(&settings, &viewport());
            for b in flock.view() {
                assert_eqf32!(b.speed(), 10.);
            }
        }
    }

    #[test]
    fn two_boids_cohere_towards_the_live_midpoint() {
        let settings = SimulationSettings {
            visual_range: 200.,
            centering_factor: 0.01,
            avoid_factor: 0.,
            matching_factor: 0.,
            min_speed_limit: 0.,
            ..Default::default()
        };
        let mut flock = Flock::from_boids(
            vec![
                Boid::new(300., 300., Vec2::ZERO, 1),
                Boid::new(400., 300., Vec2::ZERO, 2),
            ],
            0,
        );

        flock.update(&settings, &viewport());

        // first boid: midpoint (350, 300) of the untouched population
        let first = &flock.view()[0];
        assert_eqf32!(first.velocity.x, 0.5);
        assert_eqf32!(first.velocity.y, 0.);
        assert_eqf32!(first.position.x, 300.5);

        // second boid already sees the first one moved to 300.5
        let second = &flock.view()[1];
        assert_eqf32!(second.velocity.x, (350.25 - 400.) * 0.01);
        assert_eqf32!(second.velocity.y, 0.);
    }

    #[rstest]
    #[case(1.)]
    #[case(0.5)]
    #[case(2.)]
    fn lone_boid_in_left_margin_turns_right(#[case] scale: f32) {
        let settings = SimulationSettings {
            scale,
            ..Default::default()
        };
        let mut flock = Flock::from_boids(vec![Boid::new(10., 300., Vec2::ZERO, 1)], 0);

        flock.update(&settings, &viewport());

        let boid = &flock.view()[0];
        assert_eqf32!(boid.velocity.x, 1. / scale);
        assert_eqf32!(boid.velocity.y, 0.);
    }

    #[test]
    fn hit_test_takes_the_first_match() {
        let mut flock = Flock::from_boids(
            vec![
                Boid::new(100., 100., Vec2::new(1., 0.), 1),
                Boid::new(100., 100., Vec2::new(1., 0.), 2),
                Boid::new(500., 500., Vec2::new(1., 0.), 3),
            ],
            0,
        );

        assert_eq!(flock.hit_test(Vec2::new(100., 100.), 1.).map(|b| b.id), Some(1));
        assert_eq!(flock.hit_test(Vec2::new(495., 500.), 1.).map(|b| b.id), Some(3));
        assert!(flock.hit_test(Vec2::new(300., 300.), 1.).is_none());

        flock.restart(
            &SimulationSettings {
                num_boids: 0,
                ..Default::default()
            },
            &viewport(),
        );
        assert!(flock.hit_test(Vec2::new(100., 100.), 1.).is_none());
    }
}
