use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{ColorError, HexColor};

/// Smallest scale the engine will work with, anything non-positive is clamped to it.
pub const MIN_SCALE: f32 = 0.2;

/// Upper bound of the speed sliders, also the ceiling used when pushing
/// `speed_limit` above `min_speed_limit`.
pub const MAX_SPEED_SETTING: f32 = 30.;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    // population
    pub num_boids: usize,
    pub scale: f32,

    // appearance, no effect on the physics
    pub boid_color: HexColor,
    pub trail_color: HexColor,
    pub draw_trail: bool,

    // movement
    pub speed_limit: f32,
    pub min_speed_limit: f32,
    pub constant_speed: bool,
    pub constant_speed_value: f32,
    pub wraparound_mode: bool,

    // flocking
    /// perception range
    pub visual_range: f32,
    /// cohesion strength
    pub centering_factor: f32,
    /// separation distance threshold
    pub min_distance: f32,
    /// separation strength
    pub avoid_factor: f32,
    /// alignment strength
    pub matching_factor: f32,

    // boundary, ignored in wraparound mode
    pub margin_fraction: f32,
    pub turn_factor: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let default_color = HexColor::new(0x55, 0x8c, 0xf4);

        SimulationSettings {
            num_boids: 100,
            scale: 1.0,
            boid_color: default_color,
            trail_color: default_color,
            draw_trail: false,
            speed_limit: 15.,
            min_speed_limit: 5.,
            constant_speed: false,
            constant_speed_value: 10.,
            wraparound_mode: false,
            visual_range: 75.,
            centering_factor: 0.005,
            min_distance: 20.,
            avoid_factor: 0.05,
            matching_factor: 0.05,
            margin_fraction: 0.1,
            turn_factor: 1.,
        }
    }
}

impl SimulationSettings {
    /// Scale factor safe to divide by and take the root of.
    pub fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0. {
            self.scale
        } else {
            MIN_SCALE
        }
    }

    pub fn scaled_visual_range(&self) -> f32 {
        self.visual_range * self.effective_scale()
    }

    pub fn scaled_min_distance(&self) -> f32 {
        self.min_distance * self.effective_scale()
    }

    pub fn scaled_max_speed(&self) -> f32 {
        self.speed_limit * self.effective_scale().sqrt()
    }

    pub fn scaled_min_speed(&self) -> f32 {
        self.min_speed_limit * self.effective_scale().sqrt()
    }

    pub fn scaled_constant_speed(&self) -> f32 {
        self.constant_speed_value * self.effective_scale().sqrt()
    }

    pub fn scaled_turn_factor(&self) -> f32 {
        self.turn_factor / self.effective_scale()
    }

    /// Returns the settings with a single field patched, plus whether the
    /// change requires the population to be re-seeded.
    ///
    /// The speed pair is kept ordered here, on the producing side:
    /// `min_speed_limit < speed_limit` holds for every snapshot handed out.
    pub fn apply(&self, update: SettingsUpdate) -> Result<(SimulationSettings, Reseed), SettingsError> {
        let mut next = self.clone();
        let mut reseed = Reseed::No;

        match update {
            SettingsUpdate::NumBoids(n) => {
                next.num_boids = n;
                reseed = Reseed::Yes;
            }
            SettingsUpdate::Scale(scale) => {
                if !scale.is_finite() || scale <= 0. {
                    return Err(SettingsError::OutOfRange("scale", scale));
                }
                next.scale = scale;
            }
            SettingsUpdate::BoidColor(hex) => next.boid_color = hex.parse()?,
            SettingsUpdate::TrailColor(hex) => next.trail_color = hex.parse()?,
            SettingsUpdate::DrawTrail(on) => next.draw_trail = on,
            SettingsUpdate::SpeedLimit(limit) => {
                next.speed_limit = limit;
                if next.speed_limit <= next.min_speed_limit {
                    next.speed_limit = MAX_SPEED_SETTING.min(next.min_speed_limit + 1.);
                }
            }
            SettingsUpdate::MinSpeedLimit(limit) => {
                next.min_speed_limit = limit;
                if next.min_speed_limit >= next.speed_limit {
                    next.min_speed_limit = 1_f32.max(next.speed_limit - 1.);
                }
            }
            SettingsUpdate::ConstantSpeed(on) => {
                next.constant_speed = on;
                reseed = Reseed::Yes;
            }
            SettingsUpdate::ConstantSpeedValue(value) => next.constant_speed_value = value,
            SettingsUpdate::WraparoundMode(on) => next.wraparound_mode = on,
            SettingsUpdate::VisualRange(range) => next.visual_range = range,
            SettingsUpdate::CenteringFactor(factor) => next.centering_factor = factor,
            SettingsUpdate::MinDistance(distance) => next.min_distance = distance,
            SettingsUpdate::AvoidFactor(factor) => next.avoid_factor = factor,
            SettingsUpdate::MatchingFactor(factor) => next.matching_factor = factor,
            SettingsUpdate::MarginFraction(fraction) => next.margin_fraction = fraction,
            SettingsUpdate::TurnFactor(factor) => next.turn_factor = factor,
        }

        Ok((next, reseed))
    }

    // slider ranges offered by settings panels

    pub fn num_boids_range() -> RangeInclusive<usize> {
        1..=500
    }

    pub fn scale_range() -> RangeInclusive<f32> {
        MIN_SCALE..=2.0
    }

    pub fn speed_range() -> RangeInclusive<f32> {
        1.0..=MAX_SPEED_SETTING
    }

    pub fn visual_range_range() -> RangeInclusive<f32> {
        10.0..=200.0
    }

    pub fn centering_factor_range() -> RangeInclusive<f32> {
        0.0001..=0.01
    }

    pub fn min_distance_range() -> RangeInclusive<f32> {
        5.0..=50.0
    }

    pub fn steering_factor_range() -> RangeInclusive<f32> {
        0.001..=0.1
    }

    pub fn margin_fraction_range() -> RangeInclusive<f32> {
        0.01..=0.3
    }

    pub fn turn_factor_range() -> RangeInclusive<f32> {
        0.1..=5.0
    }
}

/// A single-field patch as produced by a settings panel.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    NumBoids(usize),
    Scale(f32),
    BoidColor(String),
    TrailColor(String),
    DrawTrail(bool),
    SpeedLimit(f32),
    MinSpeedLimit(f32),
    ConstantSpeed(bool),
    ConstantSpeedValue(f32),
    WraparoundMode(bool),
    VisualRange(f32),
    CenteringFactor(f32),
    MinDistance(f32),
    AvoidFactor(f32),
    MatchingFactor(f32),
    MarginFraction(f32),
    TurnFactor(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reseed {
    Yes,
    No,
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("invalid colour: {0}")]
    Color(#[from] ColorError),
    #[error("{0} out of range: {1}")]
    OutOfRange(&'static str, f32),
}

/// Drawable area in device pixels, origin at the top-left corner, y pointing down.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Viewport {
        Viewport {
            width: width.max(0.),
            height: height.max(0.),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2., self.height / 2.)
    }

    /// Horizontal and vertical widths of the turn-away margin bands.
    pub fn margins(&self, margin_fraction: f32) -> (f32, f32) {
        (self.width * margin_fraction, self.height * margin_fraction)
    }
}

/// Debug overlays, each switched on while its slider is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayFlags {
    /// perception range circle around each boid
    pub visual_range: bool,
    /// separation distance circle around each boid
    pub min_distance: bool,
    /// margin bands, bounded mode only
    pub margins: bool,
    /// dashed center crosshair, wraparound mode only
    pub center_grid: bool,
}

impl Default for OverlayFlags {
    fn default() -> Self {
        OverlayFlags {
            visual_range: false,
            min_distance: false,
            margins: false,
            center_grid: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::{Reseed, SettingsError, SettingsUpdate, SimulationSettings, Viewport, MIN_SCALE};
    use crate::color::HexColor;

    #[test]
    fn defaults_match_the_documented_values() {
        let s = SimulationSettings::default();
        assert_eq!(s.num_boids, 100);
        assert_eq!(s.boid_color, HexColor::new(0x55, 0x8c, 0xf4));
        assert_eq!((s.min_speed_limit, s.speed_limit), (5., 15.));
        assert!(!s.constant_speed && !s.wraparound_mode && !s.draw_trail);
    }

    #[rstest]
    #[case(SettingsUpdate::NumBoids(20), Reseed::Yes)]
    #[case(SettingsUpdate::ConstantSpeed(true), Reseed::Yes)]
    #[case(SettingsUpdate::VisualRange(120.), Reseed::No)]
    #[case(SettingsUpdate::WraparoundMode(true), Reseed::No)]
    #[case(SettingsUpdate::SpeedLimit(20.), Reseed::No)]
    #[case(SettingsUpdate::BoidColor("#ff0000".to_owned()), Reseed::No)]
    fn only_population_and_speed_mode_reseed(#[case] update: SettingsUpdate, #[case] expected: Reseed) {
        let (_, reseed) = SimulationSettings::default().apply(update).unwrap();
        assert_eq!(reseed, expected);
    }

    #[test]
    fn apply_leaves_the_previous_snapshot_untouched() {
        let previous = SimulationSettings::default();
        let (next, _) = previous.apply(SettingsUpdate::TurnFactor(3.)).unwrap();
        assert_eq!(previous.turn_factor, 1.);
        assert_eq!(next.turn_factor, 3.);
    }

    #[test]
    fn min_speed_is_pushed_below_max() {
        let (next, _) = SimulationSettings::default()
            .apply(SettingsUpdate::MinSpeedLimit(15.))
            .unwrap();
        assert_eq!(next.min_speed_limit, 14.);
        assert_eq!(next.speed_limit, 15.);
    }

    #[test]
    fn max_speed_is_pushed_above_min() {
        let (next, _) = SimulationSettings::default()
            .apply(SettingsUpdate::SpeedLimit(3.))
            .unwrap();
        assert_eq!(next.speed_limit, 6.);

        let settings = SimulationSettings {
            min_speed_limit: 30.,
            speed_limit: 31.,
            ..Default::default()
        };
        let (next, _) = settings.apply(SettingsUpdate::SpeedLimit(2.)).unwrap();
        assert_eq!(next.speed_limit, 30.);
    }

    #[test]
    fn min_speed_never_drops_below_one() {
        let settings = SimulationSettings {
            min_speed_limit: 1.,
            speed_limit: 1.5,
            ..Default::default()
        };
        let (next, _) = settings.apply(SettingsUpdate::MinSpeedLimit(4.)).unwrap();
        assert_eq!(next.min_speed_limit, 1.);
    }

    #[test]
    fn bad_color_is_rejected() {
        let res = SimulationSettings::default().apply(SettingsUpdate::TrailColor("blue".to_owned()));
        assert!(matches!(res, Err(SettingsError::Color(_))));
    }

    #[test]
    fn non_positive_scale_patch_is_rejected() {
        let res = SimulationSettings::default().apply(SettingsUpdate::Scale(0.));
        assert_eq!(res, Err(SettingsError::OutOfRange("scale", 0.)));
    }

    #[test]
    fn degenerate_scale_is_clamped_when_used() {
        let settings = SimulationSettings {
            scale: -1.,
            ..Default::default()
        };
        assert_eq!(settings.effective_scale(), MIN_SCALE);
        assert_relative_eq!(settings.scaled_turn_factor(), 5., epsilon = 1e-5);
        assert!(settings.scaled_max_speed().is_finite());
    }

    #[test]
    fn scaled_thresholds() {
        let settings = SimulationSettings {
            scale: 4.,
            ..Default::default()
        };
        assert_eq!(settings.scaled_visual_range(), 300.);
        assert_eq!(settings.scaled_min_distance(), 80.);
        assert_eq!(settings.scaled_max_speed(), 30.);
        assert_eq!(settings.scaled_min_speed(), 10.);
        assert_eq!(settings.scaled_constant_speed(), 20.);
        assert_eq!(settings.scaled_turn_factor(), 0.25);
    }

    #[test]
    fn partial_documents_fill_from_defaults() {
        let settings: SimulationSettings =
            serde_json::from_str(r##"{"num_boids": 12, "boid_color": "#000000"}"##).unwrap();
        assert_eq!(settings.num_boids, 12);
        assert_eq!(settings.boid_color, HexColor::new(0, 0, 0));
        assert_eq!(settings.visual_range, 75.);
    }

    #[test]
    fn viewport_margins() {
        let viewport = Viewport::new(800., 600.);
        assert_eq!(viewport.margins(0.1), (80., 60.));
        assert_eq!(viewport.center(), (400., 300.));
        assert_eq!(Viewport::new(-5., 10.).width, 0.);
    }
}
