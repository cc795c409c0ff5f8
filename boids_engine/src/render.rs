use glam::Vec2;

use crate::{
    boid::Boid,
    color::Rgba,
    flock::Flock,
    options::{OverlayFlags, SimulationSettings, Viewport},
    BOID_HALF_WIDTH, BOID_LENGTH, GHOST_EDGE_THRESHOLD,
};

const GHOST_ALPHA: f32 = 0.3;
const TRAIL_ALPHA: f32 = 0.4;
const VISUAL_RANGE_ALPHA: f32 = 0.1;
const MIN_DISTANCE_ALPHA: f32 = 0.2;
const MARGIN_FILL_ALPHA: f32 = 0.1;
const MARGIN_STROKE_ALPHA: f32 = 0.3;
const GRID_ALPHA: f32 = 0.1;
const GRID_DASH: [f32; 2] = [5., 5.];

/// A 2D vector drawing target in canvas coordinates: origin at the top-left
/// corner, y pointing down.
///
/// Paths are built with `begin_path` and the shape calls, then painted with
/// `fill` and/or `stroke`. The current transform applies to every point
/// handed in until `reset_transform`.
pub trait Surface {
    fn clear(&mut self, viewport: &Viewport);
    fn begin_path(&mut self);
    fn move_to(&mut self, point: Vec2);
    fn line_to(&mut self, point: Vec2);
    /// A full circle.
    fn arc(&mut self, center: Vec2, radius: f32);
    fn rect(&mut self, origin: Vec2, size: Vec2);
    fn fill(&mut self, color: Rgba);
    /// `dash` is an `[on, off]` pattern, `None` for a solid line.
    fn stroke(&mut self, color: Rgba, width: f32, dash: Option<[f32; 2]>);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn reset_transform(&mut self);
}

pub trait Drawable {
    fn draw(&self, surface: &mut dyn Surface, renderer: &Renderer);
}

/// Paints one frame of a flock, with the colours and overlays resolved once
/// up front.
pub struct Renderer<'a> {
    settings: &'a SimulationSettings,
    viewport: Viewport,
    overlays: OverlayFlags,
    scale: f32,
}

impl<'a> Renderer<'a> {
    pub fn new(settings: &'a SimulationSettings, viewport: Viewport, overlays: OverlayFlags) -> Self {
        Renderer {
            settings,
            viewport,
            overlays,
            scale: settings.effective_scale(),
        }
    }

    /// Clears the surface, draws every boid, then the margin bands and the
    /// wraparound crosshair on top.
    pub fn render_frame(&self, surface: &mut dyn Surface, flock: &Flock) {
        surface.clear(&self.viewport);
        flock.draw(surface, self);
        self.draw_margins(surface);
        self.draw_center_grid(surface);
    }

    /// The boid triangle: nose at `position`, base behind it along `heading`.
    fn draw_boid_shape(&self, surface: &mut dyn Surface, position: Vec2, heading: f32, color: Rgba) {
        let length = BOID_LENGTH * self.scale;
        let half_width = BOID_HALF_WIDTH * self.scale;

        // rotate about the nose
        surface.translate(position);
        surface.rotate(heading);
        surface.translate(-position);

        surface.begin_path();
        surface.move_to(position);
        surface.line_to(position + Vec2::new(-length, half_width));
        surface.line_to(position + Vec2::new(-length, -half_width));
        surface.line_to(position);
        surface.fill(color);

        surface.reset_transform();
    }

    /// Copies of a boid close to an edge, drawn past the opposite edge.
    /// At most one per axis.
    pub fn ghost_positions(&self, position: Vec2) -> Vec<Vec2> {
        let mut ghosts = Vec::with_capacity(2);
        let Viewport { width, height } = self.viewport;

        if position.x < GHOST_EDGE_THRESHOLD {
            ghosts.push(Vec2::new(position.x + width, position.y));
        } else if position.x > width - GHOST_EDGE_THRESHOLD {
            ghosts.push(Vec2::new(position.x - width, position.y));
        }

        if position.y < GHOST_EDGE_THRESHOLD {
            ghosts.push(Vec2::new(position.x, position.y + height));
        } else if position.y > height - GHOST_EDGE_THRESHOLD {
            ghosts.push(Vec2::new(position.x, position.y - height));
        }

        ghosts
    }

    fn draw_trail(&self, surface: &mut dyn Surface, boid: &Boid) {
        let mut trail = boid.trail().peekable();
        let start = trail.peek().copied().copied().unwrap_or(boid.position);

        surface.begin_path();
        surface.move_to(start);
        for point in trail {
            surface.line_to(*point);
        }
        surface.stroke(self.settings.trail_color.with_alpha(TRAIL_ALPHA), 1., None);
    }

    fn draw_range(&self, surface: &mut dyn Surface, center: Vec2, radius: f32, color: Rgba) {
        surface.begin_path();
        surface.arc(center, radius);
        surface.fill(color);
        surface.stroke(color, 1., None);
    }

    fn draw_margins(&self, surface: &mut dyn Surface) {
        if !self.overlays.margins || self.settings.wraparound_mode {
            return;
        }

        let Viewport { width, height } = self.viewport;
        let (margin_x, margin_y) = self.viewport.margins(self.settings.margin_fraction);
        let fill = self.settings.boid_color.with_alpha(MARGIN_FILL_ALPHA);
        let stroke = self.settings.boid_color.with_alpha(MARGIN_STROKE_ALPHA);

        let bands = [
            (Vec2::ZERO, Vec2::new(margin_x, height)),
            (Vec2::new(width - margin_x, 0.), Vec2::new(margin_x, height)),
            (Vec2::ZERO, Vec2::new(width, margin_y)),
            (Vec2::new(0., height - margin_y), Vec2::new(width, margin_y)),
        ];

        for (origin, size) in bands {
            surface.begin_path();
            surface.rect(origin, size);
            surface.fill(fill);
            surface.stroke(stroke, 1., None);
        }
    }

    fn draw_center_grid(&self, surface: &mut dyn Surface) {
        if !self.settings.wraparound_mode || !self.overlays.center_grid {
            return;
        }

        let Viewport { width, height } = self.viewport;
        let color = self.settings.boid_color.with_alpha(GRID_ALPHA);

        surface.begin_path();
        surface.move_to(Vec2::new(width / 2., 0.));
        surface.line_to(Vec2::new(width / 2., height));
        surface.stroke(color, 1., Some(GRID_DASH));

        surface.begin_path();
        surface.move_to(Vec2::new(0., height / 2.));
        surface.line_to(Vec2::new(width, height / 2.));
        surface.stroke(color, 1., Some(GRID_DASH));
    }
}

impl Drawable for Boid {
    fn draw(&self, surface: &mut dyn Surface, renderer: &Renderer) {
        let settings = renderer.settings;
        let heading = self.heading();

        renderer.draw_boid_shape(surface, self.position, heading, settings.boid_color.with_alpha(1.));

        if settings.wraparound_mode {
            let ghost_color = settings.boid_color.with_alpha(GHOST_ALPHA);
            for ghost in renderer.ghost_positions(self.position) {
                renderer.draw_boid_shape(surface, ghost, heading, ghost_color);
            }
        }

        if settings.draw_trail {
            renderer.draw_trail(surface, self);
        }

        if renderer.overlays.visual_range {
            renderer.draw_range(
                surface,
                self.position,
                settings.visual_range * renderer.scale,
                settings.boid_color.with_alpha(VISUAL_RANGE_ALPHA),
            );
        }

        if renderer.overlays.min_distance {
            renderer.draw_range(
                surface,
                self.position,
                settings.min_distance * renderer.scale,
                settings.boid_color.with_alpha(MIN_DISTANCE_ALPHA),
            );
        }
    }
}

impl Drawable for Flock {
    fn draw(&self, surface: &mut dyn Surface, renderer: &Renderer) {
        for b in self.view() {
            b.draw(surface, renderer);
        }
    }
}
