use boids_engine::{color::Rgba, options::Viewport, render::Surface};
use glam::Mat3;
use nannou::prelude::*;

enum Shape {
    Path(Vec<Vec2>),
    Circle { center: Vec2, radius: f32 },
    Rect { origin: Vec2, size: Vec2 },
}

/// Canvas style drawing on top of a nannou [`Draw`].
///
/// Points arrive in canvas coordinates (top-left origin, y down) and are
/// mapped to nannou's centred, y-up frame only when painted.
pub struct NannouSurface<'a> {
    draw: &'a Draw,
    viewport: Viewport,
    transform: Mat3,
    shapes: Vec<Shape>,
}

impl<'a> NannouSurface<'a> {
    pub fn new(draw: &'a Draw, viewport: Viewport) -> Self {
        NannouSurface {
            draw,
            viewport,
            transform: Mat3::IDENTITY,
            shapes: Vec::new(),
        }
    }

    fn to_nannou(&self, p: Vec2) -> Vec2 {
        vec2(p.x - self.viewport.width / 2., self.viewport.height / 2. - p.y)
    }

    fn apply(&self, p: Vec2) -> Vec2 {
        self.transform.transform_point2(p)
    }
}

/// Inverse of the surface mapping: a point in nannou's window frame to canvas
/// coordinates.
pub fn canvas_point(viewport: &Viewport, window_point: Vec2) -> Vec2 {
    vec2(window_point.x + viewport.width / 2., viewport.height / 2. - window_point.y)
}

/// Splits a polyline into the visible pieces of an `[on, off]` dash pattern.
fn dash_segments(points: &[Vec2], [on, off]: [f32; 2]) -> Vec<(Vec2, Vec2)> {
    let mut segments = Vec::new();
    if on <= 0. {
        return segments;
    }

    let period = on + off.max(0.);
    // distance travelled into the current period
    let mut phase = 0.;

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = start.distance(end);
        if length == 0. {
            continue;
        }
        let dir = (end - start) / length;
        let mut travelled = 0.;

        while travelled < length {
            let step = if phase < on { on - phase } else { period - phase };
            let step = step.min(length - travelled);

            if phase < on {
                segments.push((start + dir * travelled, start + dir * (travelled + step)));
            }

            travelled += step;
            phase = (phase + step) % period;
        }
    }

    segments
}

impl<'a> Surface for NannouSurface<'a> {
    fn clear(&mut self, _: &Viewport) {
        self.draw.background().color(WHITE);
    }

    fn begin_path(&mut self) {
        self.shapes.clear();
    }

    fn move_to(&mut self, point: Vec2) {
        let p = self.apply(point);
        self.shapes.push(Shape::Path(vec![p]));
    }

    fn line_to(&mut self, point: Vec2) {
        let p = self.apply(point);
        match self.shapes.last_mut() {
            Some(Shape::Path(points)) => points.push(p),
            _ => self.shapes.push(Shape::Path(vec![p])),
        }
    }

    fn arc(&mut self, center: Vec2, radius: f32) {
        let center = self.apply(center);
        self.shapes.push(Shape::Circle { center, radius });
    }

    fn rect(&mut self, origin: Vec2, size: Vec2) {
        let origin = self.apply(origin);
        self.shapes.push(Shape::Rect { origin, size });
    }

    fn fill(&mut self, color: Rgba) {
        let [r, g, b, a] = color.to_f32_array();
        let color = rgba(r, g, b, a);

        for shape in &self.shapes {
            match shape {
                Shape::Path(points) if points.len() >= 3 => {
                    self.draw
                        .polygon()
                        .points(points.iter().map(|p| self.to_nannou(*p)))
                        .color(color);
                }
                Shape::Path(_) => {}
                Shape::Circle { center, radius } => {
                    self.draw
                        .ellipse()
                        .xy(self.to_nannou(*center))
                        .radius(*radius)
                        .color(color);
                }
                Shape::Rect { origin, size } => {
                    self.draw
                        .rect()
                        .xy(self.to_nannou(*origin + *size / 2.))
                        .wh(*size)
                        .color(color);
                }
            }
        }
    }

    fn stroke(&mut self, color: Rgba, width: f32, dash: Option<[f32; 2]>) {
        let [r, g, b, a] = color.to_f32_array();
        let color = rgba(r, g, b, a);

        for shape in &self.shapes {
            match shape {
                Shape::Path(points) if points.len() >= 2 => match dash {
                    Some(pattern) => {
                        for (start, end) in dash_segments(points, pattern) {
                            self.draw
                                .line()
                                .start(self.to_nannou(start))
                                .end(self.to_nannou(end))
                                .weight(width)
                                .color(color);
                        }
                    }
                    None => {
                        self.draw
                            .polyline()
                            .weight(width)
                            .points(points.iter().map(|p| self.to_nannou(*p)))
                            .color(color);
                    }
                },
                Shape::Path(_) => {}
                Shape::Circle { center, radius } => {
                    self.draw
                        .ellipse()
                        .xy(self.to_nannou(*center))
                        .radius(*radius)
                        .no_fill()
                        .stroke(color)
                        .stroke_weight(width);
                }
                Shape::Rect { origin, size } => {
                    self.draw
                        .rect()
                        .xy(self.to_nannou(*origin + *size / 2.))
                        .wh(*size)
                        .no_fill()
                        .stroke(color)
                        .stroke_weight(width);
                }
            }
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Mat3::from_translation(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Mat3::from_angle(angle);
    }

    fn reset_transform(&mut self) {
        self.transform = Mat3::IDENTITY;
    }
}
