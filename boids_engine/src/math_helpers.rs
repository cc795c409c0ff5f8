use glam::Vec2;

use crate::options::Viewport;

/// Distance between two points, measured across the wrapped edges of the
/// viewport when `wraparound` is on.
pub fn distance(p1: Vec2, p2: Vec2, wraparound: bool, viewport: &Viewport) -> f32 {
    if wraparound {
        toroidal_distance(p1, p2, viewport)
    } else {
        simple_distance(p1, p2)
    }
}

pub fn simple_distance(p1: Vec2, p2: Vec2) -> f32 {
    simple_distance_sq(p1, p2).sqrt()
}

pub fn simple_distance_sq(p1: Vec2, p2: Vec2) -> f32 {
    (p1.x - p2.x).powi(2) + (p1.y - p2.y).powi(2)
}

pub fn toroidal_distance(p1: Vec2, p2: Vec2, viewport: &Viewport) -> f32 {
    tor_vec(p1, p2, viewport).length()
}

/// Produces the shortest difference vector `p1 - p2` in a toroidal space the
/// size of the viewport. Each axis is folded independently, so the sign of
/// the shortest path is kept.
pub fn tor_vec(p1: Vec2, p2: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        tor_vec_pc(p1.x, p2.x, viewport.width),
        tor_vec_pc(p1.y, p2.y, viewport.height),
    )
}

/// pc - point's component
#[inline]
pub fn tor_vec_pc(c1: f32, c2: f32, size: f32) -> f32 {
    let d = c1 - c2;
    // crossing more than half the space means the other way round is shorter
    if d.abs() > size / 2. {
        if d > 0. {
            d - size
        } else {
            d + size
        }
    } else {
        d
    }
}

/// Heading of a velocity vector in radians, `atan2(dy, dx)`.
#[inline]
pub fn heading(velocity: Vec2) -> f32 {
    velocity.y.atan2(velocity.x)
}

/// Rotates `v` by `angle` radians (counter-clockwise in a y-up frame,
/// clockwise on a y-down canvas).
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Whether a point given in a boid's local, heading aligned frame lies inside
/// the boid triangle. The nose sits at the origin and the base at
/// `x = -length`, spanning `[-half_width, half_width]`.
pub fn in_local_triangle(local: Vec2, length: f32, half_width: f32) -> bool {
    if length <= 0. {
        return false;
    }
    // the triangle widens linearly from the nose towards the base
    local.x >= -length && local.x <= 0. && local.y.abs() <= half_width * (-local.x / length)
}
