/// Collider shapes and pairwise penetration queries.
///
/// Everything here is a pure function of its inputs. The collision pass calls
/// [`penetration`] for each candidate pair found through the spatial hash.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;

/// Normal used when two shapes share a center and no direction can be derived.
pub const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Distances below this are treated as coincident centers.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Primitive collider shape, positioned by the owning entity's transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Reflect)]
pub enum ColliderShape {
    Circle { radius: f32 },
    /// Axis-aligned box described by half its width and height.
    Box { half_extents: Vec2 },
}

impl ColliderShape {
    pub fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }

    /// Box from its full width and height.
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Box { half_extents: Vec2::new(width, height) * 0.5 }
    }

    /// Half-size of the axis-aligned bounding box.
    pub fn extent(&self) -> Vec2 {
        match *self {
            Self::Circle { radius } => Vec2::splat(radius),
            Self::Box { half_extents } => half_extents,
        }
    }

    pub fn contains_point(&self, center: Vec2, point: Vec2) -> bool {
        let d = point - center;
        match *self {
            Self::Circle { radius } => d.length_squared() <= radius * radius,
            Self::Box { half_extents } => d.x.abs() <= half_extents.x && d.y.abs() <= half_extents.y,
        }
    }
}

/// Overlap between two shapes.
///
/// `normal` is unit length and points from the second shape toward the first,
/// so moving the first shape by `vector` separates the pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    pub vector: Vec2,
    pub normal: Vec2,
    pub depth: f32,
}

impl Penetration {
    pub fn new(normal: Vec2, depth: f32) -> Self {
        Self { vector: normal * depth, normal, depth }
    }

    /// Same overlap seen from the other shape.
    pub fn flipped(self) -> Self {
        Self { vector: -self.vector, normal: -self.normal, depth: self.depth }
    }
}

/// Penetration of `a` (at `pos_a`) into `b` (at `pos_b`), or `None` when the
/// shapes are separated or exactly touching.
pub fn penetration(a: &ColliderShape, pos_a: Vec2, b: &ColliderShape, pos_b: Vec2) -> Option<Penetration> {
    use ColliderShape::*;

    match (*a, *b) {
        (Circle { radius: ra }, Circle { radius: rb }) => circle_circle(pos_a, ra, pos_b, rb),
        (Circle { radius }, Box { half_extents }) => circle_box(pos_a, radius, pos_b, half_extents),
        (Box { half_extents }, Circle { radius }) => {
            circle_box(pos_b, radius, pos_a, half_extents).map(Penetration::flipped)
        }
        (Box { half_extents: ha }, Box { half_extents: hb }) => box_box(pos_a, ha, pos_b, hb),
    }
}

fn circle_circle(pos_a: Vec2, ra: f32, pos_b: Vec2, rb: f32) -> Option<Penetration> {
    let offset = pos_a - pos_b;
    let distance = offset.length();
    let depth = ra + rb - distance;
    if depth <= 0.0 {
        return None;
    }

    let normal = if distance > DEGENERATE_EPSILON {
        offset / distance
    } else {
        debug!("[GEOMETRY] Coincident circles at {:?}, using fallback normal", pos_a);
        FALLBACK_NORMAL
    };
    Some(Penetration::new(normal, depth))
}

fn circle_box(center: Vec2, radius: f32, box_pos: Vec2, half: Vec2) -> Option<Penetration> {
    let closest = center.clamp(box_pos - half, box_pos + half);
    let offset = center - closest;
    let distance = offset.length();

    if distance > DEGENERATE_EPSILON {
        let depth = radius - distance;
        return (depth > 0.0).then(|| Penetration::new(offset / distance, depth));
    }

    // Center on or inside the box: push out along the box-center -> circle-center line.
    let from_box = center - box_pos;
    let reach = from_box.length();
    let normal = if reach > DEGENERATE_EPSILON {
        from_box / reach
    } else {
        debug!("[GEOMETRY] Circle centered on box at {:?}, using fallback normal", box_pos);
        FALLBACK_NORMAL
    };

    // Distance from the box center to its boundary along the normal.
    let to_face_x = if normal.x.abs() > DEGENERATE_EPSILON { half.x / normal.x.abs() } else { f32::INFINITY };
    let to_face_y = if normal.y.abs() > DEGENERATE_EPSILON { half.y / normal.y.abs() } else { f32::INFINITY };
    let boundary = to_face_x.min(to_face_y);

    Some(Penetration::new(normal, boundary - reach + radius))
}

fn box_box(pos_a: Vec2, ha: Vec2, pos_b: Vec2, hb: Vec2) -> Option<Penetration> {
    let offset = pos_a - pos_b;
    let overlap_x = ha.x + hb.x - offset.x.abs();
    let overlap_y = ha.y + hb.y - offset.y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    // Shallow axis wins; aligned centers resolve toward positive.
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    if overlap_x < overlap_y {
        Some(Penetration::new(Vec2::new(sign(offset.x), 0.0), overlap_x))
    } else {
        Some(Penetration::new(Vec2::new(0.0, sign(offset.y)), overlap_y))
    }
}
