use bevy_ecs::prelude::*;
use bevy_math::Vec2;

/// Axis-aligned box anchored at an actor's feet: it spans `half_extents.x`
/// to each side and `2 * half_extents.y` upward.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub half_extents: Vec2,
}

impl Collider {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_extents: Vec2::new(half_width.max(0.0), half_height.max(0.0)),
        }
    }

    pub fn center_from_feet(&self, feet: Vec2) -> Vec2 {
        Vec2::new(feet.x, feet.y - self.half_extents.y)
    }

    pub fn aabb_at_feet(&self, feet: Vec2) -> Aabb {
        Aabb::from_center(self.center_from_feet(feet), self.half_extents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}
