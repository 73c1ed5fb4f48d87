use glam::Vec3;
use serde::{
    Deserialize,
    Serialize,
};


/// Axis-aligned bounds handed to the draw call alongside the indirect args.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Cube centered at the origin with edge length `2 * half_extent`.
    pub fn cube(half_extent: f32) -> Self {
        let half_extent = half_extent.abs();
        Self {
            min: Vec3::splat(-half_extent),
            max: Vec3::splat(half_extent),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
