use std::marker::Copy;

use bytemuck::{
    Pod,
    Zeroable,
};
use serde::{
    Deserialize,
    Serialize,
};
use static_assertions::const_assert_eq;


pub type Position = [f32; 3];
pub type Color = [f32; 4];

/// byte size of one splat in the device storage buffer
pub const SPLAT_STRIDE: usize = std::mem::size_of::<SplatRecord>();

/// One renderable splat, laid out exactly as the shader reads `array<Splat>`.
#[derive(
    Clone,
    Debug,
    Default,
    Copy,
    PartialEq,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct SplatRecord {
    pub position: Position,
    pub size: f32,
    pub color: Color,
}

const_assert_eq!(SPLAT_STRIDE, 32);

impl SplatRecord {
    pub fn new(position: Position, size: f32, color: Color) -> Self {
        Self {
            position,
            size,
            color,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.color[3]
    }
}

/// Mean of the three anisotropic scale components.
#[inline]
pub fn isotropic_size(scale: [f32; 3]) -> f32 {
    (scale[0] + scale[1] + scale[2]) / 3.0
}
