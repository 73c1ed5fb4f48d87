use glam::{
    Vec3,
    Vec4,
};
use rand::{
    Rng,
    prelude::Distribution,
};

use crate::splat::{
    collection::SplatCollection,
    record::SplatRecord,
    settings::ProceduralVolume,
};


pub const MIN_SIZE: f32 = 0.01;
pub const MAX_SIZE: f32 = 0.05;

pub const NEAR_COLOR: Vec4 = Vec4::new(1.0, 0.92, 0.016, 1.0);
pub const FAR_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);


/// Random splats scattered around the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplatDistribution {
    pub spread: f32,
    pub volume: ProceduralVolume,
}

impl SplatDistribution {
    pub fn new(spread: f32, volume: ProceduralVolume) -> Self {
        Self { spread, volume }
    }
}

impl Distribution<SplatRecord> for SplatDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SplatRecord {
        let position = match self.volume {
            ProceduralVolume::Sphere => inside_unit_sphere(rng) * self.spread,
            ProceduralVolume::Cube => {
                Vec3::new(unit_interval(rng), unit_interval(rng), unit_interval(rng)) * self.spread
            }
        };

        let size = rng.gen_range(MIN_SIZE..MAX_SIZE);
        let color = NEAR_COLOR.lerp(FAR_COLOR, rng.r#gen::<f32>());

        SplatRecord::new(position.into(), size, color.into())
    }
}

/// Uniform in `[-1, 1)`.
fn unit_interval<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.r#gen::<f32>() * 2.0 - 1.0
}

/// Rejection sampled point inside the unit sphere.
pub fn inside_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );

        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

pub fn random_splats<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    spread: f32,
    volume: ProceduralVolume,
) -> SplatCollection {
    let distribution = SplatDistribution::new(spread, volume);
    (0..count).map(|_| distribution.sample(rng)).collect()
}
