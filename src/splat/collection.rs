use std::ops::Index;

use glam::Vec3;

use crate::{
    math::Aabb,
    splat::record::SplatRecord,
};


/// Ordered splats produced by a decoder or generator.
///
/// The records cannot be mutated once collected; the buffer manager copies
/// them to the device and the host side can then be dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplatCollection {
    records: Vec<SplatRecord>,
}

impl SplatCollection {
    pub fn new(records: Vec<SplatRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record count as the `u32` the indirect args carry.
    pub fn count(&self) -> u32 {
        u32::try_from(self.records.len()).unwrap_or(u32::MAX)
    }

    pub fn records(&self) -> &[SplatRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SplatRecord> {
        self.records.iter()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    pub fn aabb(&self) -> Option<Aabb> {
        if self.records.is_empty() {
            return None;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for record in &self.records {
            let extent = Vec3::splat(record.size.abs());
            let position = Vec3::from(record.position);
            min = min.min(position - extent);
            max = max.max(position + extent);
        }

        Some(Aabb::new(min, max))
    }
}

impl Index<usize> for SplatCollection {
    type Output = SplatRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl FromIterator<SplatRecord> for SplatCollection {
    fn from_iter<I: IntoIterator<Item = SplatRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SplatCollection {
    type Item = &'a SplatRecord;
    type IntoIter = std::slice::Iter<'a, SplatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
