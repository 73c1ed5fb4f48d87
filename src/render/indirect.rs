use bytemuck::{
    Pod,
    Zeroable,
};
use static_assertions::const_assert_eq;

use crate::render::mesh::DrawMesh;


/// Layout consumed by `draw_indexed_indirect`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Pod,
    Zeroable,
)]
#[repr(C)]
pub struct IndirectDrawArgs {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: u32,
    pub start_instance_location: u32,
}

pub const INDIRECT_ARGS_SIZE: usize = std::mem::size_of::<IndirectDrawArgs>();

const_assert_eq!(INDIRECT_ARGS_SIZE, 20);

impl IndirectDrawArgs {
    /// Args for the first submesh of `mesh`, zeroed index range without one.
    pub fn for_mesh<M: DrawMesh + ?Sized>(mesh: Option<&M>, instance_count: u32) -> Self {
        let submesh = mesh.and_then(|mesh| mesh.submesh(0)).unwrap_or_default();

        Self {
            index_count_per_instance: submesh.index_count,
            instance_count,
            start_index_location: submesh.index_start,
            base_vertex_location: submesh.base_vertex,
            start_instance_location: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
