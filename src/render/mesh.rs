/// Index range of one submesh.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
)]
pub struct SubMesh {
    pub index_count: u32,
    pub index_start: u32,
    pub base_vertex: u32,
}

pub trait DrawMesh {
    fn submesh(&self, index: usize) -> Option<SubMesh>;
}


pub const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [-0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
];

pub const QUAD_INDICES: [u16; 6] = [0, 3, 1, 3, 0, 2];


/// Unit quad every splat instance is drawn with when the host has no mesh
/// of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadMesh;

impl DrawMesh for QuadMesh {
    fn submesh(&self, index: usize) -> Option<SubMesh> {
        (index == 0).then_some(SubMesh {
            index_count: QUAD_INDICES.len() as u32,
            index_start: 0,
            base_vertex: 0,
        })
    }
}

impl<M: DrawMesh + ?Sized> DrawMesh for &M {
    fn submesh(&self, index: usize) -> Option<SubMesh> {
        (**self).submesh(index)
    }
}
