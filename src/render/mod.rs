pub mod buffers;
pub mod device;
pub mod draw;
pub mod indirect;
pub mod memory;
pub mod mesh;
pub mod wgpu_device;

pub use buffers::{
    BufferState,
    GpuBufferManager,
    SplatBuffers,
};
pub use device::{
    GpuDevice,
    SplatMaterial,
};
pub use draw::{
    SplatPass,
    draw,
};
pub use indirect::IndirectDrawArgs;
pub use mesh::{
    DrawMesh,
    QuadMesh,
    SubMesh,
};
