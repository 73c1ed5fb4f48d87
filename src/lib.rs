pub use error::{
    Result,
    SplatError,
};
pub use io::ply::{
    SplatDecoder,
    decode_binary_ply,
    decode_ply,
    decode_text_ply,
};
pub use math::Aabb;
pub use render::{
    GpuBufferManager,
    GpuDevice,
    IndirectDrawArgs,
    QuadMesh,
    SplatMaterial,
    SplatPass,
};
pub use renderer::SplatRenderer;
pub use splat::{
    collection::SplatCollection,
    rand::random_splats,
    record::{
        SPLAT_STRIDE,
        SplatRecord,
    },
    settings::{
        ProceduralVolume,
        SplatSettings,
    },
    source::{
        FileSource,
        ProceduralSource,
        SplatSource,
    },
};

pub mod error;
pub mod io;
pub mod math;
pub mod render;
pub mod renderer;
pub mod splat;
