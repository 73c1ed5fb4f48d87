use wgpu::BufferUsages;

use crate::error::Result;


/// Buffer capabilities the splat buffers need from a graphics backend.
///
/// Methods take `&self`; backends hold their own interior state the same way
/// a `wgpu::Device` does.
pub trait GpuDevice {
    type Buffer;

    /// Fails with `SplatError::DeviceAllocationFailed`.
    fn allocate(&self, label: &'static str, size: u64, usage: BufferUsages) -> Result<Self::Buffer>;

    /// Writes `bytes` at offset zero.
    fn upload(&self, buffer: &Self::Buffer, bytes: &[u8]) -> Result<()>;

    fn release(&self, buffer: Self::Buffer);
}


/// Anything that can have the splat storage buffer bound as a shader input.
pub trait SplatMaterial<D: GpuDevice> {
    fn bind_splats(&mut self, device: &D, splats: &D::Buffer);

    fn unbind_splats(&mut self);

    fn has_splats(&self) -> bool;
}
