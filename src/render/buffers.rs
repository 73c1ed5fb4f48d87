use tracing::{
    debug,
    warn,
};
use wgpu::BufferUsages;

use crate::{
    error::Result,
    render::{
        device::{
            GpuDevice,
            SplatMaterial,
        },
        indirect::{
            INDIRECT_ARGS_SIZE,
            IndirectDrawArgs,
        },
        mesh::DrawMesh,
    },
    splat::{
        collection::SplatCollection,
        record::SPLAT_STRIDE,
    },
};


pub const SPLAT_BUFFER_LABEL: &str = "splat storage buffer";
pub const ARGS_BUFFER_LABEL: &str = "splat draw indirect buffer";


/// Device buffers of one provisioned splat set. Both exist or neither does.
#[derive(Debug)]
pub struct SplatBuffers<B> {
    pub splats: B,
    pub args: B,
    pub count: u32,
    pub draw_args: IndirectDrawArgs,
}


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BufferState {
    Uninitialized,
    Provisioned,
}


/// Owns the splat storage buffer and its indirect args buffer.
pub struct GpuBufferManager<D: GpuDevice> {
    device: D,
    buffers: Option<SplatBuffers<D::Buffer>>,
}

impl<D: GpuDevice> GpuBufferManager<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            buffers: None,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn state(&self) -> BufferState {
        match self.buffers {
            Some(_) => BufferState::Provisioned,
            None => BufferState::Uninitialized,
        }
    }

    pub fn is_provisioned(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn buffers(&self) -> Option<&SplatBuffers<D::Buffer>> {
        self.buffers.as_ref()
    }

    pub fn splat_buffer(&self) -> Option<&D::Buffer> {
        self.buffers.as_ref().map(|buffers| &buffers.splats)
    }

    pub fn args_buffer(&self) -> Option<&D::Buffer> {
        self.buffers.as_ref().map(|buffers| &buffers.args)
    }

    /// Zero while uninitialized.
    pub fn count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |buffers| buffers.count)
    }

    pub fn draw_args(&self) -> Option<IndirectDrawArgs> {
        self.buffers.as_ref().map(|buffers| buffers.draw_args)
    }

    /// Uploads `cloud` and its draw args, replacing any buffers already held.
    ///
    /// On failure nothing allocated by this call survives and the manager is
    /// left uninitialized.
    pub fn provision<M, Mat>(
        &mut self,
        cloud: &SplatCollection,
        mesh: Option<&M>,
        material: Option<&mut Mat>,
    ) -> Result<()>
    where
        M: DrawMesh + ?Sized,
        Mat: SplatMaterial<D> + ?Sized,
    {
        self.release();

        let count = cloud.count();
        let draw_args = IndirectDrawArgs::for_mesh(mesh, count);

        let splat_bytes = u64::from(count) * SPLAT_STRIDE as u64;
        let splats = self.allocate_with(
            SPLAT_BUFFER_LABEL,
            splat_bytes,
            BufferUsages::STORAGE | BufferUsages::COPY_DST,
            cloud.as_bytes(),
        )?;

        let args = match self.allocate_with(
            ARGS_BUFFER_LABEL,
            INDIRECT_ARGS_SIZE as u64,
            BufferUsages::INDIRECT | BufferUsages::COPY_DST,
            draw_args.as_bytes(),
        ) {
            Ok(args) => args,
            Err(err) => {
                warn!(label = ARGS_BUFFER_LABEL, "rolling back splat buffer after failed allocation");
                self.device.release(splats);
                return Err(err);
            }
        };

        if let Some(material) = material {
            material.bind_splats(&self.device, &splats);
        }

        debug!(count, bytes = splat_bytes, ?draw_args, "provisioned splat buffers");

        self.buffers = Some(SplatBuffers {
            splats,
            args,
            count,
            draw_args,
        });

        Ok(())
    }

    /// Same as `provision`, spelled out for parameter changes.
    pub fn reprovision<M, Mat>(
        &mut self,
        cloud: &SplatCollection,
        mesh: Option<&M>,
        material: Option<&mut Mat>,
    ) -> Result<()>
    where
        M: DrawMesh + ?Sized,
        Mat: SplatMaterial<D> + ?Sized,
    {
        self.release();
        self.provision(cloud, mesh, material)
    }

    /// No-op when nothing is provisioned.
    pub fn release(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            debug!(count = buffers.count, "releasing splat buffers");
            self.device.release(buffers.splats);
            self.device.release(buffers.args);
        }
    }

    fn allocate_with(
        &self,
        label: &'static str,
        size: u64,
        usage: BufferUsages,
        contents: &[u8],
    ) -> Result<D::Buffer> {
        let buffer = self.device.allocate(label, size, usage)?;

        if contents.is_empty() {
            return Ok(buffer);
        }

        match self.device.upload(&buffer, contents) {
            Ok(()) => Ok(buffer),
            Err(err) => {
                self.device.release(buffer);
                Err(err)
            }
        }
    }
}

impl<D: GpuDevice> Drop for GpuBufferManager<D> {
    fn drop(&mut self) {
        self.release();
    }
}
