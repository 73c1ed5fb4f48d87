use std::{
    cell::{
        Cell,
        RefCell,
    },
    collections::HashMap,
};

use wgpu::BufferUsages;

use crate::{
    error::{
        Result,
        SplatError,
    },
    math::Aabb,
    render::{
        device::{
            GpuDevice,
            SplatMaterial,
        },
        draw::SplatPass,
        indirect::{
            INDIRECT_ARGS_SIZE,
            IndirectDrawArgs,
        },
        mesh::QuadMesh,
    },
    splat::record::{
        SPLAT_STRIDE,
        SplatRecord,
    },
};


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryBuffer {
    pub id: u64,
    pub size: u64,
    pub usage: BufferUsages,
}


/// Host memory device for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    buffers: RefCell<HashMap<u64, Vec<u8>>>,
    next_id: Cell<u64>,
    allocations: Cell<u64>,
    capacity: Cell<Option<u64>>,
    fail_after: Cell<Option<u64>>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocations fail once live bytes would exceed `capacity`.
    pub fn with_capacity(capacity: u64) -> Self {
        let device = Self::default();
        device.capacity.set(Some(capacity));
        device
    }

    /// The next `n` allocations succeed, every one after fails.
    pub fn fail_after(&self, n: u64) {
        self.fail_after.set(Some(n));
    }

    pub fn clear_failures(&self) {
        self.fail_after.set(None);
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.borrow().len()
    }

    pub fn live_bytes(&self) -> u64 {
        self.buffers.borrow().values().map(|bytes| bytes.len() as u64).sum()
    }

    /// Total successful allocations since creation.
    pub fn allocations(&self) -> u64 {
        self.allocations.get()
    }

    pub fn is_live(&self, buffer: &MemoryBuffer) -> bool {
        self.buffers.borrow().contains_key(&buffer.id)
    }

    pub fn contents(&self, buffer: &MemoryBuffer) -> Option<Vec<u8>> {
        self.buffers.borrow().get(&buffer.id).cloned()
    }

    pub fn read_splats(&self, buffer: &MemoryBuffer) -> Option<Vec<SplatRecord>> {
        let bytes = self.contents(buffer)?;
        if bytes.len() % SPLAT_STRIDE != 0 {
            return None;
        }

        Some(bytemuck::pod_collect_to_vec(&bytes))
    }

    pub fn read_draw_args(&self, buffer: &MemoryBuffer) -> Option<IndirectDrawArgs> {
        let bytes = self.contents(buffer)?;
        if bytes.len() != INDIRECT_ARGS_SIZE {
            return None;
        }

        Some(bytemuck::pod_read_unaligned(&bytes))
    }
}

impl GpuDevice for MemoryDevice {
    type Buffer = MemoryBuffer;

    fn allocate(&self, label: &'static str, size: u64, usage: BufferUsages) -> Result<Self::Buffer> {
        let failed = |reason: &str| SplatError::DeviceAllocationFailed {
            label,
            size,
            reason: reason.to_string(),
        };

        if let Some(remaining) = self.fail_after.get() {
            if remaining == 0 {
                return Err(failed("injected failure"));
            }
            self.fail_after.set(Some(remaining - 1));
        }

        if let Some(capacity) = self.capacity.get() {
            if self.live_bytes().saturating_add(size) > capacity {
                return Err(failed("out of memory"));
            }
        }

        let len = usize::try_from(size).map_err(|_| failed("size exceeds host address space"))?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.allocations.set(self.allocations.get() + 1);
        self.buffers.borrow_mut().insert(id, vec![0; len]);

        Ok(MemoryBuffer { id, size, usage })
    }

    fn upload(&self, buffer: &Self::Buffer, bytes: &[u8]) -> Result<()> {
        let mut buffers = self.buffers.borrow_mut();
        let failed = |reason: &str| SplatError::DeviceAllocationFailed {
            label: "upload",
            size: bytes.len() as u64,
            reason: reason.to_string(),
        };

        let target = buffers.get_mut(&buffer.id).ok_or_else(|| failed("buffer released"))?;
        if bytes.len() > target.len() {
            return Err(failed("upload larger than buffer"));
        }

        target[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn release(&self, buffer: Self::Buffer) {
        self.buffers.borrow_mut().remove(&buffer.id);
    }
}


/// Material that only remembers which buffer is bound.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryMaterial {
    pub splats: Option<MemoryBuffer>,
}

impl SplatMaterial<MemoryDevice> for MemoryMaterial {
    fn bind_splats(&mut self, _device: &MemoryDevice, splats: &MemoryBuffer) {
        self.splats = Some(*splats);
    }

    fn unbind_splats(&mut self) {
        self.splats = None;
    }

    fn has_splats(&self) -> bool {
        self.splats.is_some()
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct RecordedDraw {
    pub splats: Option<MemoryBuffer>,
    pub args: MemoryBuffer,
    pub bounds: Aabb,
}

/// Pass that records submissions instead of executing them.
#[derive(Debug, Default)]
pub struct MemoryPass {
    pub draws: Vec<RecordedDraw>,
}

impl MemoryPass {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SplatPass<MemoryDevice> for MemoryPass {
    type Mesh = QuadMesh;
    type Material = MemoryMaterial;
    type Camera = ();

    fn draw_mesh_instanced_indirect(
        &mut self,
        _mesh: &QuadMesh,
        material: &MemoryMaterial,
        bounds: &Aabb,
        args: &MemoryBuffer,
        _camera: &(),
    ) {
        self.draws.push(RecordedDraw {
            splats: material.splats,
            args: *args,
            bounds: *bounds,
        });
    }
}
