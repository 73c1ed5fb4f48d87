use wgpu::util::DeviceExt;

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
        mesh::{
            DrawMesh,
            QUAD_INDICES,
            QUAD_POSITIONS,
            SubMesh,
        },
    },
    splat::record::SPLAT_STRIDE,
};


/// `wgpu` device and queue pair.
#[derive(Debug)]
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    /// Headless device on the default adapter. `None` when no adapter can
    /// read storage buffers from the vertex stage and draw indirect.
    pub fn request_headless() -> Option<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::default();
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await?;

            let required = wgpu::DownlevelFlags::VERTEX_STORAGE | wgpu::DownlevelFlags::INDIRECT_EXECUTION;
            if !adapter.get_downlevel_capabilities().flags.contains(required) {
                return None;
            }

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default(), None)
                .await
                .ok()?;

            Some(Self::new(device, queue))
        })
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;

    fn allocate(&self, label: &'static str, size: u64, usage: wgpu::BufferUsages) -> Result<Self::Buffer> {
        let failed = |reason: String| SplatError::DeviceAllocationFailed {
            label,
            size,
            reason,
        };

        let limits = self.device.limits();
        if size > limits.max_buffer_size {
            return Err(failed(format!("exceeds max_buffer_size {}", limits.max_buffer_size)));
        }
        if usage.contains(wgpu::BufferUsages::STORAGE)
            && size > u64::from(limits.max_storage_buffer_binding_size)
        {
            return Err(failed(format!(
                "exceeds max_storage_buffer_binding_size {}",
                limits.max_storage_buffer_binding_size,
            )));
        }

        // zero sized storage bindings are invalid, keep one record of room
        let padded = size.max(SPLAT_STRIDE as u64);

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: padded,
            usage,
            mapped_at_creation: false,
        });

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        match validation.or(out_of_memory) {
            Some(err) => {
                buffer.destroy();
                Err(failed(err.to_string()))
            }
            None => Ok(buffer),
        }
    }

    fn upload(&self, buffer: &Self::Buffer, bytes: &[u8]) -> Result<()> {
        if bytes.len() as u64 > buffer.size() {
            return Err(SplatError::DeviceAllocationFailed {
                label: "upload",
                size: bytes.len() as u64,
                reason: format!("buffer holds {} bytes", buffer.size()),
            });
        }

        self.queue.write_buffer(buffer, 0, bytes);
        Ok(())
    }

    fn release(&self, buffer: Self::Buffer) {
        buffer.destroy();
    }
}


/// Host supplied pipeline whose `splat_group` reads `array<Splat>` at
/// binding 0.
#[derive(Debug)]
pub struct WgpuSplatMaterial {
    pub pipeline: wgpu::RenderPipeline,
    pub splat_layout: wgpu::BindGroupLayout,
    pub splat_group: u32,
    splat_bind_group: Option<wgpu::BindGroup>,
}

impl WgpuSplatMaterial {
    pub fn new(pipeline: wgpu::RenderPipeline, splat_layout: wgpu::BindGroupLayout, splat_group: u32) -> Self {
        Self {
            pipeline,
            splat_layout,
            splat_group,
            splat_bind_group: None,
        }
    }

    pub fn splat_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.splat_bind_group.as_ref()
    }
}

pub fn splat_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("splat bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

impl SplatMaterial<WgpuDevice> for WgpuSplatMaterial {
    fn bind_splats(&mut self, device: &WgpuDevice, splats: &wgpu::Buffer) {
        self.splat_bind_group = Some(device.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("splat bind group"),
            layout: &self.splat_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: splats.as_entire_binding(),
                },
            ],
        }));
    }

    fn unbind_splats(&mut self) {
        self.splat_bind_group = None;
    }

    fn has_splats(&self) -> bool {
        self.splat_bind_group.is_some()
    }
}


#[derive(Debug)]
pub struct WgpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_format: wgpu::IndexFormat,
    pub submeshes: Vec<SubMesh>,
}

impl WgpuMesh {
    /// Uploads the unit quad.
    pub fn quad(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("splat quad vertex buffer"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("splat quad index buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_format: wgpu::IndexFormat::Uint16,
            submeshes: vec![SubMesh {
                index_count: QUAD_INDICES.len() as u32,
                index_start: 0,
                base_vertex: 0,
            }],
        }
    }
}

impl DrawMesh for WgpuMesh {
    fn submesh(&self, index: usize) -> Option<SubMesh> {
        self.submeshes.get(index).copied()
    }
}


/// View bind group set ahead of the splat group.
#[derive(Debug)]
pub struct WgpuCamera {
    pub bind_group: wgpu::BindGroup,
    pub group: u32,
}

impl SplatPass<WgpuDevice> for wgpu::RenderPass<'_> {
    type Mesh = WgpuMesh;
    type Material = WgpuSplatMaterial;
    type Camera = WgpuCamera;

    fn draw_mesh_instanced_indirect(
        &mut self,
        mesh: &WgpuMesh,
        material: &WgpuSplatMaterial,
        _bounds: &Aabb,
        args: &wgpu::Buffer,
        camera: &WgpuCamera,
    ) {
        let Some(splat_bind_group) = material.splat_bind_group() else {
            return;
        };

        self.set_pipeline(&material.pipeline);
        self.set_bind_group(camera.group, &camera.bind_group, &[]);
        self.set_bind_group(material.splat_group, splat_bind_group, &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), mesh.index_format);
        self.draw_indexed_indirect(args, 0);
    }
}
