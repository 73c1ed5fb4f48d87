use std::path::PathBuf;

use rand::{
    SeedableRng,
    rngs::StdRng,
};
use tracing::{
    debug,
    error,
    info,
    trace,
};

use crate::{
    error::Result,
    math::Aabb,
    render::{
        buffers::GpuBufferManager,
        device::{
            GpuDevice,
            SplatMaterial,
        },
        draw::{
            SplatPass,
            draw,
        },
        mesh::DrawMesh,
    },
    splat::{
        settings::SplatSettings,
        source::SplatSource,
    },
};


/// Lifecycle surface driven by the host application.
///
/// The host calls `on_activate` / `on_deactivate` around the time it wants
/// splats drawn, `on_parameters_changed` after editing settings and
/// `render_frame` once per frame. Mesh and material stay owned by the host
/// and are lent per call.
pub struct SplatRenderer<D: GpuDevice> {
    settings: SplatSettings,
    provisioned: Option<SplatSettings>,
    rng: StdRng,
    buffers: GpuBufferManager<D>,
    bounds: Aabb,
    active: bool,
}

impl<D: GpuDevice> SplatRenderer<D> {
    pub fn new(device: D, settings: SplatSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            bounds: Aabb::cube(settings.spread),
            settings,
            provisioned: None,
            rng,
            buffers: GpuBufferManager::new(device),
            active: false,
        }
    }

    pub fn settings(&self) -> &SplatSettings {
        &self.settings
    }

    pub fn buffers(&self) -> &GpuBufferManager<D> {
        &self.buffers
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Subscribed to per-frame draws.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Takes effect on the next `on_parameters_changed` or `on_activate`.
    pub fn set_parameters(&mut self, splat_count: u32, spread: f32, source_path: Option<PathBuf>) {
        self.settings.splat_count = splat_count;
        self.settings.spread = spread;
        self.settings.source_path = source_path;
    }

    pub fn on_activate<M, Mat>(&mut self, mesh: Option<&M>, material: Option<&mut Mat>) -> Result<()>
    where
        M: DrawMesh,
        Mat: SplatMaterial<D>,
    {
        debug!(splat_count = self.settings.splat_count, "activating splat renderer");

        self.active = true;
        self.provision_current(mesh, material)
    }

    pub fn on_deactivate<Mat>(&mut self, material: Option<&mut Mat>)
    where
        Mat: SplatMaterial<D>,
    {
        debug!("deactivating splat renderer");

        self.active = false;
        self.disable(material);
    }

    /// Reprovisions when active and the settings moved since the last
    /// provision. Returns whether buffers were rebuilt.
    pub fn on_parameters_changed<M, Mat>(&mut self, mesh: Option<&M>, material: Option<&mut Mat>) -> Result<bool>
    where
        M: DrawMesh,
        Mat: SplatMaterial<D>,
    {
        if !self.active {
            trace!("splat renderer inactive, deferring parameter change");
            return Ok(false);
        }

        if self.provisioned.as_ref() == Some(&self.settings) {
            trace!("splat parameters unchanged");
            return Ok(false);
        }

        let previous = self.provisioned.as_ref().map(|settings| settings.splat_count);
        info!(?previous, current = self.settings.splat_count, "splat parameters changed");

        self.provision_current(mesh, material)?;
        Ok(true)
    }

    /// Issues the frame's splat draw; `false` when nothing was submitted.
    pub fn render_frame<P>(
        &self,
        pass: &mut P,
        mesh: Option<&P::Mesh>,
        material: Option<&P::Material>,
        camera: &P::Camera,
    ) -> bool
    where
        P: SplatPass<D> + ?Sized,
    {
        if !self.active {
            return false;
        }

        draw::<D, P>(pass, mesh, material, self.buffers.buffers(), &self.bounds, camera)
    }

    fn provision_current<M, Mat>(&mut self, mesh: Option<&M>, mut material: Option<&mut Mat>) -> Result<()>
    where
        M: DrawMesh,
        Mat: SplatMaterial<D>,
    {
        if let Some(seed) = self.settings.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let source = SplatSource::from_settings(&self.settings);
        let cloud = match source.produce(&mut self.rng) {
            Ok(cloud) => cloud,
            Err(err) => {
                error!(error = %err, "failed to produce splats, rendering disabled");
                self.disable(material);
                return Err(err);
            }
        };

        self.bounds = match source {
            SplatSource::File(_) => cloud.aabb().unwrap_or_default(),
            SplatSource::Procedural(_) => Aabb::cube(self.settings.spread),
        };

        if let Err(err) = self.buffers.reprovision(&cloud, mesh, material.as_deref_mut()) {
            error!(error = %err, "failed to provision splat buffers, rendering disabled");
            self.disable(material);
            return Err(err);
        }

        self.provisioned = Some(self.settings.clone());
        Ok(())
    }

    fn disable<Mat>(&mut self, material: Option<&mut Mat>)
    where
        Mat: SplatMaterial<D>,
    {
        self.buffers.release();
        self.provisioned = None;

        if let Some(material) = material {
            material.unbind_splats();
        }
    }
}
