use tracing::trace;

use crate::{
    math::Aabb,
    render::{
        buffers::SplatBuffers,
        device::{
            GpuDevice,
            SplatMaterial,
        },
        mesh::DrawMesh,
    },
};


/// A render pass able to record one instanced indexed indirect draw.
pub trait SplatPass<D: GpuDevice> {
    type Mesh: DrawMesh;
    type Material: SplatMaterial<D>;
    type Camera;

    /// Instance count and index range come from `args` on the device.
    fn draw_mesh_instanced_indirect(
        &mut self,
        mesh: &Self::Mesh,
        material: &Self::Material,
        bounds: &Aabb,
        args: &D::Buffer,
        camera: &Self::Camera,
    );
}


/// Records the splat draw, returning whether anything was submitted.
///
/// Missing mesh, material, material binding or buffers skip the frame.
pub fn draw<D, P>(
    pass: &mut P,
    mesh: Option<&P::Mesh>,
    material: Option<&P::Material>,
    buffers: Option<&SplatBuffers<D::Buffer>>,
    bounds: &Aabb,
    camera: &P::Camera,
) -> bool
where
    D: GpuDevice,
    P: SplatPass<D> + ?Sized,
{
    let Some(material) = material.filter(|material| material.has_splats()) else {
        trace!("splat material missing or unbound, skipping draw");
        return false;
    };

    let Some(buffers) = buffers else {
        trace!("splat buffers not provisioned, skipping draw");
        return false;
    };

    let Some(mesh) = mesh else {
        trace!("no splat mesh, skipping draw");
        return false;
    };

    pass.draw_mesh_instanced_indirect(mesh, material, bounds, &buffers.args, camera);

    true
}
