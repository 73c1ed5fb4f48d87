use std::path::PathBuf;

use byte_unit::{
    Byte,
    UnitType,
};
use clap::Parser;
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use tracing::{
    error,
    info,
    warn,
};
use tracing_subscriber::EnvFilter;

use splat_indirect::{
    GpuDevice,
    QuadMesh,
    SPLAT_STRIDE,
    SplatError,
    SplatRenderer,
    SplatSettings,
    io::writer::write_ply_to_file,
    render::{
        memory::{
            MemoryDevice,
            MemoryMaterial,
            MemoryPass,
        },
        wgpu_device::{
            WgpuDevice,
            WgpuMesh,
            WgpuSplatMaterial,
        },
    },
    splat::source::SplatSource,
};


#[derive(Debug, Parser)]
#[command(about = "load or generate gaussian splats and provision their draw buffers", version, long_about = None)]
struct SplatInspect {
    #[command(flatten)]
    settings: SplatSettings,

    /// json file with splat settings, replaces the settings flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// provision onto a headless wgpu device instead of host memory
    #[arg(long, default_value = "false")]
    gpu: bool,

    /// write the splats back out as ply
    #[arg(long)]
    export: Option<PathBuf>,

    /// export the ascii body instead of binary
    #[arg(long, default_value = "false")]
    ascii: bool,
}


fn main() -> Result<(), SplatError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = SplatInspect::parse();

    let settings = match &args.config {
        Some(path) => SplatSettings::from_json_file(path)?,
        None => args.settings.clone(),
    };

    if let Err(err) = run(&args, settings) {
        error!(error = %err, "splat_inspect failed");
        return Err(err);
    }

    Ok(())
}

fn run(args: &SplatInspect, settings: SplatSettings) -> Result<(), SplatError> {
    if let Some(path) = &args.export {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cloud = SplatSource::from_settings(&settings).produce(&mut rng)?;
        write_ply_to_file(&cloud, path, args.ascii)?;

        let file_bytes = Byte::from_u64(std::fs::metadata(path)?.len());
        info!(
            path = %path.display(),
            size = %file_bytes.get_appropriate_unit(UnitType::Decimal),
            "exported splat ply",
        );
    }

    if args.gpu {
        match WgpuDevice::request_headless() {
            Some(device) => return inspect_wgpu(device, settings),
            None => warn!("no wgpu adapter available, falling back to host memory"),
        }
    }

    inspect_memory(settings)
}

fn inspect_memory(settings: SplatSettings) -> Result<(), SplatError> {
    let mut renderer = SplatRenderer::new(MemoryDevice::new(), settings);
    let mut material = MemoryMaterial::default();

    renderer.on_activate(Some(&QuadMesh), Some(&mut material))?;
    report(&renderer);

    let mut pass = MemoryPass::new();
    let drawn = renderer.render_frame(&mut pass, Some(&QuadMesh), Some(&material), &());
    info!(drawn, live_buffers = renderer.buffers().device().live_buffers(), "recorded frame");

    renderer.on_deactivate(Some(&mut material));
    Ok(())
}

fn inspect_wgpu(device: WgpuDevice, settings: SplatSettings) -> Result<(), SplatError> {
    let mesh = WgpuMesh::quad(&device.device);
    let mut renderer = SplatRenderer::new(device, settings);

    // buffers only, no pipeline to bind a material against
    renderer.on_activate::<_, WgpuSplatMaterial>(Some(&mesh), None)?;
    report(&renderer);

    renderer.on_deactivate::<WgpuSplatMaterial>(None);
    Ok(())
}

fn report<D: GpuDevice>(renderer: &SplatRenderer<D>) {
    let buffers = renderer.buffers();
    let count = buffers.count();
    let bytes = Byte::from_u64(u64::from(count) * SPLAT_STRIDE as u64);
    let bounds = renderer.bounds();

    info!(
        count,
        size = %bytes.get_appropriate_unit(UnitType::Decimal),
        min = ?bounds.min,
        max = ?bounds.max,
        draw_args = ?buffers.draw_args(),
        "provisioned splats",
    );
}
