use std::{
    fs::File,
    io::{
        BufWriter,
        Write,
    },
    path::Path,
};

use crate::{
    error::{
        Result,
        SplatError,
    },
    io::ply::{
        NORMAL_BYTES,
        ROTATION_BYTES,
        SH_REST_BYTES,
    },
    splat::collection::SplatCollection,
};


const SH_REST_COUNT: u64 = SH_REST_BYTES / 4;

const BINARY_HEAD: &[&str] = &[
    "x", "y", "z",
    "nx", "ny", "nz",
    "f_dc_0", "f_dc_1", "f_dc_2",
];
const BINARY_TAIL: &[&str] = &[
    "opacity",
    "scale_0", "scale_1", "scale_2",
    "rot_0", "rot_1", "rot_2", "rot_3",
];
const TEXT_PROPERTIES: &[&str] = &[
    "x", "y", "z",
    "nx", "ny", "nz",
    "red", "green", "blue",
    "scale_0", "scale_1", "scale_2",
    "opacity",
    "rot_0", "rot_1",
];


fn write_header<W: Write>(writer: &mut W, format: &str, count: u32, properties: &[String]) -> std::io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format {format} 1.0")?;
    writeln!(writer, "element vertex {count}")?;
    for property in properties {
        writeln!(writer, "property float {property}")?;
    }
    writeln!(writer, "end_header")
}

fn binary_properties() -> Vec<String> {
    BINARY_HEAD
        .iter()
        .map(|p| p.to_string())
        .chain((0..SH_REST_COUNT).map(|i| format!("f_rest_{i}")))
        .chain(BINARY_TAIL.iter().map(|p| p.to_string()))
        .collect()
}

fn write_f32s<W: Write>(writer: &mut W, values: &[f32]) -> std::io::Result<()> {
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Writes the binary splat layout. Normals, rest coefficients and rotation
/// are zero filled, each scale axis carries the splat size.
pub fn write_binary_ply<W: Write>(writer: &mut W, cloud: &SplatCollection) -> Result<()> {
    write_header(writer, "binary_little_endian", cloud.count(), &binary_properties())?;

    let normal = [0u8; NORMAL_BYTES as usize];
    let sh_rest = [0u8; SH_REST_BYTES as usize];
    let rotation = [0u8; ROTATION_BYTES as usize];

    for splat in cloud {
        let [r, g, b, opacity] = splat.color;

        write_f32s(writer, &splat.position)?;
        writer.write_all(&normal)?;
        write_f32s(writer, &[r, g, b])?;
        writer.write_all(&sh_rest)?;
        write_f32s(writer, &[opacity])?;
        write_f32s(writer, &[splat.size; 3])?;
        writer.write_all(&rotation)?;
    }

    Ok(())
}

/// Writes one 15-field line per splat: position, normal, color, scale,
/// opacity, and two rotation components. The text layout has no rest
/// coefficients.
pub fn write_text_ply<W: Write>(writer: &mut W, cloud: &SplatCollection) -> Result<()> {
    let properties = TEXT_PROPERTIES.iter().map(|p| p.to_string()).collect::<Vec<_>>();
    write_header(writer, "ascii", cloud.count(), &properties)?;

    for splat in cloud {
        let [x, y, z] = splat.position;
        let [r, g, b, opacity] = splat.color;
        let s = splat.size;

        writeln!(writer, "{x} {y} {z} 0 0 0 {r} {g} {b} {s} {s} {s} {opacity} 1 0")?;
    }

    Ok(())
}

pub fn write_ply_to_file(cloud: &SplatCollection, path: &Path, ascii: bool) -> Result<()> {
    let file = File::create(path).map_err(|source| SplatError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    if ascii {
        write_text_ply(&mut writer, cloud)?;
    } else {
        write_binary_ply(&mut writer, cloud)?;
    }

    writer.flush()?;
    Ok(())
}
