use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Args,
    ValueEnum,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    Result,
    SplatError,
};


#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ProceduralVolume {
    /// uniform inside a sphere of radius `spread`
    #[default]
    Sphere,
    /// each axis uniform in `[-spread, spread]`
    Cube,
}


#[derive(
    Clone,
    Debug,
    PartialEq,
    Serialize,
    Deserialize,
    Args,
)]
#[serde(default)]
pub struct SplatSettings {
    /// number of procedural splats, ignored when a source file is set
    #[arg(long, default_value = "1000000")]
    pub splat_count: u32,

    #[arg(long, default_value = "10.0")]
    pub spread: f32,

    /// binary or ascii splat ply to load instead of generating splats
    #[arg(long)]
    pub source_path: Option<PathBuf>,

    /// seed for procedural splats, entropy when unset
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = ProceduralVolume::Sphere)]
    pub volume: ProceduralVolume,
}

impl Default for SplatSettings {
    fn default() -> SplatSettings {
        SplatSettings {
            splat_count: 1_000_000,
            spread: 10.0,
            source_path: None,
            seed: None,
            volume: ProceduralVolume::Sphere,
        }
    }
}

impl SplatSettings {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| SplatError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|err| SplatError::Io(err.into()))
    }
}
