use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
};

use rand::Rng;
use tracing::info;

use crate::{
    error::{
        Result,
        SplatError,
    },
    io::ply::SplatDecoder,
    splat::{
        collection::SplatCollection,
        rand::random_splats,
        settings::{
            ProceduralVolume,
            SplatSettings,
        },
    },
};


/// Splats decoded from a ply file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Blocks on file io.
    pub fn load(&self) -> Result<SplatCollection> {
        let unavailable = |source| SplatError::SourceUnavailable {
            path: self.path.clone(),
            source,
        };

        let file = File::open(&self.path).map_err(unavailable)?;
        let stream_len = file.metadata().map_err(unavailable)?.len();

        let cloud = SplatDecoder::new()
            .with_stream_len(stream_len)
            .decode(BufReader::new(file))?;

        info!(path = %self.path.display(), count = cloud.len(), "loaded splat ply");

        Ok(cloud)
    }
}


/// Random splats, deterministic for a given generator state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProceduralSource {
    pub count: u32,
    pub spread: f32,
    pub volume: ProceduralVolume,
}

impl ProceduralSource {
    pub fn new(count: u32, spread: f32) -> Self {
        Self {
            count,
            spread,
            volume: ProceduralVolume::default(),
        }
    }

    pub fn with_volume(mut self, volume: ProceduralVolume) -> Self {
        self.volume = volume;
        self
    }

    /// Fails with `InvalidSpread` when `spread` or the span it covers is not
    /// finite.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SplatCollection> {
        if !self.spread.is_finite() || !(self.spread * 2.0).is_finite() {
            return Err(SplatError::InvalidSpread(self.spread));
        }

        Ok(random_splats(rng, self.count as usize, self.spread, self.volume))
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum SplatSource {
    File(FileSource),
    Procedural(ProceduralSource),
}

impl SplatSource {
    pub fn from_settings(settings: &SplatSettings) -> Self {
        match &settings.source_path {
            Some(path) => SplatSource::File(FileSource::new(path.clone())),
            None => SplatSource::Procedural(
                ProceduralSource::new(settings.splat_count, settings.spread)
                    .with_volume(settings.volume),
            ),
        }
    }

    /// The generator is only drawn from by procedural sources.
    pub fn produce<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SplatCollection> {
        match self {
            SplatSource::File(source) => source.load(),
            SplatSource::Procedural(source) => source.generate(rng),
        }
    }
}

impl From<FileSource> for SplatSource {
    fn from(source: FileSource) -> Self {
        SplatSource::File(source)
    }
}

impl From<ProceduralSource> for SplatSource {
    fn from(source: ProceduralSource) -> Self {
        SplatSource::Procedural(source)
    }
}
