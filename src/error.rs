use std::path::PathBuf;

use thiserror::Error;


pub type Result<T> = std::result::Result<T, SplatError>;

#[derive(Debug, Error)]
pub enum SplatError {
    #[error("malformed ply header at byte {offset}")]
    MalformedHeader {
        offset: u64,
    },

    #[error("ply header is missing `{0}`")]
    HeaderFieldMissing(&'static str),

    #[error("invalid vertex count: {0}")]
    InvalidVertexCount(String),

    #[error("unexpected end of stream at byte {offset}")]
    UnexpectedEndOfStream {
        offset: u64,
    },

    #[error("ply body truncated at record {record} of {expected}")]
    TruncatedBody {
        record: u32,
        expected: u32,
    },

    #[error("invalid record field on body line {line}")]
    InvalidRecordField {
        line: usize,
    },

    #[error("splat source `{}` unavailable", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("procedural spread {0} is not finite")]
    InvalidSpread(f32),

    #[error("device allocation of `{label}` ({size} bytes) failed: {reason}")]
    DeviceAllocationFailed {
        label: &'static str,
        size: u64,
        reason: String,
    },

    #[error("io error")]
    Io(#[from] std::io::Error),
}
