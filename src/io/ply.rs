use std::io::BufRead;

use tracing::{
    debug,
    trace,
};

use crate::{
    error::{
        Result,
        SplatError,
    },
    io::reader::PlyReader,
    splat::{
        collection::SplatCollection,
        record::{
            SplatRecord,
            isotropic_size,
        },
    },
};


// the splat ply layout is fixed by the exporters that produce it, the
// header's property list is not consulted
pub const POSITION_BYTES: u64 = 12;
/// nx, ny, nz
pub const NORMAL_BYTES: u64 = 12;
pub const COLOR_BYTES: u64 = 12;
/// f_rest_0 ..= f_rest_39
pub const SH_REST_BYTES: u64 = 160;
pub const OPACITY_BYTES: u64 = 4;
pub const SCALE_BYTES: u64 = 12;
/// rot_0 ..= rot_3
pub const ROTATION_BYTES: u64 = 16;

pub const RECORD_BYTES: u64 = POSITION_BYTES
    + NORMAL_BYTES
    + COLOR_BYTES
    + SH_REST_BYTES
    + OPACITY_BYTES
    + SCALE_BYTES
    + ROTATION_BYTES;

static_assertions::const_assert_eq!(RECORD_BYTES, 228);

pub const MIN_TEXT_FIELDS: usize = 15;

const END_HEADER: &str = "end_header";
const ELEMENT_VERTEX: &str = "element vertex";
const FORMAT: &str = "format";

// cap on up-front allocation when the header count cannot be checked
// against the stream length
const MAX_PREALLOCATED_RECORDS: usize = 1 << 20;


#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlyHeader {
    pub vertex_count: u32,
    pub format: Option<PlyFormat>,
    /// byte length of the header including the `end_header` line
    pub header_bytes: u64,
}

impl PlyHeader {
    pub fn is_ascii(&self) -> bool {
        matches!(self.format, Some(PlyFormat::Ascii))
    }
}


pub fn parse_header<R: BufRead>(reader: &mut PlyReader<R>) -> Result<PlyHeader> {
    let mut vertex_count = None;
    let mut format = None;

    loop {
        if reader.is_exhausted()? {
            return Err(SplatError::HeaderFieldMissing(END_HEADER));
        }

        let line = reader.read_line()?;

        if line.starts_with(END_HEADER) {
            break;
        }

        if line.starts_with(ELEMENT_VERTEX) {
            let count = line.split(' ').nth(2).unwrap_or_default();
            let count = count
                .parse::<u32>()
                .map_err(|_| SplatError::InvalidVertexCount(line.clone()))?;
            vertex_count = Some(count);
        } else if line.starts_with(FORMAT) {
            format = line.split(' ').nth(1).map(|kind| match kind {
                "ascii" => PlyFormat::Ascii,
                "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                other => PlyFormat::Other(other.to_string()),
            });
        }
    }

    let vertex_count = vertex_count
        .ok_or_else(|| SplatError::InvalidVertexCount(format!("no `{ELEMENT_VERTEX}` line")))?;

    let header = PlyHeader {
        vertex_count,
        format,
        header_bytes: reader.offset(),
    };

    debug!(
        vertex_count = header.vertex_count,
        format = ?header.format,
        header_bytes = header.header_bytes,
        "parsed splat ply header",
    );

    Ok(header)
}


/// Decoder for the gaussian splat flavour of ply.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplatDecoder {
    stream_len: Option<u64>,
}

impl SplatDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stream length, enables the up-front body length check.
    pub fn with_stream_len(mut self, stream_len: u64) -> Self {
        self.stream_len = Some(stream_len);
        self
    }

    /// Picks the binary or text body from the header's `format` line.
    pub fn decode<R: BufRead>(&self, reader: R) -> Result<SplatCollection> {
        let mut reader = PlyReader::new(reader);
        let header = parse_header(&mut reader)?;

        if header.is_ascii() {
            read_text_body(&mut reader, &header)
        } else {
            self.read_binary_body(&mut reader, &header)
        }
    }

    pub fn decode_binary<R: BufRead>(&self, reader: R) -> Result<SplatCollection> {
        let mut reader = PlyReader::new(reader);
        let header = parse_header(&mut reader)?;
        self.read_binary_body(&mut reader, &header)
    }

    pub fn decode_text<R: BufRead>(&self, reader: R) -> Result<SplatCollection> {
        let mut reader = PlyReader::new(reader);
        let header = parse_header(&mut reader)?;
        read_text_body(&mut reader, &header)
    }

    fn read_binary_body<R: BufRead>(
        &self,
        reader: &mut PlyReader<R>,
        header: &PlyHeader,
    ) -> Result<SplatCollection> {
        let expected = header.vertex_count;
        let body_bytes = u64::from(expected) * RECORD_BYTES;

        if let Some(stream_len) = self.stream_len {
            let remaining = stream_len.saturating_sub(reader.offset());
            if remaining < body_bytes {
                return Err(SplatError::TruncatedBody {
                    record: (remaining / RECORD_BYTES) as u32,
                    expected,
                });
            }
            if remaining > body_bytes {
                debug!(trailing_bytes = remaining - body_bytes, "ignoring bytes after splat records");
            }
        }

        let mut records = Vec::with_capacity((expected as usize).min(MAX_PREALLOCATED_RECORDS));
        for record in 0..expected {
            let splat = read_binary_record(reader).map_err(|err| match err {
                SplatError::UnexpectedEndOfStream { .. } => SplatError::TruncatedBody {
                    record,
                    expected,
                },
                err => err,
            })?;
            records.push(splat);
        }

        Ok(SplatCollection::new(records))
    }
}


pub fn decode_ply<R: BufRead>(reader: R) -> Result<SplatCollection> {
    SplatDecoder::new().decode(reader)
}

pub fn decode_binary_ply<R: BufRead>(reader: R) -> Result<SplatCollection> {
    SplatDecoder::new().decode_binary(reader)
}

pub fn decode_text_ply<R: BufRead>(reader: R) -> Result<SplatCollection> {
    SplatDecoder::new().decode_text(reader)
}


fn read_binary_record<R: BufRead>(reader: &mut PlyReader<R>) -> Result<SplatRecord> {
    let position = reader.read_vec3()?;
    reader.skip(NORMAL_BYTES)?;

    let [r, g, b] = reader.read_vec3()?;
    reader.skip(SH_REST_BYTES)?;

    let opacity = reader.read_f32()?;
    let scale = reader.read_vec3()?;
    reader.skip(ROTATION_BYTES)?;

    Ok(SplatRecord::new(position, isotropic_size(scale), [r, g, b, opacity]))
}

fn read_text_body<R: BufRead>(
    reader: &mut PlyReader<R>,
    header: &PlyHeader,
) -> Result<SplatCollection> {
    let expected = header.vertex_count as usize;
    let mut records = Vec::with_capacity(expected.min(MAX_PREALLOCATED_RECORDS));

    let mut line_index = 0;
    while records.len() < expected {
        let Some(line) = reader.read_body_line()? else {
            break;
        };

        if let Some(record) = parse_text_record(&line, line_index)? {
            records.push(record);
        } else {
            trace!(line = line_index, "skipping short splat line");
        }

        line_index += 1;
    }

    Ok(SplatCollection::new(records))
}

/// `Ok(None)` for lines with too few fields to be a splat.
pub fn parse_text_record(line: &str, line_index: usize) -> Result<Option<SplatRecord>> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    if tokens.len() < MIN_TEXT_FIELDS {
        return Ok(None);
    }

    let field = |i: usize| -> Result<f32> {
        tokens[i]
            .parse::<f32>()
            .map_err(|_| SplatError::InvalidRecordField { line: line_index })
    };

    let position = [field(0)?, field(1)?, field(2)?];
    let color = [field(6)?, field(7)?, field(8)?, 1.0];
    let scale = [field(9)?, field(10)?, field(11)?];

    Ok(Some(SplatRecord::new(position, isotropic_size(scale), color)))
}
