use std::io::{
    self,
    BufRead,
    ErrorKind,
    Read,
};

use crate::error::{
    Result,
    SplatError,
};


/// Longest header line accepted, newline excluded.
pub const MAX_HEADER_LINE_BYTES: u64 = 4096;


/// Forward-only cursor over a ply byte stream.
pub struct PlyReader<R> {
    inner: R,
    offset: u64,
}

impl<R: BufRead> PlyReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_exhausted(&mut self) -> Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    /// Header line without its `\n` (and `\r`, if present).
    pub fn read_line(&mut self) -> Result<String> {
        let start = self.offset;

        let mut bytes = Vec::new();
        let read = self
            .inner
            .by_ref()
            .take(MAX_HEADER_LINE_BYTES + 1)
            .read_until(b'\n', &mut bytes)?;
        self.offset += read as u64;

        if bytes.pop() != Some(b'\n') {
            return Err(SplatError::MalformedHeader { offset: start });
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        if !bytes.is_ascii() {
            return Err(SplatError::MalformedHeader { offset: start });
        }

        String::from_utf8(bytes).map_err(|_| SplatError::MalformedHeader { offset: start })
    }

    /// Next text body line, `None` once the stream is drained. The last line
    /// may omit its newline.
    pub fn read_body_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.inner.read_line(&mut line)?;
        self.offset += read as u64;

        if read == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);

        Ok(Some(line))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let mut bytes = [0u8; 4];
        match self.inner.read_exact(&mut bytes) {
            Ok(()) => {
                self.offset += 4;
                Ok(f32::from_le_bytes(bytes))
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                Err(SplatError::UnexpectedEndOfStream { offset: self.offset })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        let skipped = io::copy(&mut self.inner.by_ref().take(n), &mut io::sink())?;
        self.offset += skipped;

        if skipped < n {
            return Err(SplatError::UnexpectedEndOfStream { offset: self.offset });
        }

        Ok(())
    }
}
