use std::io::Write;

use super::fields::write_block_header;
use crate::tools::error::{ModuleError, Result};

/// Writes a `.sf` stream. Takes the blocks packed by BitPacker and frames each one with
/// its packed length after the stream header.
pub struct BitWriter<W: Write> {
    /// Handle to the output stream
    writer: W,
    /// Block count announced in the header.
    n_blocks: usize,
    /// Blocks written so far.
    written: usize,
    /// Bytes written so far, headers included.
    bytes_out: usize,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter and write the `@<n_blocks>` header. Use add_block() to add
    /// each block to the stream.
    pub fn new(mut writer: W, n_blocks: usize) -> Result<Self> {
        let header = format!("@{}", n_blocks);
        writer.write_all(header.as_bytes())?;
        Ok(Self {
            writer,
            n_blocks,
            written: 0,
            bytes_out: header.len(),
        })
    }

    /// Add a packed block to the output. Returns the bytes written for it.
    pub fn add_block(&mut self, data: &[u8]) -> Result<usize> {
        if self.written == self.n_blocks {
            return Err(ModuleError::stream(format!(
                "header announced {} blocks",
                self.n_blocks
            )));
        }
        let mut header = Vec::with_capacity(16);
        write_block_header(&mut header, data.len())?;
        self.writer.write_all(&header)?;
        self.writer.write_all(data)?;
        self.written += 1;
        self.bytes_out += header.len() + data.len();
        Ok(header.len() + data.len())
    }

    /// Total bytes written so far.
    pub fn bytes_out(&self) -> usize {
        self.bytes_out
    }

    /// Flush the stream and hand back the writer. Every announced block must have been added.
    pub fn finish(mut self) -> Result<W> {
        if self.written != self.n_blocks {
            return Err(ModuleError::stream(format!(
                "wrote {} of {} blocks",
                self.written, self.n_blocks
            )));
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
