//! Reader and writer for the `@`-delimited headers shared by the `.freq`, `.cod` and `.sf` files.
//!
//! Layouts (one header, then one body per block):
//! - `.freq` / `.cod`: `@<mode>@<n_blocks>` then `@<block_size>@<text>` ... then `@0`
//! - `.sf`: `@<n_blocks>` then `@<packed_len>@<raw bytes>` ...
//!
//! Text bodies never contain `@`, so they run to the next separator. Raw bodies may contain
//! anything and are read by length.

use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::tools::error::{ModuleError, Result};

pub const FIELD_SEP: u8 = b'@';

/// What a table in a `.freq` or `.cod` file was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// The uncompressed block
    Normal,
    /// The RLE-compressed block
    Rle,
}

impl TableMode {
    pub fn letter(self) -> u8 {
        match self {
            TableMode::Normal => b'N',
            TableMode::Rle => b'R',
        }
    }

    pub fn from_letter(letter: u8) -> Result<Self> {
        match letter {
            b'N' => Ok(TableMode::Normal),
            b'R' => Ok(TableMode::Rle),
            other => Err(ModuleError::unrecognizable(format!(
                "mode {:?} is neither N nor R",
                other as char
            ))),
        }
    }
}

impl Display for TableMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter() as char)
    }
}

/// Cursor over the bytes of a whole header-and-body file.
#[derive(Debug)]
pub struct FieldReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Consume one `@`.
    pub fn separator(&mut self) -> Result<()> {
        match self.data.get(self.cursor) {
            Some(&FIELD_SEP) => {
                self.cursor += 1;
                Ok(())
            }
            Some(&c) => Err(ModuleError::stream(format!(
                "expected '@' at offset {}, found {:?}",
                self.cursor, c as char
            ))),
            None => Err(ModuleError::stream(format!(
                "expected '@' at offset {}, found end of file",
                self.cursor
            ))),
        }
    }

    /// Read an unsigned decimal number.
    pub fn number(&mut self) -> Result<usize> {
        let digits = self.data[self.cursor..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits == 0 {
            return Err(ModuleError::stream(format!(
                "expected a number at offset {}",
                self.cursor
            )));
        }
        let text = &self.data[self.cursor..self.cursor + digits];
        self.cursor += digits;
        std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ModuleError::stream("number out of range"))
    }

    /// Read the `@<mode>@<n_blocks>` header of a table file.
    pub fn table_header(&mut self) -> Result<(TableMode, usize)> {
        self.separator()?;
        let letter = *self
            .data
            .get(self.cursor)
            .ok_or_else(|| ModuleError::stream("missing mode"))?;
        self.cursor += 1;
        let mode = TableMode::from_letter(letter)?;
        self.separator()?;
        Ok((mode, self.number()?))
    }

    /// Read a `@<number>@` block header.
    pub fn block_header(&mut self) -> Result<usize> {
        self.separator()?;
        let n = self.number()?;
        self.separator()?;
        Ok(n)
    }

    /// Everything up to (not including) the next `@`, or to the end of the data.
    pub fn text(&mut self) -> &'a [u8] {
        let len = self.data[self.cursor..]
            .iter()
            .position(|&c| c == FIELD_SEP)
            .unwrap_or(self.data.len() - self.cursor);
        let text = &self.data[self.cursor..self.cursor + len];
        self.cursor += len;
        text
    }

    /// Exactly `n` raw bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.data.len() - self.cursor;
        if n > available {
            return Err(ModuleError::stream(format!(
                "expected {} bytes at offset {}, only {} left",
                n, self.cursor, available
            )));
        }
        let bytes = &self.data[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(bytes)
    }

    /// Read the `@0` that closes a table file.
    pub fn terminator(&mut self) -> Result<()> {
        self.separator()?;
        match self.number()? {
            0 => Ok(()),
            n => Err(ModuleError::stream(format!(
                "expected the closing @0, found a block of {} bytes",
                n
            ))),
        }
    }

    /// Bytes not read yet.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Debugging function. Report current position in the data.
    pub fn loc(&self) -> String {
        format!("[{}]", self.cursor)
    }
}

/// Write `@<mode>@<n_blocks>`.
pub fn write_table_header<W: Write>(out: &mut W, mode: TableMode, n_blocks: usize) -> Result<()> {
    write!(out, "@{}@{}", mode, n_blocks)?;
    Ok(())
}

/// Write `@<n>@`, the header in front of every block body.
pub fn write_block_header<W: Write>(out: &mut W, n: usize) -> Result<()> {
    write!(out, "@{}@", n)?;
    Ok(())
}

/// Write the `@0` that closes a table file.
pub fn write_terminator<W: Write>(out: &mut W) -> Result<()> {
    out.write_all(b"@0")?;
    Ok(())
}

/// Writes a `.freq` or `.cod` table file: the header first, then one text body per block,
/// then the closing `@0`.
pub struct TableWriter<W: Write> {
    out: W,
    n_blocks: usize,
    written: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(mut out: W, mode: TableMode, n_blocks: usize) -> Result<Self> {
        write_table_header(&mut out, mode, n_blocks)?;
        Ok(Self {
            out,
            n_blocks,
            written: 0,
        })
    }

    /// Add the body for a block of `size` bytes.
    pub fn add_block(&mut self, size: usize, text: &[u8]) -> Result<()> {
        if self.written == self.n_blocks {
            return Err(ModuleError::stream(format!(
                "header announced {} blocks",
                self.n_blocks
            )));
        }
        write_block_header(&mut self.out, size)?;
        self.out.write_all(text)?;
        self.written += 1;
        Ok(())
    }

    /// Close the table and hand back the writer. Every announced block must have been added.
    pub fn finish(mut self) -> Result<W> {
        if self.written != self.n_blocks {
            return Err(ModuleError::stream(format!(
                "wrote {} of {} blocks",
                self.written, self.n_blocks
            )));
        }
        write_terminator(&mut self.out)?;
        self.out.flush()?;
        Ok(self.out)
    }
}
