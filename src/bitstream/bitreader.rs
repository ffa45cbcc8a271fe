//! BitReader: A module for the Shafa file compressor.
//!
//! Reads the packed bits of one Shafa block, most significant bit first.
//!
//! NOTE: A block is always read into memory whole before decoding, so this reader works on a
//! byte slice rather than an I/O source.
//!

const TOP_BIT: u8 = 0x80;

/// Reads a packed Shafa block.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    mask: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader positioned on the top bit of the first byte.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            mask: TOP_BIT,
        }
    }

    /// Return Option<bool> *true* if the next bit is 1, *false* if 0, consuming the bit,
    /// or None if there is no more data to read
    pub fn bool_bit(&mut self) -> Option<bool> {
        let byte = *self.buffer.get(self.cursor)?;
        let bit = byte & self.mask != 0;
        // Step down one bit, moving to the next byte after the lowest one
        self.mask >>= 1;
        if self.mask == 0 {
            self.mask = TOP_BIT;
            self.cursor += 1;
        }
        Some(bit)
    }

    /// Return bit as Option<usize> (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> Option<usize> {
        self.bool_bit().map(usize::from)
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.mask.leading_zeros())
    }
}
