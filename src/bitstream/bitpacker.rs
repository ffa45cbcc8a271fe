/// Packs Shannon-Fano code bits into bytes, most significant bit first.
pub struct BitPacker {
    pub output: Vec<u8>,
    /// Number of bits that were valid in the last byte after flush() (0 means all 8).
    pub last_bits: u8,
    queue: u64,
    q_bits: u8,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of size specified. Call flush() to
    /// flush the bit queue to the buffer before taking the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            last_bits: 0,
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all push functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Puts a single bit on the stream.
    pub fn push_bit(&mut self, bit: bool) {
        self.queue = (self.queue << 1) | bit as u64;
        self.q_bits += 1;
        self.write_stream();
    }

    /// Puts a code on the stream. The code is a string of '0' and '1' characters.
    pub fn push_code(&mut self, code: &[u8]) {
        for &c in code {
            self.push_bit(c == b'1');
        }
    }

    /// Flushes the remaining bits (1-7) from the buffer, padding with 0s in the least
    /// signficant bits
    pub fn flush(&mut self) {
        self.last_bits = self.q_bits % 8;
        if self.q_bits > 0 {
            self.queue <<= 8 - self.q_bits; //pad the queue with zeros
            self.q_bits += 8 - self.q_bits;
            self.write_stream(); // write out all that is left
        }
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.output.len(), self.q_bits)
    }
}

#[cfg(test)]
mod test {
    use super::BitPacker;

    #[test]
    fn push_code_test() {
        let mut bp = BitPacker::new(100);
        bp.push_code(b"0010");
        bp.push_code(b"0001");
        bp.push_code(b"0010");
        bp.push_code(b"0000");
        bp.flush();
        assert_eq!(bp.output, "! ".as_bytes());
        assert_eq!(bp.last_bits, 0);
    }

    #[test]
    fn padding_and_loc_test() {
        let mut bp = BitPacker::new(100);
        bp.push_code(b"111");
        assert_eq!("[0.3]", &bp.loc());
        bp.push_code(b"11111");
        bp.push_code(b"1");
        assert_eq!("[1.1]", &bp.loc());
        bp.flush();
        assert_eq!(bp.output, vec![0xff, 0x80]);
        assert_eq!(bp.last_bits, 1);
    }

    #[test]
    fn long_codes() {
        let mut bp = BitPacker::new(100);
        let code = [b"1".repeat(70), b"0".repeat(2)].concat();
        bp.push_code(&code);
        bp.flush();
        assert_eq!(bp.output, vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfc]);
    }
}
