use super::error::{ModuleError, Result};

/// Marker byte that introduces an escape triple (marker, symbol, count).
pub const ESCAPE: u8 = 0;
/// Shortest run of a non-zero byte that is worth an escape triple.
const MIN_RUN: usize = 4;
/// Longest run one triple can describe.
const MAX_RUN: usize = 255;

const KIB: usize = 1024;
/// Decode buffer tiers. Each tier covers blocks up to 64KiB, 640KiB, 8MiB and 64MiB, plus 1KiB.
const TIERS: [usize; 4] = [
    64 * KIB + KIB,
    640 * KIB + KIB,
    8 * KIB * KIB + KIB,
    64 * KIB * KIB + KIB,
];

/*
Logic: Walk the block, counting how many times the current byte repeats (at most 255).
A run of 4 or more, or any zero byte at all, is written as the triple 0, byte, count and the
index jumps past the whole run. Anything else is copied as one literal and the index moves on
by a single byte, so a run of 2 or 3 is re-counted from each position. Zero can never be a
literal because it is the escape marker.
*/
/// Encode the first `limit` bytes of a block into escape triples and literals.
pub fn rle_encode(block: &[u8], limit: usize) -> Vec<u8> {
    let end = block.len().min(limit);
    // Worst case is every byte an isolated zero, three bytes each.
    let mut out = Vec::with_capacity(end + end / 2);
    let mut idx = 0;

    while idx < end {
        let reps = count_dups(&block[..end], idx);
        if reps >= MIN_RUN || block[idx] == ESCAPE {
            out.extend_from_slice(&[ESCAPE, block[idx], reps as u8]);
            idx += reps;
        } else {
            out.push(block[idx]);
            idx += 1;
        }
    }
    out
}

/// Helper function for rle_encode to count how many identical bytes start at i (1-255).
fn count_dups(v: &[u8], i: usize) -> usize {
    v.iter()
        .skip(i)
        .take(MAX_RUN)
        .position(|&x| x != v[i])
        .unwrap_or_else(|| (v.len() - i).min(MAX_RUN))
}

/// Output buffer for the decoder. Starts at the tier matching the encoded size and is
/// promoted one tier at a time; outgrowing the last tier means the block is not ours.
#[derive(Debug)]
pub struct TieredBuffer {
    data: Vec<u8>,
    tier: usize,
}

impl TieredBuffer {
    /// Pick the starting tier from the size of the encoded block.
    pub fn for_encoded_len(encoded_len: usize) -> Result<Self> {
        let tier = match encoded_len {
            n if n <= 64 * KIB => 0,
            n if n <= 640 * KIB => 1,
            n if n <= 8 * KIB * KIB => 2,
            _ => 3,
        };
        let mut data = Vec::new();
        data.try_reserve_exact(TIERS[tier])
            .map_err(|_| ModuleError::OutOfMemory {
                requested: TIERS[tier],
            })?;
        Ok(Self { data, tier })
    }

    /// Current tier ceiling in bytes.
    pub fn limit(&self) -> usize {
        TIERS[self.tier]
    }

    /// Make room for `extra` more bytes, promoting through the tiers as needed.
    fn make_room(&mut self, extra: usize) -> Result<()> {
        while self.data.len() + extra > TIERS[self.tier] {
            if self.tier == TIERS.len() - 1 {
                return Err(ModuleError::unrecognizable(format!(
                    "decoded block exceeds {} bytes",
                    TIERS[self.tier]
                )));
            }
            self.tier += 1;
            let wanted = TIERS[self.tier] - self.data.len();
            self.data
                .try_reserve_exact(wanted)
                .map_err(|_| ModuleError::OutOfMemory { requested: wanted })?;
        }
        Ok(())
    }

    /// Append `count` copies of `symbol`.
    pub fn push_run(&mut self, symbol: u8, count: usize) -> Result<()> {
        self.make_room(count)?;
        self.data.resize(self.data.len() + count, symbol);
        Ok(())
    }

    pub fn push(&mut self, symbol: u8) -> Result<()> {
        self.push_run(symbol, 1)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Expand the first `encoded_len` bytes of an RLE block back to the original bytes.
pub fn rle_decode(encoded: &[u8], encoded_len: usize) -> Result<Vec<u8>> {
    if encoded_len > encoded.len() {
        return Err(ModuleError::stream(format!(
            "expected {} encoded bytes, found {}",
            encoded_len,
            encoded.len()
        )));
    }
    let v = &encoded[..encoded_len];
    let mut out = TieredBuffer::for_encoded_len(encoded_len)?;
    let mut idx = 0;

    while idx < v.len() {
        if v[idx] == ESCAPE {
            // A marker always carries the symbol and the count behind it
            if idx + 2 >= v.len() {
                return Err(ModuleError::unrecognizable(format!(
                    "escape marker truncated at offset {}",
                    idx
                )));
            }
            out.push_run(v[idx + 1], v[idx + 2] as usize)?;
            idx += 3;
        } else {
            out.push(v[idx])?;
            idx += 1;
        }
    }
    Ok(out.into_inner())
}
