use super::error::{ModuleError, Result};

pub const KIB: usize = 1024;
/// Smallest input worth splitting into blocks; also the smallest final block kept on its own.
pub const MIN_BLOCK: usize = KIB;

/// Block sizes a user can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSize {
    /// 64KiB
    #[default]
    Small,
    /// 640KiB
    Medium,
    /// 8MiB
    Large,
    /// 64MiB
    Huge,
}

impl BlockSize {
    pub fn bytes(self) -> usize {
        match self {
            BlockSize::Small => 64 * KIB,
            BlockSize::Medium => 640 * KIB,
            BlockSize::Large => 8 * KIB * KIB,
            BlockSize::Huge => 64 * KIB * KIB,
        }
    }

    /// Map the single letter used on the command line.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'K' => Some(BlockSize::Medium),
            'm' => Some(BlockSize::Large),
            'M' => Some(BlockSize::Huge),
            _ => None,
        }
    }
}

/// Ordered pre-encoding length of every block in a file.
pub type BlockLedger = Vec<usize>;

/// Split a file of `file_size` bytes into blocks of `block_size`. A final block under
/// 1KiB is folded into the one before it.
pub fn split_blocks(file_size: usize, block_size: usize) -> BlockLedger {
    if file_size == 0 || block_size == 0 {
        return Vec::new();
    }
    let mut ledger = vec![block_size; file_size / block_size];
    let rest = file_size % block_size;
    if rest == 0 {
        return ledger;
    }
    if rest < MIN_BLOCK && !ledger.is_empty() {
        let last = ledger.len() - 1;
        ledger[last] += rest;
    } else {
        ledger.push(rest);
    }
    ledger
}

/// Refuse inputs below the 1KiB floor.
pub fn check_min_size(file_size: u64) -> Result<()> {
    if file_size < MIN_BLOCK as u64 {
        return Err(ModuleError::FileTooSmall {
            size: file_size,
            minimum: MIN_BLOCK as u64,
        });
    }
    Ok(())
}
