//! The compression module drives the Shafa stages over whole files.
//!
//! Compression happens in three stages, each reading and writing files next to the input:
//! - Stage f (compress): split the input into blocks, run-length encode them when that pays off,
//!   and write the frequency table of every block.
//! - Stage t (shafa_codes): build a Shannon-Fano code table for every block from its frequencies.
//! - Stage c (shafa_encode): replace every byte by its code and pack the bits.
//!
//! Decompression (decompress) reverses the last stage with a decode trie per block, then expands
//! the RLE blocks when the codes were computed from RLE data.
//!
//! Blocks are processed one after another. A failure on any block aborts the whole file.
//!

pub mod compress;
pub mod decompress;
pub mod shafa_codes;
pub mod shafa_encode;
