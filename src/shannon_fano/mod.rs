//! The shannon_fano module holds the entropy coder of the Shafa file compressor.
//!
//! Each block is coded on its own. Its frequency table is turned into a prefix-free code table
//! (codes), the table is stored as text in the `.cod` file (code_table), the block is packed
//! into bits with those codes (encode), and a trie built from the same table walks the bits
//! back into bytes (decode_trie).
//!
//! The process of coding each block is inherently sequential. Blocks do not share any state.
//!

pub mod code_table;
pub mod codes;
pub mod decode_trie;
pub mod encode;
