//! The tools module provides the helpers shared by every stage of the Shafa compressor.
//!
//! The tools are:
//! - blocks: Block sizes, block splitting and the size floor.
//! - cli: Command line interface and runtime options.
//! - error: Error kinds and file helpers.
//! - extensions: Suffixes of the intermediate files.
//! - freq_count: Frequency count of a block and its text form.
//! - rle: Run-Length-Encoding with escape triples.
//!
pub mod blocks;
pub mod cli;
pub mod error;
pub mod extensions;
pub mod freq_count;
pub mod rle;
