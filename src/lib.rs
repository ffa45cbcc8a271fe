//! Shafa, a block file compressor.
//!
//! Version 0.1.0
//!
//! Files are cut into blocks (64KiB by default). Each block may be run-length encoded, then
//! gets its own Shannon-Fano code table, and is finally packed into a bitstream. Every stage
//! leaves its output next to the input so the stages can also be run one at a time.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> shafa test.txt`
//!
//! This writes test.txt.freq (or test.txt.rle and test.txt.rle.freq), the code tables in a
//! .cod file and the packed data in a .sf file. To get the original back:
//!
//! `$> shafa -m d test.txt.sf`
//!
pub mod bitstream;
pub mod compression;
pub mod shannon_fano;
pub mod tools;
