//! The bitstream module forms the I/O subsystem for the Shafa file compressor.
//!
//! Every stage reads and writes files made of `@`-separated text headers followed by a body per
//! block. The `fields` reader and writers handle the headers for all of them.
//!
//! The packed `.sf` file is the only one whose bodies are bits rather than text. BitPacker turns
//! a block's codes into bytes, BitWriter frames those bytes into the stream, and BitReader walks
//! them back one bit at a time for the decoder.
//!
pub mod bitpacker;
pub mod bitreader;
pub mod bitwriter;
pub mod fields;
