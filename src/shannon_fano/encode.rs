use crate::bitstream::bitpacker::BitPacker;
use crate::tools::error::{ModuleError, Result};

use super::code_table::CodeTable;

/// Replace every byte of a block by its code, packed most significant bit first. The last
/// byte is padded with zero bits.
pub fn pack_block(block: &[u8], table: &CodeTable) -> Result<Vec<u8>> {
    // A rough guess; blocks worth compressing shrink
    let mut bp = BitPacker::new(block.len() / 2 + 1);
    for (i, &byte) in block.iter().enumerate() {
        let code = table.code(byte);
        if code.is_empty() {
            if table.coded().next().is_none() {
                return Err(ModuleError::unrecognizable(format!(
                    "block has a single distinct symbol (byte {}), which gets an empty code; \
                     enable RLE with -c r or change the block size",
                    byte
                )));
            }
            return Err(ModuleError::unrecognizable(format!(
                "byte {} at offset {} has no code",
                byte, i
            )));
        }
        bp.push_code(code.as_bytes());
    }
    bp.flush();
    Ok(bp.output)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shannon_fano::codes::shafa_codes;
    use crate::shannon_fano::decode_trie::DecodeTrie;
    use crate::tools::freq_count::freqs;

    #[test]
    fn packs_msb_first() {
        let block = b"xabxxa";
        let mut f = freqs(block);
        // Force the skewed layout x=0, a=10, b=11
        f[b'x' as usize] = 10;
        let table = shafa_codes(&f);
        assert_eq!(pack_block(block, &table).unwrap(), vec![0b0101_1001, 0]);
    }

    #[test]
    fn uncoded_byte_is_rejected() {
        let table = shafa_codes(&freqs(b"aab"));
        assert!(pack_block(b"abc", &table).is_err());
    }

    #[test]
    fn single_symbol_block_says_why() {
        let table = shafa_codes(&freqs(b"qqqq"));
        match pack_block(b"qqqq", &table) {
            Err(ModuleError::FileUnrecognizable(msg)) => {
                assert!(msg.contains("single distinct symbol"), "{}", msg);
                assert!(msg.contains("byte 113"), "{}", msg);
            }
            other => panic!("expected an unrecognizable block, got {:?}", other),
        }
    }

    #[test]
    fn round_trip_through_the_trie() {
        let block = b"it was the best of times, it was the worst of times".to_vec();
        let table = shafa_codes(&freqs(&block));
        let packed = pack_block(&block, &table).unwrap();
        assert!(packed.len() < block.len());
        let trie = DecodeTrie::from_code_table(&table).unwrap();
        assert_eq!(trie.decode_block(&packed, block.len()).unwrap(), block);
    }
}
