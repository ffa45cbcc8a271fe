//! Binary trie used to turn packed Shafa bits back into bytes.
//!
//! Nodes live in one arena and point to their children by index, so a block's trie is dropped
//! (or cleared for reuse) in one go. Bit 0 steps left, bit 1 steps right, and every leaf holds
//! one symbol.
//!

use log::trace;

use super::code_table::CodeTable;
use crate::bitstream::bitreader::BitReader;
use crate::tools::error::{ModuleError, Result};

const ROOT: usize = 0;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    /// Left (bit 0) and right (bit 1) children
    kids: [Option<usize>; 2],
    symbol: Option<u8>,
}

impl TrieNode {
    fn is_leaf(&self) -> bool {
        self.kids == [None, None]
    }
}

#[derive(Debug)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

impl Default for DecodeTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeTrie {
    /// A trie holding only its root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Build the trie for one block. Symbols are inserted in ascending order.
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        let mut trie = Self::new();
        trie.rebuild(table)?;
        Ok(trie)
    }

    /// Drop every node but the root, keeping the arena's allocation.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT] = TrieNode::default();
    }

    /// Clear and refill from another block's code table.
    pub fn rebuild(&mut self, table: &CodeTable) -> Result<()> {
        self.clear();
        for (symbol, code) in table.coded() {
            self.insert(code, symbol)?;
        }
        trace!("\rDecode trie has {} nodes", self.nodes.len());
        Ok(())
    }

    /// True if no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].is_leaf()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Walk (and grow) the path for `code`, then hang `symbol` at its end.
    fn insert(&mut self, code: &str, symbol: u8) -> Result<()> {
        let mut node = ROOT;
        for c in code.bytes() {
            if self.nodes[node].symbol.is_some() {
                return Err(not_prefix_free(symbol));
            }
            let side = usize::from(c == b'1');
            node = match self.nodes[node].kids[side] {
                Some(kid) => kid,
                None => {
                    self.nodes.push(TrieNode::default());
                    let kid = self.nodes.len() - 1;
                    self.nodes[node].kids[side] = Some(kid);
                    kid
                }
            };
        }
        // The end of the path must be a fresh node
        if node == ROOT || !self.nodes[node].is_leaf() || self.nodes[node].symbol.is_some() {
            return Err(not_prefix_free(symbol));
        }
        self.nodes[node].symbol = Some(symbol);
        Ok(())
    }

    /// Decode `expected_len` symbols from a packed block.
    pub fn decode_block(&self, packed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.try_reserve_exact(expected_len)
            .map_err(|_| ModuleError::OutOfMemory {
                requested: expected_len,
            })?;
        if expected_len == 0 {
            return Ok(out);
        }
        if self.is_empty() {
            return Err(ModuleError::unrecognizable(
                "block has data but its code table is empty",
            ));
        }

        let mut br = BitReader::new(packed);
        let mut node = ROOT;
        while out.len() < expected_len {
            let bit = br.bit().ok_or_else(|| {
                ModuleError::unrecognizable(format!(
                    "packed block ran out after {} of {} symbols",
                    out.len(),
                    expected_len
                ))
            })?;
            node = self.nodes[node].kids[bit].ok_or_else(|| {
                ModuleError::unrecognizable(format!("no code matches the bits at {}", br.loc()))
            })?;
            if self.nodes[node].is_leaf() {
                // Leaves always carry a symbol once insert() succeeded
                let symbol = self.nodes[node]
                    .symbol
                    .ok_or_else(|| ModuleError::unrecognizable("leaf without a symbol"))?;
                out.push(symbol);
                node = ROOT;
            }
        }
        Ok(out)
    }
}

fn not_prefix_free(symbol: u8) -> ModuleError {
    ModuleError::unrecognizable(format!(
        "code for symbol {} clashes with another code",
        symbol
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::freq_count::SYMBOLS;

    fn table(pairs: &[(u8, &str)]) -> CodeTable {
        let mut codes = vec![String::new(); SYMBOLS];
        pairs
            .iter()
            .for_each(|&(s, c)| codes[s as usize] = c.to_string());
        CodeTable::from_codes(codes)
    }

    #[test]
    fn decodes_a_block() {
        let trie =
            DecodeTrie::from_code_table(&table(&[(b'x', "0"), (b'a', "10"), (b'b', "11")])).unwrap();
        assert_eq!(trie.node_count(), 5);
        // x a b x x a -> 0 10 11 0 0 10 -> 0101_1001 0(000_0000)
        let out = trie.decode_block(&[0b0101_1001, 0b0000_0000], 6).unwrap();
        assert_eq!(out, b"xabxxa");
    }

    #[test]
    fn stops_at_the_expected_count() {
        let trie = DecodeTrie::from_code_table(&table(&[(b'0', "0"), (b'1', "1")])).unwrap();
        // Padding bits past the last symbol are never read
        assert_eq!(trie.decode_block(&[0b1010_1111], 4).unwrap(), b"1010");
    }

    #[test]
    fn running_out_is_an_error() {
        let trie = DecodeTrie::from_code_table(&table(&[(1, "0"), (2, "1")])).unwrap();
        assert!(trie.decode_block(&[0xff], 9).is_err());
    }

    #[test]
    fn missing_branch_is_an_error() {
        let trie = DecodeTrie::from_code_table(&table(&[(1, "00"), (2, "01")])).unwrap();
        assert!(matches!(
            trie.decode_block(&[0b1000_0000], 1),
            Err(ModuleError::FileUnrecognizable(_))
        ));
    }

    #[test]
    fn clashing_codes_are_rejected() {
        assert!(DecodeTrie::from_code_table(&table(&[(1, "0"), (2, "01")])).is_err());
        assert!(DecodeTrie::from_code_table(&table(&[(1, "01"), (2, "0")])).is_err());
        assert!(DecodeTrie::from_code_table(&table(&[(1, "1"), (2, "1")])).is_err());
    }

    #[test]
    fn empty_table() {
        let trie = DecodeTrie::from_code_table(&table(&[])).unwrap();
        assert!(trie.is_empty());
        assert!(trie.decode_block(&[], 0).unwrap().is_empty());
        assert!(trie.decode_block(&[0], 1).is_err());
    }

    #[test]
    fn rebuild_reuses_the_arena() {
        let mut trie = DecodeTrie::from_code_table(&table(&[(1, "0"), (2, "10"), (3, "11")])).unwrap();
        trie.rebuild(&table(&[(7, "0"), (8, "1")])).unwrap();
        assert_eq!(trie.node_count(), 3);
        assert_eq!(trie.decode_block(&[0b0110_0000], 3).unwrap(), vec![7, 8, 8]);
        trie.clear();
        assert!(trie.is_empty());
    }
}
