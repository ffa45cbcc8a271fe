//! Shannon-Fano code assignment for one block.
//!
//! Symbols are ranked by falling frequency and the ranked list is split recursively in two
//! groups of roughly equal weight. Every split appends a '0' to the codes on the left and a '1'
//! to the codes on the right, so the codes form a prefix-free set by construction.
//!

use log::trace;

use super::code_table::CodeTable;
use crate::tools::freq_count::{Freqs, SYMBOLS};

/// One entry of the ranked alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub symbol: u8,
    pub freq: u32,
}

/// Rank all 256 symbols by descending frequency. Ties keep ascending symbol order.
pub fn rank_symbols(freqs: &Freqs) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = freqs
        .iter()
        .enumerate()
        .map(|(symbol, &freq)| Ranked {
            symbol: symbol as u8,
            freq,
        })
        .collect();
    // sort_by is stable, so equal frequencies stay in symbol order
    ranked.sort_by(|a, b| b.freq.cmp(&a.freq));
    ranked
}

/// Highest rank with a non-zero frequency, or None for an empty block.
pub fn last_nonzero(ranked: &[Ranked]) -> Option<usize> {
    ranked.iter().rposition(|r| r.freq > 0)
}

/*
Scan from the left, adding each frequency to a running sum and measuring how far twice that sum
is from the total. The scan stops at the first rank that does not make the imbalance strictly
smaller, and the split falls after the last rank that did. An equal imbalance is not progress,
so a tie between two splits keeps the left one. Existing .cod files depend on this exact choice.
*/
/// Find the last rank of the left group for the closed rank interval [first, last].
pub fn best_division(ranked: &[Ranked], first: usize, last: usize) -> usize {
    if first >= last {
        return first;
    }
    let total: u64 = ranked[first..=last].iter().map(|r| r.freq as u64).sum();
    let mut min_imbalance = total;
    let mut running = 0_u64;
    let mut division = first;

    for (rank, r) in ranked.iter().enumerate().take(last + 1).skip(first) {
        running += r.freq as u64;
        let imbalance = (2 * running).abs_diff(total);
        if imbalance >= min_imbalance {
            break;
        }
        min_imbalance = imbalance;
        division = rank;
    }
    // Both groups must be non-empty
    division.min(last - 1)
}

/// Recursively split [first, last], appending one bit per level to the codes (indexed by rank).
fn split(ranked: &[Ranked], codes: &mut [String], first: usize, last: usize) {
    if first >= last {
        return;
    }
    let div = best_division(ranked, first, last);
    codes[first..=div].iter_mut().for_each(|c| c.push('0'));
    codes[div + 1..=last].iter_mut().for_each(|c| c.push('1'));
    split(ranked, codes, first, div);
    split(ranked, codes, div + 1, last);
}

/// Build the code table for a block from its frequency table.
///
/// Symbols that never occur get the empty code. A block with a single distinct symbol also
/// leaves that symbol with the empty code.
pub fn shafa_codes(freqs: &Freqs) -> CodeTable {
    let ranked = rank_symbols(freqs);
    let mut by_rank = vec![String::new(); SYMBOLS];

    if let Some(last) = last_nonzero(&ranked) {
        trace!("\r{} symbols in use", last + 1);
        split(&ranked, &mut by_rank, 0, last);
    }

    // Put each code back under its original symbol
    let mut codes = vec![String::new(); SYMBOLS];
    for (r, code) in ranked.iter().zip(by_rank) {
        codes[r.symbol as usize] = code;
    }
    CodeTable::from_codes(codes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn table(pairs: &[(u8, u32)]) -> Freqs {
        let mut f = [0_u32; SYMBOLS];
        pairs.iter().for_each(|&(s, n)| f[s as usize] = n);
        f
    }

    fn ranked(freqs: &[u32]) -> Vec<Ranked> {
        freqs
            .iter()
            .enumerate()
            .map(|(i, &freq)| Ranked {
                symbol: i as u8,
                freq,
            })
            .collect()
    }

    #[test]
    fn ranking_is_stable() {
        let r = rank_symbols(&table(&[(3, 5), (1, 5), (200, 9), (7, 1)]));
        let top: Vec<u8> = r.iter().take(5).map(|r| r.symbol).collect();
        assert_eq!(top, vec![200, 1, 3, 7, 0]);
        assert_eq!(last_nonzero(&r), Some(3));
        // zero-frequency symbols follow in ascending order
        assert_eq!(r[4].symbol, 0);
        assert_eq!(r[5].symbol, 2);
    }

    #[test]
    fn division_stops_at_first_local_minimum() {
        let r = ranked(&[10, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(best_division(&r, 0, 7), 0);
    }

    #[test]
    fn division_balances_even_weights() {
        let r = ranked(&[1, 1, 1, 1]);
        assert_eq!(best_division(&r, 0, 3), 1);
        assert_eq!(best_division(&r, 2, 3), 2);
    }

    #[test]
    fn division_keeps_scanning_while_it_improves() {
        // Imbalance goes 8, 2, 12: the split falls after rank 1
        let r = ranked(&[6, 5, 5, 4]);
        assert_eq!(best_division(&r, 0, 3), 1);
        let r = ranked(&[2, 2, 2, 2, 2, 2]);
        assert_eq!(best_division(&r, 0, 5), 2);
        let r = ranked(&[3, 2, 1]);
        assert_eq!(best_division(&r, 0, 2), 0);
    }

    #[test]
    fn division_tie_keeps_the_left_split() {
        // Imbalance is 2 after rank 0 and again after rank 1; equal is not better
        let r = ranked(&[1, 2, 1]);
        assert_eq!(best_division(&r, 0, 2), 0);
    }

    #[test]
    fn two_symbols() {
        let codes = shafa_codes(&table(&[(b'a', 3), (b'b', 1)]));
        assert_eq!(codes.code(b'a'), "0");
        assert_eq!(codes.code(b'b'), "1");
        assert_eq!(codes.code(b'c'), "");
    }

    #[test]
    fn skewed_block() {
        let codes = shafa_codes(&table(&[(b'x', 10), (b'a', 1), (b'b', 1), (b'c', 1)]));
        assert_eq!(codes.code(b'x'), "0");
        assert_eq!(codes.code(b'a'), "10");
        assert_eq!(codes.code(b'b'), "110");
        assert_eq!(codes.code(b'c'), "111");
    }

    #[test]
    fn single_symbol_gets_empty_code() {
        let codes = shafa_codes(&table(&[(b'q', 1000)]));
        assert!((0..=255).all(|s| codes.code(s).is_empty()));
    }

    #[test]
    fn empty_block() {
        let codes = shafa_codes(&[0; SYMBOLS]);
        assert!((0..=255).all(|s| codes.code(s).is_empty()));
    }

    #[test]
    fn full_alphabet_is_prefix_free() {
        let mut f = [0_u32; SYMBOLS];
        f.iter_mut()
            .enumerate()
            .for_each(|(i, v)| *v = 1 + (i as u32 * 37) % 101);
        let codes = shafa_codes(&f);
        let all: Vec<&str> = (0..=255).map(|s| codes.code(s)).collect();
        assert!(all.iter().all(|c| !c.is_empty()));
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{} prefixes {}", a, b);
                }
            }
        }
    }
}
