use std::fmt::Write;

use rayon::prelude::*;

use super::error::{ModuleError, Result};

/// Number of distinct symbols in a block.
pub const SYMBOLS: usize = 256;
/// Character written between frequency values, and once more for every repeat.
pub const SEPARATOR: u8 = b';';

/// Occurrence count of every byte value within one block.
pub type Freqs = [u32; SYMBOLS];

/// Returns a frequency count of the input data. Uses parallelism when data set is over 64k.
pub fn freqs(data: &[u8]) -> Freqs {
    if data.len() > 64_000 {
        // 16k is pretty much the sweet spot for chunk size.
        data.par_chunks(16_000)
            .fold(
                || [0_u32; SYMBOLS],
                |mut freqs, chunk| {
                    chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                    freqs
                },
            )
            .reduce(
                || [0_u32; SYMBOLS],
                |mut s, f| {
                    s.iter_mut().zip(f.iter()).for_each(|(a, b)| *a += b);
                    s
                },
            )
    } else {
        let mut freqs = [0_u32; SYMBOLS];
        data.iter().for_each(|&el| freqs[el as usize] += 1);
        freqs
    }
}

/*
Text form: each value is written once, followed by one separator for every symbol in the run
of equal values that it starts, so [5,5,5,3,3,0...] becomes "5;;;3;;0;;;...". The very last
symbol never gets a separator, so a run that reaches symbol 255 has one separator less than
its length.
*/
/// Serialize a frequency table into its run-compressed text form.
pub fn write_freqs(freqs: &Freqs) -> String {
    let mut out = String::with_capacity(2 * SYMBOLS);
    let mut i = 0;
    while i < SYMBOLS {
        // Writing into a String cannot fail
        let _ = write!(out, "{}", freqs[i]);
        let mut j = i;
        while j < SYMBOLS && freqs[j] == freqs[i] {
            if j != SYMBOLS - 1 {
                out.push(SEPARATOR as char);
            }
            j += 1;
        }
        i = j;
    }
    out
}

/// Parse the run-compressed text form back into a frequency table.
///
/// A numeral sets the value of the current symbol and swallows the one separator that
/// follows it. A bare separator repeats the previous value. The text may only run out at the
/// last symbol, which then repeats the one before it.
pub fn read_freqs(text: &[u8]) -> Result<Freqs> {
    let mut freqs = [0_u32; SYMBOLS];
    let mut cursor = 0;

    for symbol in 0..SYMBOLS {
        match text.get(cursor) {
            Some(c) if c.is_ascii_digit() => {
                let digits = text[cursor..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .count();
                freqs[symbol] = parse_count(&text[cursor..cursor + digits])?;
                cursor += digits;
                if text.get(cursor) == Some(&SEPARATOR) {
                    cursor += 1;
                }
            }
            Some(&SEPARATOR) if symbol > 0 => {
                freqs[symbol] = freqs[symbol - 1];
                cursor += 1;
            }
            None if symbol == SYMBOLS - 1 => freqs[symbol] = freqs[symbol - 1],
            Some(&c) => {
                return Err(ModuleError::stream(format!(
                    "unexpected character {:?} for symbol {} in frequency text",
                    c as char, symbol
                )))
            }
            None if symbol == 0 => return Err(ModuleError::stream("empty frequency text")),
            None => {
                return Err(ModuleError::stream(format!(
                    "frequency text ends at symbol {} of {}",
                    symbol, SYMBOLS
                )))
            }
        }
    }
    if cursor < text.len() {
        return Err(ModuleError::stream(format!(
            "{} trailing characters after 256 frequencies",
            text.len() - cursor
        )));
    }
    Ok(freqs)
}

fn parse_count(digits: &[u8]) -> Result<u32> {
    // Digits only, so the utf8 conversion cannot fail; overflow still can.
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ModuleError::stream(format!(
                "frequency {} does not fit",
                String::from_utf8_lossy(digits)
            ))
        })
}
