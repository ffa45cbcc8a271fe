use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, trace, warn};

use crate::bitstream::fields::{FieldReader, TableMode};
use crate::shannon_fano::code_table::CodeTable;
use crate::shannon_fano::decode_trie::DecodeTrie;
use crate::tools::blocks::BlockLedger;
use crate::tools::cli::{Decode, ShafaOpts};
use crate::tools::error::{create_file, read_file, ModuleError, Result};
use crate::tools::extensions::{add_ext, has_ext, rm_ext, CODES_EXT, FREQ_EXT, RLE_EXT, SHAFA_EXT};
use crate::tools::rle::rle_decode;

/*
    Decompression undoes the stages in reverse. A .sf file is decoded with the code tables of
    the matching .cod file, one fresh trie per block. When those tables were built from RLE
    data (mode R) the decoded stream is itself an .rle file; it is written out and then, unless
    only the Shafa step was asked for, expanded straight away using the block sizes from the
    .cod file, so the .rle.freq file is never needed.

    An .rle file on its own takes its block sizes from the matching .rle.freq file.
*/

/// Decode `<file>.sf` into `<file>`. With `follow_with_rle`, a stream built from RLE data is
/// expanded once more. Returns the last file written.
pub fn shafa_decompress(path_sf: &Path, follow_with_rle: bool) -> Result<PathBuf> {
    let start = Instant::now();
    let out_path = rm_ext(path_sf);
    let codes_path = add_ext(&out_path, CODES_EXT);

    let packed = read_file(path_sf)?;
    let codes = read_file(&codes_path)?;
    let mut sf = FieldReader::new(&packed);
    let mut cod = FieldReader::new(&codes);

    sf.separator()?;
    let n_blocks = sf.number()?;
    let (mode, n_tables) = cod.table_header()?;
    if n_blocks != n_tables {
        return Err(ModuleError::unrecognizable(format!(
            "{} holds {} blocks but {} has {} code tables",
            path_sf.display(),
            n_blocks,
            codes_path.display(),
            n_tables
        )));
    }
    debug!("{} blocks, codes in mode {}", n_blocks, mode);

    // Nothing is written until every block has decoded
    let mut decoded = Vec::new();
    let mut ledger: BlockLedger = Vec::new();
    let mut trie = DecodeTrie::new();

    for i in 0..n_blocks {
        let size = cod.block_header()?;
        let table = CodeTable::read(cod.text())?;
        trie.rebuild(&table)?;

        let packed_len = sf.block_header()?;
        let block = trie.decode_block(sf.bytes(packed_len)?, size)?;
        trace!("\rBlock {} of {}: {} -> {} bytes", i + 1, n_blocks, packed_len, size);
        decoded.extend_from_slice(&block);
        ledger.push(size);
    }
    cod.terminator()?;
    if sf.remaining() > 0 {
        warn!(
            "Ignoring {} bytes after the last block of {}",
            sf.remaining(),
            path_sf.display()
        );
    }
    let mut fout = BufWriter::new(create_file(&out_path)?);
    fout.write_all(&decoded)?;
    fout.flush()?;

    info!("---- Shafa decoding ----");
    info!("Blocks: {}", n_blocks);
    info!("Wrote {} ({} bytes)", out_path.display(), decoded.len());
    info!("Shafa decoding took {:?}", start.elapsed());

    if follow_with_rle && mode == TableMode::Rle {
        rle_decode_to_file(&decoded, &ledger, &rm_ext(&out_path))
    } else {
        Ok(out_path)
    }
}

/// Expand `<file>.rle` into `<file>`. Block sizes come from `ledger`, or from the header of
/// `<file>.rle.freq` when no ledger is given.
pub fn rle_decompress(path_rle: &Path, ledger: Option<&[usize]>) -> Result<PathBuf> {
    let data = read_file(path_rle)?;
    let out_path = rm_ext(path_rle);
    match ledger {
        Some(ledger) => rle_decode_to_file(&data, ledger, &out_path),
        None => {
            let ledger = rle_ledger(&add_ext(path_rle, FREQ_EXT))?;
            rle_decode_to_file(&data, &ledger, &out_path)
        }
    }
}

/// Read the block sizes of an `.rle.freq` file, skipping the frequency text.
fn rle_ledger(freq_path: &Path) -> Result<BlockLedger> {
    let data = read_file(freq_path)?;
    let mut fr = FieldReader::new(&data);
    let (mode, n_blocks) = fr.table_header()?;
    if mode != TableMode::Rle {
        return Err(ModuleError::unrecognizable(format!(
            "{} was not computed from RLE data",
            freq_path.display()
        )));
    }
    let mut ledger = Vec::new();
    for _ in 0..n_blocks {
        ledger.push(fr.block_header()?);
        fr.text();
    }
    fr.terminator()?;
    Ok(ledger)
}

/// Expand every RLE block of `data`, cut according to `ledger`, into `out_path`.
fn rle_decode_to_file(data: &[u8], ledger: &[usize], out_path: &Path) -> Result<PathBuf> {
    let start = Instant::now();
    let expected = ledger
        .iter()
        .try_fold(0_usize, |acc, &size| acc.checked_add(size))
        .ok_or_else(|| ModuleError::stream("RLE block sizes overflow"))?;
    if expected != data.len() {
        return Err(ModuleError::stream(format!(
            "RLE data holds {} bytes, its block sizes add up to {}",
            data.len(),
            expected
        )));
    }

    let mut out = Vec::new();
    let mut offset = 0;
    for (i, &size) in ledger.iter().enumerate() {
        let encoded = data.get(offset..offset + size).ok_or_else(|| {
            ModuleError::stream(format!("RLE block {} runs past the data", i + 1))
        })?;
        let block = rle_decode(encoded, size)?;
        trace!("\rBlock {} of {}: {} -> {} bytes", i + 1, ledger.len(), size, block.len());
        out.extend_from_slice(&block);
        offset += size;
    }
    let mut fout = BufWriter::new(create_file(out_path)?);
    fout.write_all(&out)?;
    fout.flush()?;

    info!("---- RLE decoding ----");
    info!("Blocks: {}", ledger.len());
    info!("Wrote {} ({} bytes)", out_path.display(), out.len());
    info!("RLE decoding took {:?}", start.elapsed());
    Ok(out_path.to_path_buf())
}

/// Run decompression on the file named in the options, picking the steps from its suffix
/// and the decode option.
pub fn decompress(opts: &ShafaOpts) -> Result<()> {
    let file = &opts.file;
    let is_sf = has_ext(file, SHAFA_EXT);
    let is_rle = has_ext(file, RLE_EXT);
    let done = match (opts.decode, is_sf, is_rle) {
        (Decode::Full, true, _) => shafa_decompress(file, true)?,
        (Decode::ShafaOnly, true, _) => shafa_decompress(file, false)?,
        (Decode::Full, false, true) | (Decode::RleOnly, _, true) => rle_decompress(file, None)?,
        _ => {
            return Err(ModuleError::unrecognizable(format!(
                "cannot decompress {} with {:?}: expected a {} or {} file",
                file.display(),
                opts.decode,
                SHAFA_EXT,
                RLE_EXT
            )))
        }
    };
    info!("Decompressed into {}", done.display());
    Ok(())
}
