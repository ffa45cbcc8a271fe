use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use super::decompress::decompress;
use super::shafa_codes::shafa_codes_file;
use super::shafa_encode::shafa_encode_file;
use crate::bitstream::fields::{TableMode, TableWriter};
use crate::tools::blocks::{check_min_size, split_blocks, BlockLedger};
use crate::tools::cli::{ShafaOpts, Stage};
use crate::tools::error::{create_file, open_file, ModuleError, Result};
use crate::tools::extensions::{add_ext, FREQ_EXT, RLE_EXT};
use crate::tools::freq_count::{freqs, write_freqs};
use crate::tools::rle::rle_encode;

/// RLE is dropped when it saves less than this share of the first block.
const RLE_MIN_GAIN: f64 = 0.05;

/*
    Stage f reads the input one block at a time. The first block decides whether RLE is worth
    keeping: unless RLE is forced, a gain under 5% on that block turns it off for the whole file.

    With RLE, every encoded block is appended to <file>.rle and its histogram goes to
    <file>.rle.freq (mode R). Without RLE, or when asked for, the histogram of each raw block
    goes to <file>.freq (mode N). Both frequency files know the block count up front because
    the block layout depends only on the file size.
*/

/// What stage f did to one file.
#[derive(Debug, Clone)]
pub struct FreqSummary {
    /// Raw size of every block
    pub raw_sizes: BlockLedger,
    /// Encoded size of every block, when RLE was kept
    pub rle_sizes: Option<BlockLedger>,
    /// Share of the first block saved by RLE
    pub first_gain: f64,
    /// Every file written
    pub outputs: Vec<PathBuf>,
    /// The file the code stage should work on next
    pub next: PathBuf,
    pub elapsed: Duration,
}

impl FreqSummary {
    pub fn n_blocks(&self) -> usize {
        self.raw_sizes.len()
    }
}

/// Share of `raw` bytes saved by encoding them into `encoded` bytes. Negative when RLE grows
/// the block.
fn rle_gain(raw: usize, encoded: usize) -> f64 {
    if raw == 0 {
        return 0.0;
    }
    (raw as f64 - encoded as f64) / raw as f64
}

/// Fill `buf` with exactly `size` bytes of the input.
fn read_block<R: Read>(fin: &mut R, buf: &mut Vec<u8>, size: usize) -> Result<()> {
    buf.clear();
    buf.try_reserve(size)
        .map_err(|_| ModuleError::OutOfMemory { requested: size })?;
    buf.resize(size, 0);
    fin.read_exact(buf)?;
    Ok(())
}

fn table_writer(path: &Path, mode: TableMode, n_blocks: usize) -> Result<TableWriter<BufWriter<File>>> {
    TableWriter::new(BufWriter::new(create_file(path)?), mode, n_blocks)
}

/// Stage f: compute the block frequencies of `path`, RLE-encoding the blocks when it pays off.
pub fn freq_rle_compress(path: &Path, opts: &ShafaOpts) -> Result<FreqSummary> {
    let start = Instant::now();
    let file_size = open_file(path)?.metadata()?.len();
    check_min_size(file_size)?;

    let ledger = split_blocks(file_size as usize, opts.block_size.bytes());
    let n_blocks = ledger.len();
    debug!(
        "{} bytes split into {} blocks of up to {} bytes",
        file_size,
        n_blocks,
        opts.block_size.bytes()
    );

    let mut fin = BufReader::new(open_file(path)?);
    let mut raw = Vec::new();

    // The first block decides the fate of RLE
    read_block(&mut fin, &mut raw, ledger[0])?;
    let mut encoded = rle_encode(&raw, raw.len());
    let first_gain = rle_gain(raw.len(), encoded.len());
    let use_rle = opts.force_rle || first_gain >= RLE_MIN_GAIN;
    if use_rle {
        debug!("RLE saves {:.2}% on the first block", first_gain * 100.0);
    } else {
        warn!(
            "RLE saves only {:.2}% on the first block, skipping it",
            first_gain * 100.0
        );
    }

    let rle_path = add_ext(path, RLE_EXT);
    let rle_freq_path = add_ext(&rle_path, FREQ_EXT);
    let freq_path = add_ext(path, FREQ_EXT);

    let mut rle_files = if use_rle {
        Some((
            BufWriter::new(create_file(&rle_path)?),
            table_writer(&rle_freq_path, TableMode::Rle, n_blocks)?,
        ))
    } else {
        None
    };
    let mut plain_freqs = if !use_rle || opts.force_freq {
        Some(table_writer(&freq_path, TableMode::Normal, n_blocks)?)
    } else {
        None
    };

    let mut rle_sizes = Vec::with_capacity(n_blocks);
    for (i, &size) in ledger.iter().enumerate() {
        if i > 0 {
            read_block(&mut fin, &mut raw, size)?;
        }
        if let Some((rle_out, rle_freqs)) = rle_files.as_mut() {
            if i > 0 {
                encoded = rle_encode(&raw, raw.len());
            }
            rle_out.write_all(&encoded)?;
            rle_freqs.add_block(encoded.len(), write_freqs(&freqs(&encoded)).as_bytes())?;
            rle_sizes.push(encoded.len());
        }
        if let Some(plain) = plain_freqs.as_mut() {
            plain.add_block(raw.len(), write_freqs(&freqs(&raw)).as_bytes())?;
        }
        trace!("\rBlock {} of {}: {} bytes", i + 1, n_blocks, size);
    }

    let mut outputs = Vec::new();
    if let Some((mut rle_out, rle_freqs)) = rle_files {
        rle_out.flush()?;
        rle_freqs.finish()?;
        outputs.push(rle_path.clone());
        outputs.push(rle_freq_path);
    }
    if let Some(plain) = plain_freqs {
        plain.finish()?;
        outputs.push(freq_path);
    }

    let summary = FreqSummary {
        raw_sizes: ledger,
        rle_sizes: use_rle.then(|| rle_sizes),
        first_gain,
        outputs,
        next: if use_rle { rle_path } else { path.to_path_buf() },
        elapsed: start.elapsed(),
    };
    report_freq(&summary);
    Ok(summary)
}

fn report_freq(summary: &FreqSummary) {
    info!("---- Frequencies and RLE ----");
    info!("Blocks: {}", summary.n_blocks());
    match &summary.rle_sizes {
        Some(rle_sizes) => {
            let raw: usize = summary.raw_sizes.iter().sum();
            let rle: usize = rle_sizes.iter().sum();
            info!(
                "RLE: {} -> {} bytes ({:.2}% saved)",
                raw,
                rle,
                rle_gain(raw, rle) * 100.0
            );
        }
        None => info!("RLE: not used"),
    }
    for path in &summary.outputs {
        info!("Wrote {}", path.display());
    }
    info!("Stage f took {:?}", summary.elapsed);
}

/// Run the stage chosen in the options, or all three compression stages in order.
pub fn compress(opts: &ShafaOpts) -> Result<()> {
    match opts.stage {
        Some(Stage::Freq) => {
            freq_rle_compress(&opts.file, opts)?;
        }
        Some(Stage::Codes) => {
            shafa_codes_file(&opts.file)?;
        }
        Some(Stage::Shafa) => {
            shafa_encode_file(&opts.file)?;
        }
        Some(Stage::Decompress) => decompress(opts)?,
        None => {
            let freq = freq_rle_compress(&opts.file, opts)?;
            shafa_codes_file(&freq.next)?;
            shafa_encode_file(&freq.next)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bitstream::fields::FieldReader;
    use crate::tools::error::read_file;

    #[test]
    fn gain() {
        assert_eq!(rle_gain(100, 95), 0.05);
        assert!(rle_gain(100, 150) < 0.0);
        assert_eq!(rle_gain(0, 0), 0.0);
    }

    #[test]
    fn runs_keep_rle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.bin");
        std::fs::write(&path, vec![b'z'; 3000]).unwrap();

        let summary = freq_rle_compress(&path, &ShafaOpts::new(&path)).unwrap();
        assert_eq!(summary.raw_sizes, vec![3000]);
        // 11 full runs of 255 and one of 195
        assert_eq!(summary.rle_sizes, Some(vec![36]));
        assert_eq!(summary.next, add_ext(&path, RLE_EXT));
        assert_eq!(summary.outputs.len(), 2);
        assert!(!add_ext(&path, FREQ_EXT).exists());

        let rle = read_file(&summary.next).unwrap();
        assert_eq!(&rle[..3], &[0, b'z', 255]);
        let table = read_file(&add_ext(&summary.next, FREQ_EXT)).unwrap();
        let mut fr = FieldReader::new(&table);
        assert_eq!(fr.table_header().unwrap(), (TableMode::Rle, 1));
        assert_eq!(fr.block_header().unwrap(), 36);
    }

    #[test]
    fn text_skips_rle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        let text: Vec<u8> = (0..2000_u32).map(|i| b'a' + (i % 26) as u8).collect();
        std::fs::write(&path, &text).unwrap();

        let summary = freq_rle_compress(&path, &ShafaOpts::new(&path)).unwrap();
        assert_eq!(summary.rle_sizes, None);
        assert_eq!(summary.next, path);
        assert_eq!(summary.outputs, vec![add_ext(&path, FREQ_EXT)]);
        assert!(!add_ext(&path, RLE_EXT).exists());
    }

    #[test]
    fn forced_rle_and_freq() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        let text: Vec<u8> = (0..2000_u32).map(|i| b'a' + (i % 26) as u8).collect();
        std::fs::write(&path, &text).unwrap();

        let mut opts = ShafaOpts::new(&path);
        opts.force_rle = true;
        opts.force_freq = true;
        let summary = freq_rle_compress(&path, &opts).unwrap();
        assert_eq!(summary.rle_sizes, Some(vec![2000]));
        assert_eq!(summary.outputs.len(), 3);
    }

    #[test]
    fn tiny_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny");
        std::fs::write(&path, b"hello").unwrap();
        assert!(matches!(
            freq_rle_compress(&path, &ShafaOpts::new(&path)),
            Err(ModuleError::FileTooSmall { size: 5, .. })
        ));
    }
}
