use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::bitstream::bitwriter::BitWriter;
use crate::bitstream::fields::FieldReader;
use crate::shannon_fano::code_table::CodeTable;
use crate::shannon_fano::encode::pack_block;
use crate::tools::error::{create_file, open_file, read_file, ModuleError, Result};
use crate::tools::extensions::{add_ext, CODES_EXT, SHAFA_EXT};

/// What stage c did to one file.
#[derive(Debug, Clone)]
pub struct EncodeSummary {
    /// Input size of every block
    pub sizes: Vec<usize>,
    /// Packed size of every block
    pub packed: Vec<usize>,
    /// Total bytes written, headers included
    pub bytes_out: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}

impl EncodeSummary {
    pub fn bytes_in(&self) -> usize {
        self.sizes.iter().sum()
    }
}

/// Stage c: pack `path` block by block with the code tables in `<path>.cod`, writing `<path>.sf`.
pub fn shafa_encode_file(path: &Path) -> Result<EncodeSummary> {
    let start = Instant::now();
    let codes_path = add_ext(path, CODES_EXT);
    let sf_path = add_ext(path, SHAFA_EXT);

    let codes = read_file(&codes_path)?;
    let mut fr = FieldReader::new(&codes);
    let (mode, n_blocks) = fr.table_header()?;
    debug!("{}: mode {}, {} blocks", codes_path.display(), mode, n_blocks);

    let mut fin = BufReader::new(open_file(path)?);
    let mut bw = BitWriter::new(BufWriter::new(create_file(&sf_path)?), n_blocks)?;
    let mut sizes = Vec::new();
    let mut packed_sizes = Vec::new();
    let mut block = Vec::new();

    for i in 0..n_blocks {
        let size = fr.block_header()?;
        let table = CodeTable::read(fr.text())?;

        block.clear();
        block
            .try_reserve(size)
            .map_err(|_| ModuleError::OutOfMemory { requested: size })?;
        block.resize(size, 0);
        fin.read_exact(&mut block).map_err(|e| {
            ModuleError::stream(format!(
                "block {} of {}: could not read {} bytes: {}",
                i + 1,
                n_blocks,
                size,
                e
            ))
        })?;

        let packed = pack_block(&block, &table).map_err(|e| match e {
            ModuleError::FileUnrecognizable(msg) => ModuleError::unrecognizable(format!(
                "block {} of {}: {}",
                i + 1,
                n_blocks,
                msg
            )),
            other => other,
        })?;
        bw.add_block(&packed)?;
        trace!("\rBlock {} of {}: {} -> {} bytes", i + 1, n_blocks, size, packed.len());
        sizes.push(size);
        packed_sizes.push(packed.len());
    }
    fr.terminator()?;
    let bytes_out = bw.bytes_out();
    bw.finish()?;

    let summary = EncodeSummary {
        sizes,
        packed: packed_sizes,
        bytes_out,
        output: sf_path,
        elapsed: start.elapsed(),
    };
    report_encode(&summary);
    Ok(summary)
}

fn report_encode(summary: &EncodeSummary) {
    let bytes_in = summary.bytes_in();
    info!("---- Shafa encoding ----");
    info!("Blocks: {}", summary.sizes.len());
    for (i, (size, packed)) in summary.sizes.iter().zip(&summary.packed).enumerate() {
        debug!("Block {}: {} -> {} bytes", i + 1, size, packed);
    }
    if bytes_in > 0 {
        info!(
            "Shafa: {} -> {} bytes ({:.2}% of the input)",
            bytes_in,
            summary.bytes_out,
            summary.bytes_out as f64 * 100.0 / bytes_in as f64
        );
    }
    info!("Wrote {}", summary.output.display());
    info!("Stage c took {:?}", summary.elapsed);
}
