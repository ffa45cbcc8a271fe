use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::bitstream::fields::{FieldReader, TableMode, TableWriter};
use crate::shannon_fano::codes::shafa_codes;
use crate::tools::blocks::BlockLedger;
use crate::tools::error::{create_file, read_file, ModuleError, Result};
use crate::tools::extensions::{add_ext, CODES_EXT, FREQ_EXT};
use crate::tools::freq_count::read_freqs;

/// What stage t did to one file.
#[derive(Debug, Clone)]
pub struct CodesSummary {
    pub mode: TableMode,
    /// Block sizes copied from the frequency file
    pub sizes: BlockLedger,
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// Stage t: turn `<path>.freq` into `<path>.cod`, one Shannon-Fano code table per block.
pub fn shafa_codes_file(path: &Path) -> Result<CodesSummary> {
    let start = Instant::now();
    let freq_path = add_ext(path, FREQ_EXT);
    let codes_path = add_ext(path, CODES_EXT);

    let data = read_file(&freq_path)?;
    let mut fr = FieldReader::new(&data);
    let (mode, n_blocks) = fr.table_header()?;
    debug!("{}: mode {}, {} blocks", freq_path.display(), mode, n_blocks);

    let mut tw = TableWriter::new(BufWriter::new(create_file(&codes_path)?), mode, n_blocks)?;
    let mut sizes = Vec::new();
    for i in 0..n_blocks {
        let size = fr.block_header()?;
        let freqs = read_freqs(fr.text())?;
        let counted: u64 = freqs.iter().map(|&f| f as u64).sum();
        if counted != size as u64 {
            return Err(ModuleError::unrecognizable(format!(
                "block {} declares {} bytes but its frequencies add up to {}",
                i + 1,
                size,
                counted
            )));
        }
        let table = shafa_codes(&freqs);
        tw.add_block(size, table.write().as_bytes())?;
        sizes.push(size);
        trace!("\rBlock {} of {}: {} coded symbols", i + 1, n_blocks, table.coded().count());
    }
    fr.terminator()?;
    tw.finish()?;

    let summary = CodesSummary {
        mode,
        sizes,
        output: codes_path,
        elapsed: start.elapsed(),
    };
    info!("---- Shannon-Fano codes ----");
    info!("Blocks: {} (mode {})", summary.sizes.len(), summary.mode);
    info!("Wrote {}", summary.output.display());
    info!("Stage t took {:?}", summary.elapsed);
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shannon_fano::code_table::CodeTable;
    use crate::tools::freq_count::{freqs, write_freqs};

    #[test]
    fn codes_from_a_freq_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.txt");
        let mut tw = TableWriter::new(Vec::new(), TableMode::Normal, 2).unwrap();
        tw.add_block(4, write_freqs(&freqs(b"aaab")).as_bytes()).unwrap();
        tw.add_block(4, write_freqs(&freqs(b"ccdd")).as_bytes()).unwrap();
        std::fs::write(add_ext(&path, FREQ_EXT), tw.finish().unwrap()).unwrap();

        let summary = shafa_codes_file(&path).unwrap();
        assert_eq!(summary.mode, TableMode::Normal);
        assert_eq!(summary.sizes, vec![4, 4]);

        let cod = read_file(&summary.output).unwrap();
        let mut fr = FieldReader::new(&cod);
        assert_eq!(fr.table_header().unwrap(), (TableMode::Normal, 2));
        assert_eq!(fr.block_header().unwrap(), 4);
        let first = CodeTable::read(fr.text()).unwrap();
        assert_eq!(first.code(b'a'), "0");
        assert_eq!(first.code(b'b'), "1");
        assert_eq!(fr.block_header().unwrap(), 4);
        let second = CodeTable::read(fr.text()).unwrap();
        assert_eq!(second.code(b'c'), "0");
        assert_eq!(second.code(b'd'), "1");
        fr.terminator().unwrap();
    }

    #[test]
    fn size_mismatch_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        let freq = format!("@N@1@9@1{}@0", ";".repeat(255));
        std::fs::write(add_ext(&path, FREQ_EXT), freq).unwrap();
        assert!(matches!(
            shafa_codes_file(&path),
            Err(ModuleError::FileUnrecognizable(_))
        ));
    }

    #[test]
    fn block_count_beyond_the_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.txt");
        std::fs::write(add_ext(&path, FREQ_EXT), b"@N@9999999999999999999@0").unwrap();
        assert!(matches!(
            shafa_codes_file(&path),
            Err(ModuleError::FileStreamFailed(_))
        ));
    }

    #[test]
    fn missing_freq_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            shafa_codes_file(&dir.path().join("absent")),
            Err(ModuleError::FileInaccessible { .. })
        ));
    }
}
