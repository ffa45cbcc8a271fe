use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};

use super::blocks::BlockSize;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Errors,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Which stage to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Frequencies and RLE
    Freq,
    /// Code tables
    Codes,
    /// Shafa packing
    Shafa,
    /// Decompression
    Decompress,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What decompression undoes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
    /// Shafa, then RLE if the codes were built from RLE data
    Full,
    /// Shafa only
    ShafaOnly,
    /// RLE only
    RleOnly,
}

#[derive(Debug, Clone)]
pub struct ShafaOpts {
    /// File to read for input
    pub file: PathBuf,
    /// Single stage to run; None runs every compression stage in order
    pub stage: Option<Stage>,
    /// Maximum input block size to process during each loop
    pub block_size: BlockSize,
    /// Keep RLE even when it gains less than 5% on the first block
    pub force_rle: bool,
    /// Write the frequency file of the raw blocks even when RLE is used
    pub force_freq: bool,
    /// What decompression undoes
    pub decode: Decode,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl ShafaOpts {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            stage: None,
            block_size: BlockSize::default(),
            force_rle: false,
            force_freq: false,
            decode: Decode::Full,
            verbose: Verbosity::Info,
        }
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Shafa, a block file compressor using RLE and Shannon-Fano coding",
    long_about = "
    Compression runs three stages, each writing its own files next to the input:
      f  block frequencies and RLE     (.freq, .rle, .rle.freq)
      t  Shannon-Fano code tables      (.cod)
      c  packed Shannon-Fano bitstream (.sf)
    Without -m all three run in order. Decompression (-m d) takes a .sf or a .rle file."
)]
pub struct Args {
    /// Filename of file to process
    #[clap()]
    filename: PathBuf,

    /// Stage to run: f, t, c or d
    #[clap(short = 'm')]
    stage: Option<char>,

    /// Block size: K (640KiB), m (8MiB) or M (64MiB). Default is 64KiB
    #[clap(short = 'b')]
    block_size: Option<char>,

    /// Force r (RLE) or f (frequency file of the raw blocks)
    #[clap(short = 'c')]
    force: Vec<char>,

    /// Decompress s (Shafa only) or r (RLE only)
    #[clap(short = 'd')]
    decode: Option<char>,

    /// Sets verbosity. -v adds debug, -vv adds trace
    #[clap(short = 'v', parse(from_occurrences))]
    v: u8,

    /// Only report errors
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

/// Parse the command line into options and set the log level.
pub fn shafa_opts_init() -> Result<ShafaOpts, String> {
    let opts = opts_from_args(Args::parse())?;
    log::set_max_level(opts.verbose.level_filter());

    // Below we report initialization status to the user
    info!("---- Shafa Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    match opts.stage {
        Some(stage) => info!("Running stage {}", stage),
        None => info!("Running all compression stages"),
    }
    info!("Getting input from the file {}", opts.file.display());
    info!("Block size set to {} bytes", opts.block_size.bytes());
    if opts.force_rle {
        info!("Forcing RLE")
    };
    if opts.force_freq {
        info!("Forcing the frequency file of the raw blocks")
    };
    info!("---- Shafa Initialization End ----\n");
    Ok(opts)
}

/// Copy command line values into our internal structure, rejecting unknown letters.
fn opts_from_args(args: Args) -> Result<ShafaOpts, String> {
    let mut opts = ShafaOpts::new(args.filename);

    opts.stage = match args.stage {
        None => None,
        Some('f') => Some(Stage::Freq),
        Some('t') => Some(Stage::Codes),
        Some('c') => Some(Stage::Shafa),
        Some('d') => Some(Stage::Decompress),
        Some(other) => return Err(format!("Unknown stage '{}' (expected f, t, c or d)", other)),
    };

    if let Some(letter) = args.block_size {
        opts.block_size = BlockSize::from_letter(letter)
            .ok_or_else(|| format!("Unknown block size '{}' (expected K, m or M)", letter))?;
    }

    for letter in args.force {
        match letter {
            'r' => opts.force_rle = true,
            'f' => opts.force_freq = true,
            other => return Err(format!("Unknown -c value '{}' (expected r or f)", other)),
        }
    }

    opts.decode = match args.decode {
        None => Decode::Full,
        Some('s') => Decode::ShafaOnly,
        Some('r') => Decode::RleOnly,
        Some(other) => return Err(format!("Unknown -d value '{}' (expected s or r)", other)),
    };

    opts.verbose = match (args.quiet, args.v) {
        (true, _) => Verbosity::Errors,
        (false, 0) => Verbosity::Info,
        (false, 1) => Verbosity::Debug,
        _ => Verbosity::Trace,
    };
    Ok(opts)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(line: &[&str]) -> Result<ShafaOpts, String> {
        let args = Args::try_parse_from(line).map_err(|e| e.to_string())?;
        opts_from_args(args)
    }

    #[test]
    fn defaults() {
        let opts = parse(&["shafa", "book.txt"]).unwrap();
        assert_eq!(opts.file, PathBuf::from("book.txt"));
        assert_eq!(opts.stage, None);
        assert_eq!(opts.block_size, BlockSize::Small);
        assert!(!opts.force_rle && !opts.force_freq);
        assert_eq!(opts.decode, Decode::Full);
        assert_eq!(opts.verbose, Verbosity::Info);
    }

    #[test]
    fn all_flags() {
        let opts = parse(&[
            "shafa", "book.txt", "-m", "f", "-b", "m", "-c", "r", "-c", "f", "-vv",
        ])
        .unwrap();
        assert_eq!(opts.stage, Some(Stage::Freq));
        assert_eq!(opts.block_size, BlockSize::Large);
        assert!(opts.force_rle && opts.force_freq);
        assert_eq!(opts.verbose, Verbosity::Trace);

        let opts = parse(&["shafa", "book.txt.sf", "-m", "d", "-d", "s", "-q"]).unwrap();
        assert_eq!(opts.stage, Some(Stage::Decompress));
        assert_eq!(opts.decode, Decode::ShafaOnly);
        assert_eq!(opts.verbose, Verbosity::Errors);
    }

    #[test]
    fn bad_letters() {
        assert!(parse(&["shafa", "a", "-m", "x"]).is_err());
        assert!(parse(&["shafa", "a", "-b", "k"]).is_err());
        assert!(parse(&["shafa", "a", "-c", "z"]).is_err());
        assert!(parse(&["shafa", "a", "-d", "q"]).is_err());
        assert!(parse(&["shafa"]).is_err());
    }
}
