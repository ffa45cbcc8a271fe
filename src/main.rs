//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process::ExitCode;

use log::{error, info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

use shafa::compression::compress::compress;
use shafa::tools::cli::shafa_opts_init;

fn main() -> ExitCode {
    // Available log levels are Error, Warn, Info, Debug, Trace. The options narrow it down.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stdout,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Could not start the logger: {}", e);
    }

    let options = match shafa_opts_init() {
        Ok(options) => options,
        Err(message) => {
            error!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    //----- Figure how what we need to do and go do it
    match compress(&options) {
        Ok(()) => {
            info!("Done.\n");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {}", options.file.display(), e);
            ExitCode::FAILURE
        }
    }
}
