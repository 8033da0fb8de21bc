mod cli;

use std::process::ExitCode;

use clap::Parser;
use dalgen::{GenError, Generator};
use log::{debug, LevelFilter};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let config = cli.into_config();
    debug!("Effective configuration: {config:#?}");

    match Generator::new(config).run() {
        Ok(report) => {
            debug!("Wrote {} files", report.files.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &GenError) {
    for reference in err.reference_errors() {
        eprintln!("ERROR: {reference}");
    }
    match err {
        GenError::Unresolved { .. } => eprintln!("\n*** {err}.\n"),
        _ => eprintln!("ERROR: {err}"),
    }
}
