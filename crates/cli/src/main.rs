//! formfill - fill and inspect PDF AcroForm templates
//!
//! Usage:
//!   formfill list-fields <template.pdf>
//!   formfill fill <template.pdf> <output.pdf> --data "<tab-delimited record>"
//!   formfill fill <template.pdf> <output.pdf> --data-file record.txt
//!
//! Set `RUST_LOG` or pass `-v` for diagnostics on stderr.

mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli::log_level(cli.verbose)),
    )
    .init();
    log::debug!("{:?}", cli);

    let stdout = std::io::stdout();
    match cli::run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
