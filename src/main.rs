//! ISO Session Fix
//!
//! Makes a multisession ISO image mountable by command-line tools: the lead-in
//! is zeroed and the body is moved so the path tables line up again.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use iso_session_fix::disc::TranscodeOptions;
use iso_session_fix::repair_image;

/// Rewrite a multisession ISO so single-session tools can read it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input multisession ISO file
    #[arg(value_name = "input_file")]
    input_file: PathBuf,

    /// Output ISO file (must not already exist)
    #[arg(value_name = "output_file")]
    output_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();

    let options = TranscodeOptions::default();
    match repair_image(&args.input_file, &args.output_file, &options) {
        Ok(report) => {
            log::info!(
                "Wrote {} bytes: {} volume descriptors, path tables at {:?}, {} sector gap",
                report.output_len,
                report.descriptors.len(),
                report.path_tables.iter().collect::<Vec<_>>(),
                report.gap_sectors
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
