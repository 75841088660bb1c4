use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod append;
pub mod cat;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append JSON documents to a stream file.
    Append(AppendArgs),
    /// Print the documents stored in a stream.
    Cat(CatArgs),
    /// Scan a stream's framing and report what it holds.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, descriptor_width: usize) -> CliResult<i32> {
    if descriptor_width == 0 {
        return Err(CliError::new(
            USAGE,
            "--descriptor-width must be at least 1",
        ));
    }

    match command {
        Command::Append(args) => append::run(args, format, descriptor_width),
        Command::Cat(args) => cat::run(args, format, descriptor_width),
        Command::Inspect(args) => inspect::run(args, format, descriptor_width),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Stream file to append to (created if missing).
    pub path: PathBuf,
    /// JSON document text. Repeat to append several documents in order.
    #[arg(long, value_name = "TEXT", conflicts_with = "file", required_unless_present = "file")]
    pub json: Vec<String>,
    /// Append the contents of a file as one document.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Skip checking that each document is valid JSON.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Args, Debug)]
pub struct CatArgs {
    /// Stream file to read, or `-` for stdin.
    pub path: PathBuf,
    /// Stop after N documents.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Stream file to scan.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
