//! Command-line argument parsing and validation

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voxen tooling - maintains generated and third-party engine sources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "vxtool")]
pub struct Args {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the C++ version header
    Version {
        /// Output path of the generated header
        output_file: PathBuf,

        /// SemVer major component
        major: u32,

        /// SemVer minor component
        minor: u32,

        /// SemVer patch component
        patch: u32,

        /// Optional prerelease suffix (e.g. `beta.2`)
        suffix: Option<String>,

        /// Git directory to take the revision from
        #[arg(long = "git-dir", value_name = "DIR")]
        git_dir: Option<PathBuf>,
    },

    /// Download and patch the bundled Vulkan headers
    Headers {
        /// JSON manifest overriding the built-in header lists
        #[arg(short = 'm', long = "manifest", value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Skip the video codec header set
        #[arg(long)]
        skip_video: bool,
    },
}

/// Parse command line arguments
///
/// Usage errors terminate with exit code 1 so CI scripts can treat any
/// nonzero status uniformly; `--help` and `--version` exit 0.
pub fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}
