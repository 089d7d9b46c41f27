//! Command implementations for the CLI

use crate::{
    cli::Command,
    config::Config,
    core::{
        headers::HeaderUpdater,
        version::{VersionGenerator, VersionInfo, WriteOutcome},
    },
    utils::git::GitInfo,
};
use anyhow::Context;
use tracing::{debug, info, instrument};

/// Execute the appropriate command based on CLI arguments
#[instrument(skip(config))]
pub fn execute_command(config: &Config, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Version { .. } => execute_version_command(config),
        Command::Headers { .. } => execute_headers_command(config),
    }
}

/// Execute the version header command
///
/// Quiet on success: the command runs on every build, so anything it
/// prints would show up in every compile log.
#[instrument(skip(config))]
fn execute_version_command(config: &Config) -> anyhow::Result<()> {
    let version = &config.version;

    debug!(
        "Generating version header to: {}",
        version.output_file.display()
    );

    let git = GitInfo::new(version.git_dir.clone(), version.hash_length, config.debug);
    let info = VersionInfo::new(
        version.major,
        version.minor,
        version.patch,
        version.suffix.clone(),
        git.revision(),
    );

    let generator = VersionGenerator::new();
    let outcome = generator
        .generate(&info, &version.output_file)
        .context("Failed to generate version header")?;

    match outcome {
        WriteOutcome::Written => debug!("Version header written: {}", info.display_string()),
        WriteOutcome::Unchanged => debug!("Version header already up to date"),
    }

    Ok(())
}

/// Execute the headers command
#[instrument(skip(config))]
fn execute_headers_command(config: &Config) -> anyhow::Result<()> {
    info!(
        "Maintaining Vulkan headers in: {}",
        config.headers.api_dir.display()
    );

    let updater = HeaderUpdater::new(config.clone())?;
    let summary = updater
        .update()
        .context("Failed to update Vulkan headers")?;

    info!("Header update completed: {}", summary);
    Ok(())
}
