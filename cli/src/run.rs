//! Command dispatch.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use unjar::Locator;
use unjar::config::TransferConfig;

use crate::cli::{Cli, Command};
use crate::error::{CliError, Result};
use crate::settings::{ConfigDirs, load_config};

/// Executes the parsed command, writing any result for the user to `stdout`.
///
/// # Errors
///
/// Returns [`CliError`] when configuration, locator parsing, or the command
/// itself fails.
pub fn run(cli: &Cli, dirs: &dyn ConfigDirs, stdout: &mut dyn Write) -> Result<()> {
    let config = load_config(cli.config.as_deref(), dirs)?;
    match &cli.command {
        Command::Download { locator, work_dir } => download(locator, work_dir, &config, stdout),
        Command::Upload { path, locator } => upload(path, locator, &config),
    }
}

fn download(
    locator: &str,
    work_dir: &Utf8Path,
    config: &TransferConfig,
    stdout: &mut dyn Write,
) -> Result<()> {
    let locator = Locator::parse(locator)?;
    let work_dir = absolute(work_dir)?;
    let resolved = unjar::resolve(&locator, &work_dir, config)?;
    writeln!(stdout, "{resolved}").map_err(CliError::Write)
}

fn upload(path: &Utf8Path, locator: &str, config: &TransferConfig) -> Result<()> {
    let destination = Locator::parse(locator)?;
    unjar::publish(path, &destination, config)?;
    Ok(())
}

/// Anchors a relative work directory at the current directory.
fn absolute(work_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let invalid = |reason: String| CliError::WorkDir {
        path: work_dir.to_owned(),
        reason,
    };
    let absolute = std::path::absolute(work_dir).map_err(|err| invalid(err.to_string()))?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|path| invalid(format!("{} is not valid UTF-8", path.display())))
}
