//! Configuration discovery.
//!
//! An explicit `--config` file must exist. Otherwise the platform
//! configuration directory is consulted, and a missing file there simply
//! means defaults.

use camino::{Utf8Path, Utf8PathBuf};
use unjar::config::TransferConfig;

use crate::error::Result;

/// Directory and file name under the platform configuration directory.
const CONFIG_FILE: &str = "unjar/config.toml";

/// Platform directory lookup, enabling test doubles.
pub trait ConfigDirs {
    /// Returns the user's configuration directory, if one is known.
    fn config_dir(&self) -> Option<Utf8PathBuf>;
}

/// Configuration directory lookup via `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConfigDirs;

impl ConfigDirs for SystemConfigDirs {
    fn config_dir(&self) -> Option<Utf8PathBuf> {
        let dirs = directories_next::BaseDirs::new()?;
        Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
    }
}

/// Returns the configuration file that applies, if any.
#[must_use]
pub fn config_path(explicit: Option<&Utf8Path>, dirs: &dyn ConfigDirs) -> Option<Utf8PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    dirs.config_dir()
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Loads configuration and applies environment overrides.
///
/// # Errors
///
/// Returns [`crate::error::CliError::Config`] when the chosen file cannot be
/// read or parsed, or the resulting endpoint is unusable.
pub fn load_config(explicit: Option<&Utf8Path>, dirs: &dyn ConfigDirs) -> Result<TransferConfig> {
    let config = match config_path(explicit, dirs) {
        Some(path) => {
            log::debug!(target: unjar_common::LOG_TARGET, "loading configuration from {path}");
            TransferConfig::load(&path)?
        }
        None => TransferConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}
