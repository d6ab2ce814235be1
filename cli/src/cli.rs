//! CLI argument definitions for `unjar`.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

/// Resolve locators to local paths and publish local data back.
#[derive(Parser, Debug)]
#[command(name = "unjar")]
#[command(version, about)]
#[command(after_help = concat!(
    "LOCATORS:\n",
    "  https://host/path/file.zip       HTTP(S) resource\n",
    "  s3://bucket/key                  object in an S3-compatible store\n",
    "  file:///abs/path or plain/path   local file or directory\n",
    "  jar:<locator>!/<entry>           entry inside a zip archive\n\n",
    "EXAMPLES:\n",
    "  Fetch one file out of a remote archive:\n",
    "    $ unjar download 'jar:https://example.test/site.zip!/docs/index.html' ./work\n\n",
    "  Pack a directory and upload it as a zip:\n",
    "    $ unjar upload ./site 'jar:s3://releases/site.zip!/'",
))]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file [default: platform config dir/unjar/config.toml].
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Increase log output; repeat for more detail.
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve a locator and print the resulting local path.
    Download {
        /// The locator to resolve.
        locator: String,
        /// Directory that receives downloads and extracted archives.
        work_dir: Utf8PathBuf,
    },

    /// Publish a local file or directory to a locator.
    Upload {
        /// The file or directory to publish.
        path: Utf8PathBuf,
        /// The destination locator.
        locator: String,
    },
}

impl Cli {
    /// Returns the log level implied by `--quiet` and `--verbose`.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
