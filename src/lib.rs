//! Resolve resource locators to local paths and publish local data back.
//!
//! A [`Locator`] names a resource by scheme: `http`/`https` endpoints,
//! `s3://bucket/key` objects, local paths, or `jar:<locator>!/<entry>`
//! entries inside zip archives located by any other locator. [`Resolver`]
//! turns a locator into a local path, downloading and extracting as needed;
//! [`Publisher`] does the reverse.
//!
//! ```no_run
//! use camino::Utf8Path;
//! use unjar::Locator;
//! use unjar::config::TransferConfig;
//!
//! let config = TransferConfig::default();
//! let locator = Locator::parse("jar:https://example.test/site.zip!/docs/index.html")?;
//! let page = unjar::resolve(&locator, Utf8Path::new("/tmp/work"), &config)?;
//! unjar::publish(&page, &Locator::parse("s3://mirror/index.html")?, &config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod archive_entry;
pub mod config;
pub mod error;
pub mod locator;
pub mod publisher;
pub mod resolver;
pub mod transport;

pub use archive_entry::ArchiveEntry;
pub use error::{ParseError, PublishError, ResolveError};
pub use locator::Locator;
pub use publisher::{Publisher, publish};
pub use resolver::{Resolver, resolve};
