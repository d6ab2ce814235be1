//! Library half of the `unjar` binary.
//!
//! Argument parsing, configuration discovery, and command dispatch live here
//! so they can be exercised without spawning a process.

pub mod cli;
pub mod error;
pub mod run;
pub mod settings;
