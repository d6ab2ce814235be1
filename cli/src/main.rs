//! `unjar` CLI entrypoint.

use std::io::Write;

use clap::Parser;
use unjar_cli::cli::Cli;
use unjar_cli::error::Result;
use unjar_cli::run::run;
use unjar_cli::settings::SystemConfigDirs;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemConfigDirs, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Installs `env_logger` at the level implied by the flags; `RUST_LOG` still
/// applies on top.
fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unjar::ResolveError;
    use unjar_cli::error::CliError;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = CliError::Resolve(ResolveError::UnsupportedScheme {
            scheme: "ftp".to_owned(),
        });

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert_eq!(stderr_text, "unsupported scheme ftp\n");
    }
}
