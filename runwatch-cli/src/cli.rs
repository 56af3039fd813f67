//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::Parser;

/// runwatch -- pair job start/finish events and record run-time alerts.
///
/// Configuration is read from `runwatch.toml` in the working directory,
/// or from the file named by the `RUNWATCH_CONFIG` environment variable.
#[derive(Parser, Debug)]
#[command(name = "runwatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the job event log (one JSON object per line).
    pub input: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_input() {
        let cli = Cli::try_parse_from(["runwatch", "/var/log/jobs.log"]).expect("should parse");
        assert_eq!(cli.input, PathBuf::from("/var/log/jobs.log"));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let result = Cli::try_parse_from(["runwatch"]);
        assert!(result.is_err(), "input path is required");
    }

    #[test]
    fn test_extra_arguments_are_rejected() {
        let result = Cli::try_parse_from(["runwatch", "a.log", "b.log"]);
        assert!(result.is_err(), "exactly one input path is accepted");
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let result = Cli::try_parse_from(["runwatch", "--workers", "4", "a.log"]);
        assert!(result.is_err(), "no flags are accepted besides help/version");
    }
}
