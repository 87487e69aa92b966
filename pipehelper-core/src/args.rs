//! CLI argument structure for the pipehelper executable

use crate::cmdline::CommandLine;
use crate::config::{Config, StdinMode};
use crate::error::{RelayError, Result};
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for pipehelper
#[derive(Parser, Debug)]
#[command(
    name = "pipehelper",
    about = "Run a program, relay its standard streams and strip a trailing EOF marker (0x1A)",
    version
)]
pub struct HelperArgs {
    /// Print relay diagnostics to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Config file (TOML format)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read buffer size in bytes, per stream
    #[arg(long, value_name = "BYTES", env = "PIPEHELPER_BUFFER_SIZE")]
    pub buffer_size: Option<usize>,

    /// When to relay stdin to the target (default: auto)
    #[arg(long, value_enum, value_name = "MODE")]
    pub stdin: Option<StdinMode>,

    /// Raw target command line: program followed by its argument string
    #[arg(long = "command-line", value_name = "CMDLINE", conflicts_with = "target_command")]
    pub command_line: Option<String>,

    /// Target program and arguments (use -- to separate from pipehelper options)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub target_command: Vec<String>,
}

/// Settings the relay runs with after merging flags over config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    pub buffer_capacity: usize,
    pub stdin: StdinMode,
}

impl HelperArgs {
    /// Target command line from `--command-line` or the trailing arguments
    pub fn command_line(&self) -> Result<CommandLine> {
        match &self.command_line {
            Some(raw) => CommandLine::parse(raw),
            None => CommandLine::from_argv(&self.target_command),
        }
    }

    /// Merge command-line flags over file config
    pub fn resolve(&self, config: &Config) -> Result<RelaySettings> {
        let buffer_capacity = self.buffer_size.unwrap_or(config.relay.buffer_size);
        if buffer_capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "buffer size must be greater than zero".to_string(),
            ));
        }

        Ok(RelaySettings {
            buffer_capacity,
            stdin: self.stdin.unwrap_or(config.relay.stdin),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> HelperArgs {
        HelperArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_trailing_target() {
        let args = parse(&["pipehelper", "-v", "grep", "-n", "foo bar"]);
        assert!(args.verbose);
        assert_eq!(args.target_command, vec!["grep", "-n", "foo bar"]);

        let cmd = args.command_line().unwrap();
        assert_eq!(cmd.program(), "grep");
        assert_eq!(cmd.argv().unwrap(), vec!["-n", "foo bar"]);
    }

    #[test]
    fn test_separator() {
        let args = parse(&["pipehelper", "--", "sort", "-r"]);
        assert_eq!(args.target_command, vec!["sort", "-r"]);
    }

    #[test]
    fn test_raw_command_line() {
        let args = parse(&["pipehelper", "--command-line", "\"/opt/a b/tool\" -x 'y z'"]);
        let cmd = args.command_line().unwrap();
        assert_eq!(cmd.program(), "/opt/a b/tool");
        assert_eq!(cmd.argv().unwrap(), vec!["-x", "y z"]);
    }

    #[test]
    fn test_raw_and_trailing_conflict() {
        let result = HelperArgs::try_parse_from(["pipehelper", "--command-line", "cat", "cat"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_target() {
        let args = parse(&["pipehelper"]);
        assert!(matches!(
            args.command_line(),
            Err(RelayError::EmptyCommandLine)
        ));
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&["pipehelper", "--buffer-size", "16", "--stdin", "never", "cat"]);
        let settings = args.resolve(&Config::default()).unwrap();
        assert_eq!(settings.buffer_capacity, 16);
        assert_eq!(settings.stdin, StdinMode::Never);
    }

    #[test]
    fn test_config_used_without_flags() {
        let mut config = Config::default();
        config.relay.buffer_size = 64;
        config.relay.stdin = StdinMode::Always;

        let args = parse(&["pipehelper", "cat"]);
        let settings = args.resolve(&config).unwrap();
        assert_eq!(settings.buffer_capacity, 64);
        assert_eq!(settings.stdin, StdinMode::Always);
    }

    #[test]
    fn test_zero_buffer_flag_rejected() {
        let args = parse(&["pipehelper", "--buffer-size", "0", "cat"]);
        assert!(matches!(
            args.resolve(&Config::default()),
            Err(RelayError::InvalidConfig(_))
        ));
    }
}
