//! Configuration schema types

use crate::copier::DEFAULT_CAPACITY;
use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Reject settings the relay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.relay.buffer_size == 0 {
            return Err(RelayError::InvalidConfig(
                "relay.buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommonConfig {
    #[serde(default)]
    pub verbose: bool,
}

/// Relay settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Capacity of each read buffer, per stream
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default)]
    pub stdin: StdinMode,
}

fn default_buffer_size() -> usize {
    DEFAULT_CAPACITY
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            stdin: StdinMode::default(),
        }
    }
}

/// When the parent's stdin is relayed to the child
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StdinMode {
    /// Relay only when stdin is not a terminal
    #[default]
    Auto,
    /// Always relay stdin
    Always,
    /// Let the child inherit stdin
    Never,
}

impl StdinMode {
    /// Decide whether to relay, given whether stdin is an interactive terminal
    pub fn should_relay(self, stdin_is_terminal: bool) -> bool {
        match self {
            StdinMode::Auto => !stdin_is_terminal,
            StdinMode::Always => true,
            StdinMode::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.common.verbose);
        assert_eq!(config.relay.buffer_size, DEFAULT_CAPACITY);
        assert_eq!(config.relay.stdin, StdinMode::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[common]
verbose = true

[relay]
buffer_size = 16
stdin = "never"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.common.verbose);
        assert_eq!(config.relay.buffer_size, 16);
        assert_eq!(config.relay.stdin, StdinMode::Never);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[relay]\nstdin = \"always\"\n").unwrap();
        assert_eq!(config.relay.buffer_size, DEFAULT_CAPACITY);
        assert_eq!(config.relay.stdin, StdinMode::Always);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[relay]\nmarker = 26\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config: Config = toml::from_str("[relay]\nbuffer_size = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn test_stdin_mode_decision() {
        assert!(StdinMode::Auto.should_relay(false));
        assert!(!StdinMode::Auto.should_relay(true));
        assert!(StdinMode::Always.should_relay(true));
        assert!(!StdinMode::Never.should_relay(false));
    }
}
