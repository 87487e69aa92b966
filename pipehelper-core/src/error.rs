//! Error types for relay operations

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Exit code used when the helper itself fails, as opposed to the child.
///
/// Matches the convention of `env`, `timeout` and `chroot`, which reserve 125
/// for failures of the wrapper rather than the wrapped command.
pub const RELAY_FAILURE_EXIT_CODE: i32 = 125;

/// One direction of the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Parent stdin to child stdin
    Input,
    /// Child stdout to parent stdout
    Output,
    /// Child stderr to parent stderr
    Error,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Link::Input => "stdin",
            Link::Output => "stdout",
            Link::Error => "stderr",
        })
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to start {program}")]
    Startup {
        program: String,
        source: std::io::Error,
    },

    #[error("No target command given")]
    EmptyCommandLine,

    #[error("Failed to parse target arguments")]
    CommandLine(#[from] shell_words::ParseError),

    #[error("Child process has no {0} pipe")]
    MissingPipe(Link),

    #[error("Failed to relay {link}")]
    Transport {
        link: Link,
        source: std::io::Error,
    },

    #[error("Relay task for {0} panicked")]
    TaskPanicked(Link),

    #[error("Failed to wait for child process")]
    Wait(#[source] std::io::Error),

    #[error("Failed to load config from {}", .path.display())]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
