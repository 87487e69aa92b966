//! Core library for the pipehelper stdio relay
//!
//! Launches a target program with piped standard streams, relays them to and
//! from the caller's own streams, and strips a trailing legacy EOF marker byte
//! (0x1A) from the tail of each relayed stream.

pub mod args;
pub mod cmdline;
pub mod config;
pub mod copier;
pub mod error;
pub mod process;
pub mod relay;

pub use args::{HelperArgs, RelaySettings};
pub use cmdline::CommandLine;
pub use config::{Config, ConfigLoader, StdinMode};
pub use copier::{copy_stripping_marker, CopyStats, DoubleBuffer, MARKER};
pub use error::{Link, RelayError, Result, RELAY_FAILURE_EXIT_CODE};
pub use process::{ChildPipes, ChildProcess, ExitOutcome, PipedChild};
pub use relay::Relay;
