//! Child process handle
//!
//! The relay treats the child purely as three byte pipes plus an exit code.
//! [`ChildProcess`] is that capability; [`PipedChild`] implements it with a
//! tokio child process.

use crate::cmdline::CommandLine;
use crate::error::{Link, RelayError, Result};

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

/// Exit code of the child, captured once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome(i32);

impl ExitOutcome {
    pub fn code(self) -> i32 {
        self.0
    }

    /// Map an exit status to a numeric code
    ///
    /// On Unix a child killed by a signal reports `128 + signal`, the same
    /// value a shell would give.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self(128 + signal);
            }
        }

        Self(1)
    }
}

impl From<i32> for ExitOutcome {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

/// Child-side pipe endpoints handed to the relay
pub struct ChildPipes<I, O, E> {
    /// Present only when the child's input was redirected
    pub stdin: Option<I>,
    pub stdout: O,
    pub stderr: E,
}

/// A started child process seen as pipes plus an exit code
pub trait ChildProcess {
    type Stdin: AsyncWrite + Unpin + Send + 'static;
    type Stdout: AsyncRead + Unpin + Send + 'static;
    type Stderr: AsyncRead + Unpin + Send + 'static;

    /// Take ownership of the child's pipe endpoints
    fn take_pipes(&mut self) -> Result<ChildPipes<Self::Stdin, Self::Stdout, Self::Stderr>>;

    /// Ask the child to terminate without waiting for it
    fn start_kill(&mut self) -> std::io::Result<()>;

    /// Wait for the child to terminate
    fn wait(&mut self) -> impl Future<Output = std::io::Result<ExitOutcome>> + Send;
}

/// Child process started with piped standard streams
pub struct PipedChild {
    child: Child,
}

impl PipedChild {
    /// Start the program named by `command`
    ///
    /// Output and error are always piped. Input is piped only when
    /// `redirect_stdin` is set and is inherited from the parent otherwise.
    pub fn start(command: &CommandLine, redirect_stdin: bool) -> Result<Self> {
        let args = command.argv()?;

        let mut cmd = Command::new(command.program());
        cmd.args(&args)
            .stdin(if redirect_stdin {
                Stdio::piped()
            } else {
                Stdio::inherit()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        tracing::debug!(
            "Starting {} with {} argument(s), stdin {}",
            command.program(),
            args.len(),
            if redirect_stdin { "piped" } else { "inherited" }
        );

        let child = cmd.spawn().map_err(|source| RelayError::Startup {
            program: command.program().to_string(),
            source,
        })?;

        tracing::debug!("Started child pid {:?}", child.id());
        Ok(Self { child })
    }
}

impl ChildProcess for PipedChild {
    type Stdin = ChildStdin;
    type Stdout = ChildStdout;
    type Stderr = ChildStderr;

    fn take_pipes(&mut self) -> Result<ChildPipes<ChildStdin, ChildStdout, ChildStderr>> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or(RelayError::MissingPipe(Link::Output))?;
        let stderr = self
            .child
            .stderr
            .take()
            .ok_or(RelayError::MissingPipe(Link::Error))?;

        Ok(ChildPipes {
            stdin: self.child.stdin.take(),
            stdout,
            stderr,
        })
    }

    fn start_kill(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }

    async fn wait(&mut self) -> std::io::Result<ExitOutcome> {
        let status = self.child.wait().await?;
        Ok(ExitOutcome::from_status(status))
    }
}
