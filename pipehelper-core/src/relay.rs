//! Stream relay between the caller's standard streams and a child process
//!
//! Teardown order matters. The child's input is closed as soon as the input
//! link finishes, before output is awaited, so a child that reads until EOF
//! can make progress. Output and error are drained completely before the
//! child is waited on so no buffered tail is lost.

use crate::cmdline::CommandLine;
use crate::copier::{CopyStats, DoubleBuffer, DEFAULT_CAPACITY};
use crate::error::{Link, RelayError, Result};
use crate::process::{ChildProcess, ExitOutcome, PipedChild};

use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

/// Endpoints handed back by a finished link task so the relay can close them
///
/// `src` is already closed when the copy failed.
struct LinkEnd<R, W> {
    src: Option<R>,
    dst: W,
    result: io::Result<CopyStats>,
}

/// Relay for one child process
pub struct Relay<I, O, E> {
    command: CommandLine,
    input: Option<I>,
    output: O,
    error: E,
    buffer_capacity: usize,
}

impl<I, O, E> Relay<I, O, E>
where
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a relay for `command`
    ///
    /// `input` should be present only when the caller's own input is
    /// redirected; without it the child inherits the caller's stdin.
    pub fn new(command: CommandLine, input: Option<I>, output: O, error: E) -> Self {
        Self {
            command,
            input,
            output,
            error,
            buffer_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Start the target program and relay until it has exited
    pub async fn run(self) -> Result<ExitOutcome> {
        let child = PipedChild::start(&self.command, self.input.is_some())?;
        self.relay(child).await
    }

    /// Relay an already started child until it has exited
    ///
    /// Link failures do not cut the teardown short: every endpoint is still
    /// closed and the child is still waited on, then the first failure is
    /// returned.
    pub async fn relay<C: ChildProcess>(self, mut child: C) -> Result<ExitOutcome> {
        let pipes = match child.take_pipes() {
            Ok(pipes) => pipes,
            Err(e) => {
                if let Err(kill) = child.start_kill() {
                    tracing::debug!("Killing child: {}", kill);
                }
                let _ = child.wait().await;
                return Err(e);
            }
        };
        let capacity = self.buffer_capacity;

        let input_task = match (self.input, pipes.stdin) {
            (Some(src), Some(dst)) => Some(spawn_link(Link::Input, src, dst, capacity)),
            (Some(_), None) => {
                tracing::debug!("Child has no stdin pipe, not relaying input");
                None
            }
            (None, _) => None,
        };
        let output_task = spawn_link(Link::Output, pipes.stdout, self.output, capacity);
        let error_task = spawn_link(Link::Error, pipes.stderr, self.error, capacity);

        let mut failure: Option<RelayError> = None;

        if let Some(task) = input_task {
            match join_link(Link::Input, task).await {
                Ok(mut end) => {
                    record(&mut failure, input_result(end.result));
                    if let Err(e) = end.dst.shutdown().await {
                        tracing::debug!("Closing child stdin: {}", e);
                    }
                    drop(end.dst);
                    tracing::debug!("Closed child stdin");
                }
                Err(e) => record(&mut failure, Err(e)),
            }
        }

        let output = join_link(Link::Output, output_task).await;
        let error = join_link(Link::Error, error_task).await;
        record(&mut failure, close_source(Link::Output, output));
        record(&mut failure, close_source(Link::Error, error));
        tracing::debug!("Closed child stdout and stderr");

        let outcome = child.wait().await.map_err(RelayError::Wait);
        tracing::debug!("Child exited: {:?}", outcome.as_ref().map(|o| o.code()));

        match failure {
            Some(e) => Err(e),
            None => outcome,
        }
    }
}

fn spawn_link<R, W>(
    link: Link,
    mut src: R,
    mut dst: W,
    capacity: usize,
) -> JoinHandle<LinkEnd<R, W>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let result = DoubleBuffer::with_capacity(capacity)
            .copy(&mut src, &mut dst)
            .await;
        match &result {
            Ok(stats) => tracing::debug!(
                "{} finished: {} bytes read, {} written, marker stripped: {}",
                link,
                stats.bytes_read,
                stats.bytes_written,
                stats.marker_stripped
            ),
            Err(e) => tracing::debug!("{} failed: {}", link, e),
        }

        // Nothing reads a failed link any more; close the source so a writer
        // blocked on a full pipe sees EPIPE instead of hanging the relay
        let src = if result.is_ok() {
            Some(src)
        } else {
            drop(src);
            None
        };
        LinkEnd { src, dst, result }
    })
}

async fn join_link<R, W>(link: Link, task: JoinHandle<LinkEnd<R, W>>) -> Result<LinkEnd<R, W>> {
    task.await.map_err(|e| {
        tracing::debug!("{} task did not complete: {}", link, e);
        RelayError::TaskPanicked(link)
    })
}

/// Drop the child-side reader of a finished output link
fn close_source<R, W>(link: Link, end: Result<LinkEnd<R, W>>) -> Result<()> {
    let end = end?;
    drop(end.src);
    link_result(link, end.result)
}

fn link_result(link: Link, result: io::Result<CopyStats>) -> Result<()> {
    result
        .map(|_| ())
        .map_err(|source| RelayError::Transport { link, source })
}

/// The child closing its stdin early ends the input link, it is not a failure
fn input_result(result: io::Result<CopyStats>) -> Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Child closed stdin before input was exhausted");
            Ok(())
        }
        other => link_result(Link::Input, other),
    }
}

/// Keep the first failure
fn record(failure: &mut Option<RelayError>, result: Result<()>) {
    if let Err(e) = result {
        if failure.is_none() {
            *failure = Some(e);
        } else {
            tracing::debug!("Additional relay failure: {}", e);
        }
    }
}
