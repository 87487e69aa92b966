//! Stream copy that drops a trailing legacy EOF marker
//!
//! Whether a 0x1A byte is the last byte of a stream is only known once a
//! later read reports EOF. The copier therefore withholds the most recent
//! chunk until the next read proves it was not the final one, and trims the
//! marker from the withheld chunk once the source is exhausted.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Legacy substitute/EOF byte stripped from stream tails
pub const MARKER: u8 = 0x1A;

/// Default per-buffer capacity
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Byte counts for a finished copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub marker_stripped: bool,
}

/// Two-slot lookback window used by a single copy
///
/// `prior` holds the last chunk read that has not yet been proven
/// non-terminal. At most two reads are held at any time.
#[derive(Debug)]
pub struct DoubleBuffer {
    current: Vec<u8>,
    prior: Vec<u8>,
    prior_len: usize,
    reads: u64,
}

impl DoubleBuffer {
    /// Create a window whose buffers each hold `capacity` bytes (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            current: vec![0; capacity],
            prior: vec![0; capacity],
            prior_len: 0,
            reads: 0,
        }
    }

    /// Capacity of each buffer
    pub fn capacity(&self) -> usize {
        self.current.len()
    }

    /// Copy `src` to `dst` until EOF, dropping a final marker byte
    ///
    /// A marker anywhere other than the very last byte of the source is
    /// copied unchanged. The first read or write error aborts the copy.
    pub async fn copy<R, W>(mut self, src: &mut R, dst: &mut W) -> std::io::Result<CopyStats>
    where
        R: AsyncRead + Unpin + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut stats = CopyStats::default();

        loop {
            let n = src.read(&mut self.current).await?;
            if n == 0 {
                break;
            }
            stats.bytes_read += n as u64;

            // A further read succeeded, so the withheld chunk was not the last
            if self.reads > 0 {
                dst.write_all(&self.prior[..self.prior_len]).await?;
                stats.bytes_written += self.prior_len as u64;
            }

            std::mem::swap(&mut self.current, &mut self.prior);
            self.prior_len = n;
            self.reads += 1;
        }

        if self.reads > 0 {
            let mut tail = &self.prior[..self.prior_len];
            if let Some((&MARKER, rest)) = tail.split_last() {
                tail = rest;
                stats.marker_stripped = true;
            }
            if !tail.is_empty() {
                dst.write_all(tail).await?;
                stats.bytes_written += tail.len() as u64;
            }
        }

        dst.flush().await?;
        Ok(stats)
    }
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

/// Copy with the default buffer capacity
pub async fn copy_stripping_marker<R, W>(src: &mut R, dst: &mut W) -> std::io::Result<CopyStats>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    DoubleBuffer::default().copy(src, dst).await
}
