//! Streaming types for ratefetch
//!
//! Provides the HTTP body stream, the throttling reader adapter and the
//! per-download options.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::TryStreamExt;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::{sleep, Sleep};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::core::bucket::TokenBucket;
use crate::core::rate::RateLimit;

/// A response body exposed as `AsyncRead`
pub enum DownloadStream {
    /// HTTP stream using reqwest
    Http(Box<dyn AsyncRead + Send + Unpin>),
}

impl AsyncRead for DownloadStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match &mut *self {
            DownloadStream::Http(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

/// Creates a DownloadStream from an HTTP response
pub fn create_http_stream(response: reqwest::Response) -> DownloadStream {
    let stream = Box::new(tokio_util::io::StreamReader::new(
        response.bytes_stream().map_err(std::io::Error::other),
    ));
    DownloadStream::Http(stream)
}

/// Progress callback function type, receives (downloaded, total)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Behavior when the destination file already exists
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OverwriteBehavior {
    /// Truncate and overwrite (default)
    #[default]
    Overwrite,
    /// Never overwrite, fail if file exists
    NeverOverwrite,
}

/// Options for a single download
pub struct DownloadOptions {
    /// Throughput cap; unlimited by default
    pub rate_limit: RateLimit,

    /// Optional progress callback
    pub progress: Option<ProgressCallback>,

    /// Buffer size for the copy loop
    pub buffer_size: usize,

    /// Behavior when destination file already exists
    pub overwrite: OverwriteBehavior,

    /// Aborts a pending rate-limit wait when cancelled
    pub cancel: CancellationToken,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            rate_limit: RateLimit::UNLIMITED,
            progress: None,
            buffer_size: 64 * 1024, // 64KB
            overwrite: OverwriteBehavior::default(),
            cancel: CancellationToken::new(),
        }
    }
}

/// A chunk read from the inner stream, held back until the bucket allows it
struct PendingChunk {
    data: Bytes,
    delay: Option<Pin<Box<Sleep>>>,
}

/// Paces an `AsyncRead` against a token bucket
///
/// Each read from the inner stream is performed at full speed; the bytes
/// are then held until the bucket has granted as many tokens as were read.
/// The bucket starts full, so the first `capacity` bytes pass through
/// without delay.
///
/// Not meant to be shared: one reader per download.
pub struct ThrottledReader<R> {
    inner: R,
    bucket: TokenBucket,
    scratch: Vec<u8>,
    pending: Option<PendingChunk>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl<R: AsyncRead + Unpin> ThrottledReader<R> {
    /// Wrap `inner`, reading at most `chunk_size` bytes per inner read
    pub fn new(inner: R, bucket: TokenBucket, chunk_size: usize, cancel: CancellationToken) -> Self {
        Self {
            inner,
            bucket,
            scratch: vec![0u8; chunk_size.max(1)],
            pending: None,
            cancelled: Box::pin(cancel.cancelled_owned()),
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ThrottledReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();

        loop {
            if let Some(pending) = this.pending.as_mut() {
                if let Some(delay) = pending.delay.as_mut() {
                    if !delay.is_elapsed() {
                        if this.cancelled.as_mut().poll(cx).is_ready() {
                            this.pending = None;
                            return Poll::Ready(Err(std::io::Error::new(
                                std::io::ErrorKind::Interrupted,
                                "rate-limit wait cancelled",
                            )));
                        }
                        ready!(delay.as_mut().poll(cx));
                    }
                    pending.delay = None;
                }

                let n = buf.remaining().min(pending.data.len());
                buf.put_slice(&pending.data.split_to(n));
                if pending.data.is_empty() {
                    this.pending = None;
                }
                return Poll::Ready(Ok(()));
            }

            let limit = buf.remaining().min(this.scratch.len());
            let mut scratch = ReadBuf::new(&mut this.scratch[..limit]);
            ready!(Pin::new(&mut this.inner).poll_read(cx, &mut scratch))?;

            let read = scratch.filled().len();
            if read == 0 {
                // EOF, or the caller passed an empty buffer
                return Poll::Ready(Ok(()));
            }

            let wait = this.bucket.reserve(read);
            this.pending = Some(PendingChunk {
                data: Bytes::copy_from_slice(scratch.filled()),
                delay: (!wait.is_zero()).then(|| Box::pin(sleep(wait))),
            });
        }
    }
}
