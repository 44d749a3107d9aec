//! Core download functionality for ratefetch
//!
//! Issues the HTTP request, creates the destination file and drives the
//! copy loop, throttled through a token bucket when a rate limit is set.

use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, ClientBuilder};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::bucket::TokenBucket;
use crate::core::error::{Error, Result};
use crate::core::stream::{create_http_stream, DownloadOptions, DownloadStream, OverwriteBehavior, ThrottledReader};

/// Downloads a single URL to a file
///
/// Owns its HTTP client; nothing is shared between downloaders.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader with the default HTTP client settings
    pub fn new() -> Result<Self> {
        let client = ClientBuilder::new()
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("ratefetch/{}", env!("RATEFETCH_VERSION")))
            .build()
            .map_err(|e| Error::SourceUnavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Download `url` into `file_path`, returning the number of bytes written
    ///
    /// The request is issued first; the file is only created once the server
    /// has answered with a success status. Cancelling `options.cancel` while
    /// waiting for the response abandons the request.
    pub async fn download_to_file(
        &self,
        url: &str,
        file_path: impl AsRef<Path>,
        options: &DownloadOptions,
    ) -> Result<u64> {
        let (stream, total_size) = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => return Err(cancelled()),
            opened = self.open(url) => opened?,
        };
        copy_to_file(stream, file_path, total_size, options).await
    }

    /// Issue the GET request and expose the body as a stream
    ///
    /// Returns the stream and the advertised content length, if any.
    pub async fn open(&self, url: &str) -> Result<(DownloadStream, Option<u64>)> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| Error::SourceUnavailable(format!("invalid URL '{url}': {e}")))?;

        debug!("GET {parsed}");
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!("HTTP request failed: {status}")));
        }

        let total_size = response.content_length();
        debug!("Response {status}, content length {total_size:?}");

        Ok((create_http_stream(response), total_size))
    }
}

/// Create the destination and copy `reader` into it
///
/// The file is created before the first read, so a destination that cannot
/// be opened fails without consuming the source.
pub async fn copy_to_file<R>(
    reader: R,
    file_path: impl AsRef<Path>,
    total_size: Option<u64>,
    options: &DownloadOptions,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let file_path = file_path.as_ref();
    let mut file = create_destination(file_path, &options.overwrite).await?;

    info!("Saving to {} ({})", file_path.display(), options.rate_limit);
    copy_stream(reader, &mut file, total_size, options).await
}

/// Copy `reader` into `writer` until end of stream
///
/// With a rate limit the reader is wrapped in a [`ThrottledReader`]; without
/// one, chunks are forwarded as fast as they arrive. The first error aborts
/// the copy; bytes already written stay written.
pub async fn copy_stream<R, W>(
    reader: R,
    writer: &mut W,
    total_size: Option<u64>,
    options: &DownloadOptions,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    match TokenBucket::new(options.rate_limit) {
        Some(bucket) => {
            debug!(
                "Throttling to {} bytes/s (burst {} bytes)",
                options.rate_limit.bytes_per_second(),
                bucket.capacity()
            );
            let throttled = ThrottledReader::new(reader, bucket, options.buffer_size, options.cancel.clone());
            stream_to_writer(throttled, writer, total_size, options).await
        }
        None => stream_to_writer(reader, writer, total_size, options).await,
    }
}

async fn stream_to_writer<R, W>(
    mut reader: R,
    writer: &mut W,
    total_size: Option<u64>,
    options: &DownloadOptions,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut downloaded = 0u64;
    let total = total_size.unwrap_or(0);

    loop {
        let bytes_read = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => return Err(cancelled()),
            read = reader.read(&mut buffer) => read.map_err(Error::TransferFailed)?,
        };

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .await
            .map_err(Error::TransferFailed)?;
        downloaded += bytes_read as u64;

        if let Some(ref progress) = options.progress {
            progress(downloaded, total);
        }
    }

    writer.flush().await.map_err(Error::TransferFailed)?;
    debug!("Copied {downloaded} bytes");
    Ok(downloaded)
}

fn cancelled() -> Error {
    Error::TransferFailed(std::io::Error::new(std::io::ErrorKind::Interrupted, "download cancelled"))
}

/// Open the destination according to the overwrite policy
async fn create_destination(file_path: &Path, behavior: &OverwriteBehavior) -> Result<tokio::fs::File> {
    let mut open_options = tokio::fs::OpenOptions::new();
    open_options.write(true);

    match behavior {
        OverwriteBehavior::Overwrite => {
            open_options.create(true).truncate(true);
        }
        OverwriteBehavior::NeverOverwrite => {
            open_options.create_new(true);
        }
    }

    open_options.open(file_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            let msg = format!("file already exists (drop --no-clobber to overwrite): {e}");
            Error::sink(file_path, std::io::Error::new(e.kind(), msg))
        } else {
            Error::sink(file_path, e)
        }
    })
}
