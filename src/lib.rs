//! # ratefetch Library
//!
//! Downloads a single URL to a local file over HTTP, optionally capping the
//! transfer at one of three fixed bandwidth tiers.
//!
//! ## Features
//!
//! - **Fixed tiers**: `300k`, `700k` and `2M` bytes per second, or unlimited
//! - **Token bucket pacing**: a full bucket allows an initial burst, then reads
//!   are released at the configured rate
//! - **Streaming**: constant memory regardless of file size
//! - **Cancellation**: a pending rate-limit wait can be aborted from outside
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Download to a file named after the URL
//!     ratefetch::get("https://example.com/archive.tar.gz", None).await?;
//!
//!     // Download at most 700 KiB/s into a specific file
//!     ratefetch::get_with_rate_limit("https://example.com/big.iso", Some("big.iso"), "700k").await?;
//!
//!     Ok(())
//! }
//! ```

// Re-export core types that users might need
pub use crate::core::bucket::TokenBucket;
pub use crate::core::downloader::{copy_stream, copy_to_file};
pub use crate::core::error::{Error, Result};
pub use crate::core::rate::{parse_rate_limit, RateLimit, RATE_TIERS};
pub use crate::core::stream::{DownloadOptions, OverwriteBehavior, ProgressCallback, ThrottledReader};
pub use crate::core::{resolve_output_filename, Downloader};
pub use tokio_util::sync::CancellationToken;

// Internal modules
mod core;

/// Download a URL without throttling
///
/// # Arguments
/// * `url` - Resource to fetch
/// * `dest` - Optional destination file path. If None, named after the URL
///
/// Returns the number of bytes written.
pub async fn get(url: &str, dest: Option<&str>) -> Result<u64> {
    get_with_options(url, dest, DownloadOptions::default()).await
}

/// Download a URL, throttled to a rate-limit label
///
/// The label is validated before any network activity; it must be one of
/// `""`, `"300k"`, `"700k"` or `"2M"`.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// ratefetch::get_with_rate_limit("https://example.com/file.bin", None, "300k").await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_with_rate_limit(url: &str, dest: Option<&str>, rate_limit: &str) -> Result<u64> {
    let options = DownloadOptions {
        rate_limit: parse_rate_limit(rate_limit)?,
        ..Default::default()
    };
    get_with_options(url, dest, options).await
}

/// Download with custom options
///
/// # Examples
/// ```rust,no_run
/// use ratefetch::{DownloadOptions, OverwriteBehavior, RateLimit};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = DownloadOptions {
///     rate_limit: "2M".parse::<RateLimit>()?,
///     overwrite: OverwriteBehavior::NeverOverwrite,
///     progress: Some(Arc::new(|downloaded, total| {
///         println!("Downloaded: {} / {}", downloaded, total);
///     })),
///     ..Default::default()
/// };
///
/// ratefetch::get_with_options("https://example.com/file.bin", None, options).await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_with_options(url: &str, dest: Option<&str>, options: DownloadOptions) -> Result<u64> {
    let downloader = Downloader::new()?;

    let file_path = match dest {
        Some(path) => path.to_string(),
        None => resolve_output_filename(url),
    };

    downloader.download_to_file(url, &file_path, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_rate_limit_rejected_before_request() {
        // Unroutable URL: reaching the network would fail differently
        let result = get_with_rate_limit("http://127.0.0.1:9/file.bin", Some("unused.bin"), "5M").await;

        assert!(matches!(result, Err(Error::InvalidRateLimit { .. })));
        assert!(!std::path::Path::new("unused.bin").exists());
    }

    #[test]
    fn test_resolve_output_filename_reexport() {
        assert_eq!(resolve_output_filename("https://example.com/a/b.iso"), "b.iso");
    }
}
