//! # ratefetch CLI
//!
//! Command-line interface for the ratefetch library.
//! Provides a wget-like interface for downloading a single URL.

use clap::Parser;
use log::{debug, error, warn, LevelFilter};
use ratefetch::{parse_rate_limit, CancellationToken, DownloadOptions, Downloader, OverwriteBehavior, Result};

mod cli;

/// Command-line interface for ratefetch
#[derive(Parser)]
#[command(name = "ratefetch")]
#[command(about = "Minimal HTTP file downloader with fixed bandwidth tiers")]
#[command(long_about = "Downloads a single URL to a local file:
  ratefetch https://example.com/file.iso                    # Save as file.iso
  ratefetch https://example.com/file.iso out.iso            # Save as out.iso
  ratefetch https://example.com/file.iso --rate-limit 300k  # At most 300 KiB/s

Rate limits:
  300k                             # 300 KiB/s
  700k                             # 700 KiB/s
  2M                               # 2 MiB/s")]
#[command(version = env!("RATEFETCH_VERSION"))]
struct Cli {
    /// URL of the resource to download
    url: String,

    /// Output file path (defaults to the last segment of the URL path)
    #[arg(default_value = "")]
    output: String,

    /// Limit download speed (300k or 700k or 2M)
    #[arg(long, default_value = "")]
    rate_limit: String,

    /// Mirror the remote directory structure (not implemented)
    #[arg(long)]
    mirror: bool,

    /// Convert links for offline viewing (not implemented)
    #[arg(long)]
    convert_links: bool,

    /// Comma-separated list of file types to reject (not implemented)
    #[arg(long, default_value = "")]
    reject: String,

    /// Comma-separated list of file types to accept (not implemented)
    #[arg(long, default_value = "")]
    accept: String,

    /// Download directories recursively (not implemented)
    #[arg(long)]
    recursive: bool,

    /// Never overwrite existing files (fail if destination exists)
    #[arg(long)]
    no_clobber: bool,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags that are accepted for compatibility but have no effect
    fn ignored_flags(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.mirror {
            ignored.push("--mirror");
        }
        if self.convert_links {
            ignored.push("--convert-links");
        }
        if !self.reject.is_empty() {
            ignored.push("--reject");
        }
        if !self.accept.is_empty() {
            ignored.push("--accept");
        }
        if self.recursive {
            ignored.push("--recursive");
        }
        ignored
    }
}

/// Resolve output path from CLI arguments
fn resolve_output(url: &str, output: &str) -> String {
    if output.is_empty() {
        ratefetch::resolve_output_filename(url)
    } else {
        output.to_string()
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    logger.target(env_logger::Target::Stderr);
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    debug!("ratefetch v{} starting...", env!("RATEFETCH_VERSION"));

    // Validate the rate limit before touching the network
    let rate_limit = parse_rate_limit(&cli.rate_limit)?;

    for flag in cli.ignored_flags() {
        warn!("{flag} is accepted but not implemented; ignoring");
    }

    let output = resolve_output(&cli.url, &cli.output);

    if cli.dry_run {
        eprintln!("🔍 [DRY RUN] Would download: {} to {output} (rate: {rate_limit})", cli.url);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling download");
                cancel.cancel();
            }
        }
    });

    eprintln!("📁 Saving to: {output}");
    let progress_manager = cli::ProgressManager::new(0, &format!("🌐 Downloading {}", cli.url));

    let options = DownloadOptions {
        rate_limit,
        progress: Some(progress_manager.callback()),
        overwrite: if cli.no_clobber {
            OverwriteBehavior::NeverOverwrite
        } else {
            OverwriteBehavior::Overwrite
        },
        cancel,
        ..Default::default()
    };

    let downloader = Downloader::new()?;
    match downloader.download_to_file(&cli.url, &output, &options).await {
        Ok(bytes) => {
            progress_manager.finish("✅ Download completed!");
            debug!("Wrote {bytes} bytes");
            println!("Downloaded: {output}");
            Ok(())
        }
        Err(e) => {
            progress_manager.pb.abandon();
            Err(e)
        }
    }
}
