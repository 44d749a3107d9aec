//! Output path derivation for ratefetch
//!
//! The destination defaults to the last segment of the URL path.

use percent_encoding::percent_decode_str;
use reqwest::Url;

/// Name used when the URL path does not end in a file name
pub const DEFAULT_OUTPUT_FILENAME: &str = "index.html";

/// Generates the output filename from a URL
///
/// Takes the final non-empty path segment, percent-decoded, ignoring query
/// and fragment. Path separators left after decoding are replaced so the
/// result always names a file in the current directory.
pub fn resolve_output_filename(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .map(|segment| percent_decode_str(&segment).decode_utf8_lossy().into_owned())
        .map(|name| name.replace(['/', '\\'], "_"))
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_OUTPUT_FILENAME.to_string())
}
