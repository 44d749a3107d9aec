//! Core library modules for ratefetch
//!
//! This module contains the internal implementation details of the ratefetch library.

pub mod bucket;
pub mod downloader;
pub mod error;
pub mod rate;
pub mod source;
pub mod stream;

// Re-export main types for internal use
pub use downloader::Downloader;
pub use source::resolve_output_filename;
