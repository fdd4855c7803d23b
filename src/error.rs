//! Error types for pixel-watch
//!
//! Every codec/pipeline failure is recovered at the call boundary that
//! invoked load/reload/rebuild: the entry's prior valid state is retained
//! and a human-readable message is surfaced (modal dialog on the load path,
//! per-entry status line on the reload/rebuild path). No error is fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Cannot load image file {path}: {reason}")]
    UnsupportedOrCorruptFormat { path: PathBuf, reason: String },

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannelCount(u8),

    #[error("Unsupported image depth: {0}")]
    UnsupportedDepth(String),

    #[error("Texture upload failed: {0}")]
    TextureUpload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
