//! Error types for the icon-bg-removal crate.

use std::path::PathBuf;

/// Errors that can occur while loading, cleaning or saving an icon.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source path does not exist or cannot be read.
    #[error("input not found: {}", path.display())]
    InputNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The source file is not a decodable image.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Path of the undecodable file.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },

    /// The image has no pixels.
    #[error("image has empty dimensions ({width}x{height})")]
    EmptyImage {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// A removal option is out of its accepted range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Encoding the output PNG failed.
    #[error("failed to encode PNG: {0}")]
    Encode(image::ImageError),

    /// Persisting the output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Two inputs of a batch would be written to the same output file.
    #[error("no free output name for {}: {} is already taken", input.display(), output.display())]
    OutputConflict {
        /// Input that could not be given its own output.
        input: PathBuf,
        /// Last output path that was tried.
        output: PathBuf,
    },

    /// Any other I/O error, such as a failed directory scan.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
