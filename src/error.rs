//! Error types for loading and decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a boundary dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The boundary file could not be read.
    #[error("failed to read boundary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither supported format could be parsed.
    #[error("unrecognized boundary dataset: {reason}")]
    Format { reason: String },

    /// The dataset declares a coordinate reference we cannot convert from.
    #[error("unsupported coordinate reference: {crs}")]
    UnsupportedCrs { crs: String },
}

/// Errors from the code table loader.
#[derive(Error, Debug)]
pub enum CodeTableError {
    #[error("failed to read code table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("code table is not a JSON object of code to name: {0}")]
    Json(#[from] serde_json::Error),
}

/// Spatial index query failures. Callers fall back to a linear scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("spatial index has not been built")]
    NotBuilt,

    /// The index refers to a region outside the collection it was queried with.
    #[error("spatial index entry {index} does not match any region")]
    StaleEntry { index: usize },
}

/// Errors from [`Decoder::decode`](crate::pip::Decoder::decode).
///
/// A coordinate outside every region is not an error; it decodes to `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No boundary data is loaded; the service is unavailable.
    #[error("decoder data not loaded: {reason}")]
    Unready { reason: String },

    #[error("internal decoder error: {reason}")]
    Internal { reason: String },
}
