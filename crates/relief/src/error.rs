//! Error types for the relief crate.

use std::fmt;

/// Result type for relief operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a raster and building its surface.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed.
    Http {
        /// The URL that failed.
        url: String,
        /// The error message.
        message: String,
    },
    /// HTTP response had a non-success status code.
    HttpStatus {
        /// The URL that returned the error.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// Reading a local raster failed.
    Io {
        /// The path that could not be read.
        path: String,
        /// The error message.
        message: String,
    },
    /// TIFF decoding failed.
    Tiff {
        /// The error message.
        message: String,
    },
    /// Raster validation or surface construction failed.
    Mesh(relief_mesh::MeshError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http { url, message } => {
                write!(f, "http request to {url} failed: {message}")
            }
            Error::HttpStatus { url, status } => {
                write!(f, "http request to {url} returned status {status}")
            }
            Error::Io { path, message } => {
                write!(f, "failed to read {path}: {message}")
            }
            Error::Tiff { message } => write!(f, "failed to decode tiff: {message}"),
            Error::Mesh(e) => write!(f, "terrain error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Mesh(e) => Some(e),
            _ => None,
        }
    }
}

impl From<relief_mesh::MeshError> for Error {
    fn from(e: relief_mesh::MeshError) -> Self {
        Error::Mesh(e)
    }
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Error::Tiff {
            message: e.to_string(),
        }
    }
}
