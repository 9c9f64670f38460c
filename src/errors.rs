//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`Error`] covers all failure modes including:
//! - Asset lookup and loading errors ([`AssetError`])
//! - FBX decoding errors ([`FbxError`])
//! - File I/O and settings parsing
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use motion_showcase::errors::{Error, Result};
//!
//! fn load_settings() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the showcase.
#[derive(Error, Debug)]
pub enum Error {
    /// Asset lookup or loading failure.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// The FBX payload could not be decoded.
    #[error("FBX error: {0}")]
    Fbx(#[from] FbxError),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error (settings files).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Task join error (when a loader task panics or is cancelled).
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

/// Errors raised while resolving or building assets.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The animation name is not part of the configured list.
    #[error("Unknown animation: {0}")]
    UnknownAnimation(String),

    /// The animation name cannot be turned into a file name.
    #[error("Invalid asset name: {0:?}")]
    InvalidName(String),

    /// A loaded model carries no animation clips.
    #[error("Model `{0}` has no animation clips")]
    NoAnimations(String),

    /// Lookup of a cached model failed.
    #[error("Model `{0}` is not loaded")]
    NotLoaded(String),
}

/// Errors raised by the binary FBX reader and scene converter.
#[derive(Error, Debug)]
pub enum FbxError {
    #[error("missing binary FBX header")]
    BadMagic,

    #[error("ASCII FBX files are not supported")]
    AsciiUnsupported,

    #[error("unsupported FBX version {0}")]
    UnsupportedVersion(u32),

    #[error("unexpected end of data at offset {0}")]
    UnexpectedEof(usize),

    #[error("unknown property type `{code}` at offset {offset}")]
    UnknownPropertyType { code: char, offset: usize },

    #[error("unknown array encoding {0}")]
    UnknownArrayEncoding(u32),

    #[error("failed to inflate array: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("array length mismatch: expected {expected} bytes, got {actual}")]
    ArrayLength { expected: usize, actual: usize },

    #[error("node record at offset {0} ends outside its parent")]
    BadNodeBounds(usize),

    #[error("malformed `{node}` node: {reason}")]
    MalformedNode { node: String, reason: String },
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskJoin(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
