//! # Error Handling
//!
//! This module defines the centralized error type for `nested-sync`. It uses
//! the `thiserror` library to describe every failure the library can hand
//! back to a caller.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all library errors. Variants carry the path,
//!   command, or configuration context needed to act on them.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Only a few of these are fatal to a synchronization run: `NotARepository`,
//! `DirectoryAccess`, and configuration errors. A `GitCommand` error raised
//! while fetching or pushing one repository is caught by the engine, logged
//! as a warning, and recorded in the outcome report instead of being
//! propagated.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for nested-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The target directory is not the top level of a git repository.
    #[error("Not a repository root: {}{}", path.display(), message.as_ref().map(|m| format!(" ({})", m)).unwrap_or_default())]
    NotARepository {
        path: PathBuf,
        /// Extra detail from git, when available
        message: Option<String>,
    },

    /// The target directory does not exist or cannot be entered.
    #[error("Cannot access directory {}: {message}", path.display())]
    DirectoryAccess { path: PathBuf, message: String },

    /// A git command exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {}: git {command} - {stderr}", repo.display())]
    GitCommand {
        command: String,
        repo: PathBuf,
        stderr: String,
    },

    /// An error occurred while loading or validating configuration.
    ///
    /// This error includes the specific issue and optionally a hint about
    /// how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
