//! Error handling for ink.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Errors raised while rendering and deploying dotfiles.
///
/// Tag and line errors abort the deployment of the current file. I/O errors
/// are propagated as-is to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The tag name is absent from the registry.
    #[error("Tag '{tag}' not supported.")]
    TagNotSupported { tag: String },

    /// A dotted configuration key could not be resolved.
    #[error("Key '{key}' invalid.")]
    KeyInvalid { key: String },

    /// A tag was invoked with the wrong number of arguments.
    #[error("Tag '{tag}' expects {expected} argument(s), got {found}.")]
    TagArguments { tag: String, expected: usize, found: usize },

    /// A template line does not have the expected shape.
    #[error("Malformed line: {line:?}.")]
    MalformedLine { line: String },

    /// Represents errors that occur while loading configuration files
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("Directory walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),
}

/// Convenience type alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
