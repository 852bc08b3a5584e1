//! ink deploys dotfile templates into a home directory.
//! Templates carry inline tags such as `{% root %}` or `{% config app.name %}`
//! that are substituted line by line while the rest of the text is kept.

/// Command-line interface module for the ink application
pub mod cli;

/// Configuration loading: global defaults merged with user overrides
/// Supports YAML files (JSON is accepted as a YAML subset)
pub mod config;

/// Common constants: default delimiters and well-known paths
pub mod constants;

/// Deployment of a whole dotfiles directory
pub mod deploy;

/// Line rendering and single-file deployment
/// Handles the `# stop` marker and `.prev` backups
pub mod dotfile;

/// Error types and handling for the ink application
pub mod error;

/// Project root discovery and directory layout
pub mod locate;

/// User confirmation prompts
pub mod prompt;

/// Tag registry and the built-in `root` and `config` tags
pub mod tag;

/// Shell-style word splitting and quoting
pub mod words;
