//! Command-line interface implementation for ink.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::{DEFAULT_CLOSE, DEFAULT_OPEN};
use crate::dotfile::Delimiter;
use crate::error::Result;
use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for ink.
#[derive(Parser, Debug)]
#[command(author, version, about = "ink: dotfile deployment with inline tags", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the parent of the nearest `services` directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Home directory dotfiles are deployed into
    #[arg(long, value_name = "DIR", global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Tag span markers.
#[derive(ClapArgs, Debug, Clone)]
pub struct DelimiterArgs {
    /// Marker opening a tag span
    #[arg(long, value_name = "MARKER", default_value = DEFAULT_OPEN)]
    pub open: String,

    /// Marker closing a tag span
    #[arg(long, value_name = "MARKER", default_value = DEFAULT_CLOSE)]
    pub close: String,
}

impl DelimiterArgs {
    pub fn delimiter(&self) -> Result<Delimiter> {
        Delimiter::new(self.open.as_str(), self.close.as_str())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a template and write it to a destination
    Deploy {
        /// Template file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Destination file; an existing one is kept as `<TARGET>.prev`
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        #[command(flatten)]
        delimiter: DelimiterArgs,
    },

    /// Deploy every file of the dotfiles directory into the home directory
    DeployAll {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Print the deployment reports as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        delimiter: DelimiterArgs,
    },

    /// Render a template to stdout without writing anything
    Render {
        /// Template file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        #[command(flatten)]
        delimiter: DelimiterArgs,
    },

    /// Print the merged configuration, or the value at a dotted key
    Config {
        /// Dotted key such as `app.servers.0`
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },

    /// Print the project root as used by the `root` tag
    Root,
}

/// The command used to print help when arguments are missing.
pub fn help_command() -> clap::Command {
    Args::command().help_template(
        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
    )
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                if let Err(err) = help_command().print_help() {
                    eprintln!("{err}");
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
