//! ink's main application entry point.
//! Handles command-line argument parsing, builds the tag registry once and
//! dispatches to the requested command.

use std::io::{self, BufReader};
use std::path::PathBuf;

use inkutils::{
    cli::{get_args, Args, Command},
    config::{Config, ConfigSource},
    deploy::deploy_tree,
    dotfile::{render_into, DotfileDeployer},
    error::{default_error_handler, Error, Result},
    locate::{locate_root, Layout},
    prompt::{DialoguerPrompter, Prompter},
    tag::builtin_registry,
};
use log::debug;

/// Main application entry point.
fn main() {
    let args = get_args();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn resolve_layout(root: Option<PathBuf>, home: Option<PathBuf>) -> Result<Layout> {
    let home = home.or_else(dirs::home_dir).ok_or_else(|| {
        Error::ConfigError("cannot determine the home directory".to_string())
    })?;
    let root = match root {
        Some(root) => root,
        None => locate_root(std::env::current_exe()?, &home),
    };
    debug!("Using root {} and home {}", root.display(), home.display());
    Ok(Layout::new(root, home))
}

/// Main application logic execution.
///
/// The configuration service and the tag registry are built once here and
/// passed to every command that renders templates.
fn run(args: Args) -> Result<()> {
    let layout = resolve_layout(args.root, args.home)?;
    let config = Config::from_layout(&layout);
    debug!(
        "Configuration from {} and {}",
        config.global_path().display(),
        config.user_path().display()
    );
    let registry = builtin_registry(layout.root_string(), config.clone());

    match args.command {
        Command::Deploy { source, target, delimiter } => {
            let report = DotfileDeployer::new(source, &target)
                .with_delimiter(delimiter.delimiter()?)
                .deploy(&registry)?;
            if let Some(backup) = report.backup {
                println!("Previous version kept at '{}'", backup.display());
            }
            println!("Deployed: '{}'", target.display());
        }
        Command::DeployAll { yes, json, delimiter } => {
            let delimiter = delimiter.delimiter()?;
            let prompt = DialoguerPrompter::new();
            if !prompt.confirm(yes, "Deploy dotfiles?".to_string())? {
                return Ok(());
            }
            let deployed = deploy_tree(&registry, layout.dotfiles(), &layout.home, &delimiter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&deployed)?);
            } else {
                for (target, _) in &deployed {
                    println!("Deployed: '{}'", target.display());
                }
            }
        }
        Command::Render { source, delimiter } => {
            let reader = BufReader::new(std::fs::File::open(&source)?);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            render_into(&registry, &delimiter.delimiter()?, reader, &mut out)?;
        }
        Command::Config { key } => {
            let value = match key {
                Some(key) => config.lookup(&key)?,
                None => serde_yaml::Value::Mapping(config.load()?),
            };
            print!("{}", serde_yaml::to_string(&value)?);
        }
        Command::Root => println!("{}", layout.root_string()),
    }
    Ok(())
}
