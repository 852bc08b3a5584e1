//! Deployment of a whole dotfiles directory into a home directory.

use crate::dotfile::{Delimiter, DeployReport, DotfileDeployer};
use crate::error::{Error, Result};
use crate::tag::TagRegistry;
use log::debug;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects every regular file below `dotfiles_dir`, sorted by path.
pub fn collect_dotfiles<P: AsRef<Path>>(dotfiles_dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dotfiles_dir.as_ref()).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Deploys each dotfile to `<home>/<file name>`.
///
/// Subdirectories only organise the templates; their structure is not
/// reproduced. Two templates with the same file name are rejected before
/// anything is written. Stops at the first failing file.
pub fn deploy_tree<D: AsRef<Path>, H: AsRef<Path>>(
    registry: &TagRegistry,
    dotfiles_dir: D,
    home: H,
    delimiter: &Delimiter,
) -> Result<Vec<(PathBuf, DeployReport)>> {
    let home = home.as_ref();
    let mut targets: HashMap<OsString, PathBuf> = HashMap::new();
    let mut plan = Vec::new();

    for source in collect_dotfiles(dotfiles_dir)? {
        let name = source.file_name().ok_or_else(|| {
            Error::ConfigError(format!("'{}' has no file name", source.display()))
        })?;
        if let Some(first) = targets.insert(name.to_os_string(), source.clone()) {
            return Err(Error::ConfigError(format!(
                "'{}' and '{}' both deploy to '{}'",
                first.display(),
                source.display(),
                home.join(name).display()
            )));
        }
        let target = home.join(name);
        plan.push((source, target));
    }

    let mut deployed = Vec::new();
    for (source, target) in plan {
        debug!("Deploying {} -> {}", source.display(), target.display());

        let report = DotfileDeployer::new(&source, &target)
            .with_delimiter(delimiter.clone())
            .deploy(registry)?;
        deployed.push((target, report));
    }

    Ok(deployed)
}
