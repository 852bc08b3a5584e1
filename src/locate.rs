//! Project root discovery and the directory layout derived from it.

use crate::constants::{
    CONFIG_GLOBAL, CONFIG_USER, DOTFILES_DIR, FALLBACK_ROOT, SERVICES_DIR,
};
use log::debug;
use std::path::{Path, PathBuf};

/// Finds the project root from `start`.
///
/// The root is the parent of the nearest ancestor named `services`. When
/// there is none, `<home>/inkutils` is used.
pub fn locate_root<P: AsRef<Path>>(start: P, home: &Path) -> PathBuf {
    let start = start.as_ref();
    for ancestor in start.ancestors() {
        if ancestor.file_name().is_some_and(|name| name == SERVICES_DIR) {
            if let Some(root) = ancestor.parent() {
                debug!("Located root {} from {}", root.display(), start.display());
                return root.to_path_buf();
            }
        }
    }
    debug!("No '{}' ancestor of {}, using fallback root", SERVICES_DIR, start.display());
    home.join(FALLBACK_ROOT)
}

/// Renders `root` as a POSIX absolute path.
///
/// Windows paths lose their drive letter and colon: `C:\Users\ink` becomes
/// `/Users/ink`.
pub fn root_string<P: AsRef<Path>>(root: P) -> String {
    let raw = root.as_ref().to_string_lossy().replace('\\', "/");
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            let rest = &raw[2..];
            if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{rest}")
            }
        }
        _ => raw,
    }
}

/// Well-known locations below the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub home: PathBuf,
}

impl Layout {
    pub fn new<R: Into<PathBuf>, H: Into<PathBuf>>(root: R, home: H) -> Self {
        Self { root: root.into(), home: home.into() }
    }

    pub fn services(&self) -> PathBuf {
        self.root.join(SERVICES_DIR)
    }

    pub fn dotfiles(&self) -> PathBuf {
        self.root.join(DOTFILES_DIR)
    }

    pub fn config_global(&self) -> PathBuf {
        self.services().join(CONFIG_GLOBAL)
    }

    pub fn config_user(&self) -> PathBuf {
        self.root.join(CONFIG_USER)
    }

    /// The value of the `root` tag.
    pub fn root_string(&self) -> String {
        root_string(&self.root)
    }
}
