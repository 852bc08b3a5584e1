//! Common constants used throughout ink.

/// Default opening marker of a tag span
pub const DEFAULT_OPEN: &str = "{%";

/// Default closing marker of a tag span
pub const DEFAULT_CLOSE: &str = "%}";

/// Suffix of the single-generation backup of a deployed file
pub const PREV_SUFFIX: &str = ".prev";

/// Name of the directory whose parent is the project root
pub const SERVICES_DIR: &str = "services";

/// Directory holding the dotfile templates, relative to the root
pub const DOTFILES_DIR: &str = "dotfiles";

/// Global configuration defaults, relative to the services directory
pub const CONFIG_GLOBAL: &str = "data/default.yml";

/// User configuration overrides, relative to the root
pub const CONFIG_USER: &str = "config.yml";

/// Root used when no `services` ancestor can be found, relative to home
pub const FALLBACK_ROOT: &str = "inkutils";
