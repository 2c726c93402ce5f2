//! Launcher configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::path::PathBuf;

/// Configuration shared by every invocation of the command-line front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Path or name of the `vfkit` launcher binary.
    pub launcher_path: PathBuf,

    /// Bootloader list used when `--bootloader` is not given, in the same
    /// syntax as the flag (e.g. `efi,variable-store=/vm/store,create`).
    pub default_bootloader: Option<String>,
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("launcher binary not found: {0}")]
    MissingLauncher(PathBuf),
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            launcher_path: PathBuf::from("vfkit"),
            default_bootloader: None,
        }
    }
}

impl LauncherConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `VFKIT_LAUNCHER` | `vfkit` |
    /// | `VFKIT_DEFAULT_BOOTLOADER` | unset |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            launcher_path: lookup("VFKIT_LAUNCHER")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.launcher_path),
            default_bootloader: lookup("VFKIT_DEFAULT_BOOTLOADER")
                .filter(|v| !v.is_empty())
                .or(default.default_bootloader),
        }
    }

    /// Validate that an explicitly located launcher exists.
    ///
    /// Bare command names are resolved through `PATH` when the launcher runs
    /// and are not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launcher_path.components().count() > 1 && !self.launcher_path.exists() {
            return Err(ConfigError::MissingLauncher(self.launcher_path.clone()));
        }
        Ok(())
    }

    /// Validate configuration but only log warnings instead of failing.
    pub fn validate_warn(&self) {
        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "Launcher configuration problem");
        }
    }
}
