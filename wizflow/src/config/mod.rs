//! Runtime configuration: wizard language and resource locations.
//!
//! Resolution order is explicit configuration, then process
//! environment, then platform defaults. Host applications usually
//! build one [`WizardConfig`] at startup and hand it to the
//! controller.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the wizard language.
pub const LANG_ENV: &str = "WIZFLOW_LANG";

/// Environment variable adding a resource directory to the search
/// path, ahead of the bundled one.
pub const RESOURCES_ENV: &str = "WIZFLOW_RESOURCES_DIR";

/// Language used when neither configuration nor environment name one.
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Application-level settings for a wizard.
#[derive(Debug, Clone, Default)]
pub struct WizardConfig {
    language: Option<String>,
    resource_dirs: Vec<PathBuf>,
    bundled_resource_dir: Option<PathBuf>,
}

impl WizardConfig {
    /// Creates an empty configuration; every lookup falls back to the
    /// environment and then to defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the wizard language, overriding the environment.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Adds a directory searched for resources before the bundled one.
    /// Repeated calls keep their order.
    #[must_use]
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dirs.push(dir.into());
        self
    }

    /// Sets the directory holding resources shipped with the
    /// application. It is searched last, so user directories can
    /// shadow individual files.
    #[must_use]
    pub fn with_bundled_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_resource_dir = Some(dir.into());
        self
    }

    /// Resolves the effective language.
    ///
    /// Explicit configuration wins, then [`LANG_ENV`], then the
    /// platform `LANG` locale, then [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub fn language(&self) -> String {
        resolve_language(
            self.language.as_deref(),
            env::var(LANG_ENV).ok().as_deref(),
            env::var("LANG").ok().as_deref(),
        )
    }

    /// Resolves the resource search path, most specific first:
    /// configured directories, then [`RESOURCES_ENV`], then the
    /// bundled directory.
    #[must_use]
    pub fn resource_dirs(&self) -> Vec<PathBuf> {
        resolve_resource_dirs(
            &self.resource_dirs,
            env::var(RESOURCES_ENV)
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            self.bundled_resource_dir.clone(),
        )
    }
}

fn resolve_language(
    explicit: Option<&str>,
    env_override: Option<&str>,
    platform_locale: Option<&str>,
) -> String {
    if let Some(language) = explicit.filter(|l| !l.trim().is_empty()) {
        return language.to_string();
    }
    if let Some(language) = env_override.map(str::trim).filter(|l| !l.is_empty()) {
        return language.to_string();
    }
    if let Some(language) = platform_locale.and_then(parse_posix_locale) {
        return language;
    }
    DEFAULT_LANGUAGE.to_string()
}

/// Extracts the language tag from a POSIX locale string, dropping the
/// encoding and modifier parts. `C` and `POSIX` carry no language.
fn parse_posix_locale(raw: &str) -> Option<String> {
    let base = raw.split('.').next().unwrap_or(raw);
    let base = base.split('@').next().unwrap_or(base).trim();
    if base.is_empty() || base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(base.to_string())
}

fn resolve_resource_dirs(
    explicit: &[PathBuf],
    env_dir: Option<PathBuf>,
    bundled: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut dirs = explicit.to_vec();
    dirs.extend(env_dir);
    dirs.extend(bundled);
    dirs
}
