//! Locating files across layered resource directories.
//!
//! Applications ship resources (locale catalogs, templates, images)
//! in a bundled directory and let users shadow individual files from
//! their own directories. The resolver walks the search path from most
//! to least specific and returns the first hit.

use crate::config::WizardConfig;
use crate::errors::WizardError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// First-hit-wins file lookup over an ordered directory list.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    search_dirs: Vec<PathBuf>,
}

impl ResourceResolver {
    /// Builds a resolver over the configuration's resource search
    /// path.
    #[must_use]
    pub fn from_config(config: &WizardConfig) -> Self {
        Self {
            search_dirs: config.resource_dirs(),
        }
    }

    /// Builds a resolver over explicit directories, most specific
    /// first.
    pub fn from_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_dirs: dirs.into_iter().collect(),
        }
    }

    /// The directories searched, in order.
    #[must_use]
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Finds `relative` in the first directory that has it as a file.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::ResourceNotFound`] when no directory has
    /// the file.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf, WizardError> {
        let relative = relative.as_ref();
        for dir in &self.search_dirs {
            let candidate = dir.join(relative);
            if candidate.is_file() {
                debug!(resource = %relative.display(), found = %candidate.display(), "resolved resource");
                return Ok(candidate);
            }
        }
        Err(WizardError::ResourceNotFound {
            path: relative.display().to_string(),
        })
    }

    /// Existing `locales` subdirectories, least specific first.
    ///
    /// The reversed order suits [`Catalog::load_dir`], whose later
    /// loads win: loading in this order layers user translations over
    /// bundled ones.
    ///
    /// [`Catalog::load_dir`]: crate::i18n::Catalog::load_dir
    #[must_use]
    pub fn locale_dirs(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .rev()
            .map(|dir| dir.join("locales"))
            .filter(|dir| dir.is_dir())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_prefers_earlier_directories() {
        let user = tempfile::tempdir().unwrap();
        let bundled = tempfile::tempdir().unwrap();
        std::fs::write(user.path().join("banner.txt"), "user").unwrap();
        std::fs::write(bundled.path().join("banner.txt"), "bundled").unwrap();
        std::fs::write(bundled.path().join("only_bundled.txt"), "x").unwrap();

        let resolver = ResourceResolver::from_dirs(vec![
            user.path().to_path_buf(),
            bundled.path().to_path_buf(),
        ]);

        let hit = resolver.resolve("banner.txt").unwrap();
        assert_eq!(hit, user.path().join("banner.txt"));
        let hit = resolver.resolve("only_bundled.txt").unwrap();
        assert_eq!(hit, bundled.path().join("only_bundled.txt"));
    }

    #[test]
    fn test_resolve_reports_the_missing_path() {
        let resolver = ResourceResolver::from_dirs(Vec::new());
        let err = resolver.resolve("missing/file.json").unwrap_err();
        assert!(matches!(
            err,
            WizardError::ResourceNotFound { ref path } if path == "missing/file.json"
        ));
    }

    #[test]
    fn test_directories_are_not_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let resolver = ResourceResolver::from_dirs(vec![dir.path().to_path_buf()]);
        assert!(resolver.resolve("nested").is_err());
    }

    #[test]
    fn test_locale_dirs_come_back_least_specific_first() {
        let user = tempfile::tempdir().unwrap();
        let bundled = tempfile::tempdir().unwrap();
        std::fs::create_dir(user.path().join("locales")).unwrap();
        std::fs::create_dir(bundled.path().join("locales")).unwrap();

        let resolver = ResourceResolver::from_dirs(vec![
            user.path().to_path_buf(),
            bundled.path().to_path_buf(),
        ]);
        assert_eq!(
            resolver.locale_dirs(),
            vec![bundled.path().join("locales"), user.path().join("locales")]
        );
    }

    #[test]
    fn test_missing_locale_dirs_are_skipped() {
        let plain = tempfile::tempdir().unwrap();
        let resolver = ResourceResolver::from_dirs(vec![plain.path().to_path_buf()]);
        assert!(resolver.locale_dirs().is_empty());
    }
}
