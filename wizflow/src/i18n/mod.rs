//! Message catalogs for wizard chrome and application text.
//!
//! A [`Catalog`] holds one flat key table per language, loaded from
//! `<locale>.json` files with dotted keys:
//!
//! ```json
//! { "dialogs.confirm.title": "Confirm", "messages.flow_success": "Done." }
//! ```
//!
//! Lookups try the active language first and fall back to
//! [`FALLBACK_LANGUAGE`], which ships with built-in English messages
//! so the framework renders text out of the box.

use crate::errors::WizardError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Language consulted when the active one misses a key.
pub const FALLBACK_LANGUAGE: &str = "en_US";

/// Translation tables keyed by language, with fallback lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<String, HashMap<String, String>>,
    language: String,
}

impl Catalog {
    /// Creates a catalog for `language`, pre-seeded with the built-in
    /// messages under [`FALLBACK_LANGUAGE`].
    pub fn new(language: impl Into<String>) -> Self {
        let mut tables: HashMap<String, HashMap<String, String>> = HashMap::new();
        tables.insert(FALLBACK_LANGUAGE.to_string(), builtin_messages());
        Self {
            tables,
            language: language.into(),
        }
    }

    /// Creates a catalog holding only the built-in messages.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(FALLBACK_LANGUAGE)
    }

    /// The active language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switches the active language. Tables stay loaded.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    /// Inserts one entry, replacing a previous one for the same key.
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.tables
            .entry(locale.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Merges a table into a locale; incoming entries win.
    pub fn extend_locale(&mut self, locale: impl Into<String>, entries: HashMap<String, String>) {
        self.tables.entry(locale.into()).or_default().extend(entries);
    }

    /// Looks up `key` in the active language, then in
    /// [`FALLBACK_LANGUAGE`].
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::MissingTranslation`] if neither table
    /// has the key.
    pub fn t(&self, key: &str) -> Result<String, WizardError> {
        if let Some(text) = self.lookup(&self.language, key) {
            return Ok(text.to_string());
        }
        if self.language != FALLBACK_LANGUAGE {
            if let Some(text) = self.lookup(FALLBACK_LANGUAGE, key) {
                return Ok(text.to_string());
            }
        }
        Err(WizardError::MissingTranslation {
            key: key.to_string(),
            language: self.language.clone(),
        })
    }

    /// Looks up `key` and substitutes `{name}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::MissingTranslation`] if the key is
    /// unknown. Placeholders without a matching parameter are left in
    /// place.
    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> Result<String, WizardError> {
        let mut text = self.t(key)?;
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        Ok(text)
    }

    /// Loads every `<locale>.json` file in `dir`, merging each into
    /// its locale table. Later loads win on key collisions, so calling
    /// this once per search directory from least to most specific
    /// layers user text over bundled text. Returns the number of files
    /// loaded; a missing directory loads zero.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::CatalogParse`] for files that are not
    /// flat string tables, or an IO error if a file cannot be read.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, WizardError> {
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(locale) = path.file_stem().and_then(std::ffi::OsStr::to_str) else {
                continue;
            };
            let raw = fs::read_to_string(&path)?;
            let entries: HashMap<String, String> =
                serde_json::from_str(&raw).map_err(|source| WizardError::CatalogParse {
                    path: path.display().to_string(),
                    source,
                })?;
            debug!(locale, file = %path.display(), entries = entries.len(), "loaded locale catalog");
            self.extend_locale(locale, entries);
            loaded += 1;
        }
        Ok(loaded)
    }

    fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.tables
            .get(language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// English text for everything the framework says on its own.
fn builtin_messages() -> HashMap<String, String> {
    [
        ("common.back", "Back"),
        ("common.next", "Next"),
        ("common.start", "Start"),
        ("loading.title", "In Progress..."),
        ("dialogs.confirm.title", "Confirm"),
        ("dialogs.confirm.run_pipeline_text", "Do you want to run the pipeline now?"),
        ("dialogs.confirm.yes", "Yes"),
        ("dialogs.confirm.no", "No"),
        ("dialogs.close.title", "Confirm Exit"),
        ("dialogs.close.exit_text", "Are you sure you want to exit?"),
        ("dialogs.warn_title", "Warning"),
        ("dialogs.success_title", "Success"),
        ("dialogs.error_title", "Error"),
        ("messages.no_pipeline", "No pipeline configured for this flow."),
        ("messages.flow_success", "Flow completed successfully."),
        ("messages.flow_error_prefix", "An error occurred while running the flow:\n"),
    ]
    .into_iter()
    .map(|(key, text)| (key.to_string(), text.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new("pt_BR");
        catalog.insert("pt_BR", "dialogs.confirm.title", "Confirmar");
        catalog.insert("pt_BR", "greeting.named", "Olá, {name}!");
        catalog
    }

    #[test]
    fn test_active_language_wins() {
        let catalog = sample_catalog();
        assert_eq!(catalog.t("dialogs.confirm.title").unwrap(), "Confirmar");
    }

    #[test]
    fn test_missing_key_falls_back_to_english() {
        let catalog = sample_catalog();
        assert_eq!(catalog.t("dialogs.confirm.yes").unwrap(), "Yes");
    }

    #[test]
    fn test_unknown_language_falls_back_entirely() {
        let catalog = Catalog::new("xx_XX");
        assert_eq!(catalog.t("common.next").unwrap(), "Next");
    }

    #[test]
    fn test_missing_everywhere_is_an_error() {
        let catalog = sample_catalog();
        let err = catalog.t("no.such.key").unwrap_err();
        assert!(matches!(
            err,
            WizardError::MissingTranslation { ref key, ref language }
                if key == "no.such.key" && language == "pt_BR"
        ));
    }

    #[test]
    fn test_format_substitutes_placeholders() {
        let catalog = sample_catalog();
        let text = catalog.format("greeting.named", &[("name", "Ada")]).unwrap();
        assert_eq!(text, "Olá, Ada!");
    }

    #[test]
    fn test_format_leaves_unknown_placeholders() {
        let catalog = sample_catalog();
        let text = catalog.format("greeting.named", &[("other", "x")]).unwrap();
        assert_eq!(text, "Olá, {name}!");
    }

    #[test]
    fn test_load_dir_merges_catalog_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("pt_BR.json")).unwrap();
        write!(file, r#"{{"common.next": "Avançar", "extra.key": "Extra"}}"#).unwrap();

        let mut catalog = Catalog::new("pt_BR");
        let loaded = catalog.load_dir(dir.path()).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(catalog.t("common.next").unwrap(), "Avançar");
        assert_eq!(catalog.t("extra.key").unwrap(), "Extra");
        // Untranslated keys still resolve through the fallback table.
        assert_eq!(catalog.t("common.back").unwrap(), "Back");
    }

    #[test]
    fn test_later_directories_shadow_earlier_ones() {
        let bundled = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        std::fs::write(
            bundled.path().join("en_US.json"),
            r#"{"app.title": "Bundled", "app.footer": "Footer"}"#,
        )
        .unwrap();
        std::fs::write(user.path().join("en_US.json"), r#"{"app.title": "Custom"}"#).unwrap();

        let mut catalog = Catalog::builtin();
        catalog.load_dir(bundled.path()).unwrap();
        catalog.load_dir(user.path()).unwrap();
        assert_eq!(catalog.t("app.title").unwrap(), "Custom");
        assert_eq!(catalog.t("app.footer").unwrap(), "Footer");
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let mut catalog = Catalog::builtin();
        let loaded = catalog.load_dir(Path::new("/no/such/dir")).unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_malformed_catalog_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en_US.json"), "{not json").unwrap();

        let mut catalog = Catalog::builtin();
        let err = catalog.load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, WizardError::CatalogParse { ref path, .. } if path.contains("en_US.json")));
    }
}
