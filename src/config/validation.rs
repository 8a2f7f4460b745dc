//! Settings validators. Problems become warnings, never errors.

use std::collections::HashSet;
use std::path::Path;

use super::Settings;

/// A validation warning detected during settings loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The settings field (e.g., "extension", "keys").
    pub source: String,
    /// The specific value that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Build a warning for `item` in the settings field `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}': {}", self.source, self.item, self.message)
    }
}

/// Trait for settings validators.
///
/// Validators never fail; every problem becomes a warning and the analysis
/// proceeds with the values as given.
pub trait ConfigValidator {
    /// Validate the settings and return any warnings found.
    fn validate(&self, settings: &Settings) -> Vec<ValidationWarning>;

    /// Return a human-readable name for this validator (e.g., "keys").
    fn name(&self) -> &'static str;
}

/// Checks the file extension.
#[derive(Debug)]
pub struct ExtensionValidator;

impl ConfigValidator for ExtensionValidator {
    fn validate(&self, settings: &Settings) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let ext = &settings.extension;

        if ext.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                "extension",
                ext,
                "extension is empty; no import will be recognized as a file",
            ));
        } else if ext.starts_with('.') {
            warnings.push(ValidationWarning::new(
                "extension",
                ext,
                "extension should not start with a dot",
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "extension"
    }
}

/// Checks the key vocabulary.
#[derive(Debug)]
pub struct KeyValidator;

impl ConfigValidator for KeyValidator {
    fn validate(&self, settings: &Settings) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for key in &settings.keys {
            if key.trim().is_empty() {
                warnings.push(ValidationWarning::new("keys", key, "key is empty"));
                continue;
            }
            if key.chars().any(char::is_whitespace) {
                warnings.push(ValidationWarning::new(
                    "keys",
                    key,
                    "key contains whitespace and will never match",
                ));
            }
            if !seen.insert(key.as_str()) {
                warnings.push(ValidationWarning::new("keys", key, "duplicate key"));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "keys"
    }
}

/// Checks entry files and traversal guards.
#[derive(Debug)]
pub struct TraversalValidator;

impl ConfigValidator for TraversalValidator {
    fn validate(&self, settings: &Settings) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for entry in &settings.entries {
            if Path::new(entry).is_absolute() || entry.starts_with('/') {
                warnings.push(ValidationWarning::new(
                    "entries",
                    entry,
                    "entry should be relative to the root directory",
                ));
            }
        }

        if settings.max_depth == 0 {
            warnings.push(ValidationWarning::new(
                "max_depth",
                "0",
                "only entry files will be read",
            ));
        }
        if settings.max_nodes == 0 {
            warnings.push(ValidationWarning::new(
                "max_nodes",
                "0",
                "no file will be read",
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "traversal"
    }
}

/// Validate all settings and return collected warnings.
#[must_use]
pub fn validate_all(settings: &Settings) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator>> = vec![
        Box::new(ExtensionValidator),
        Box::new(KeyValidator),
        Box::new(TraversalValidator),
    ];

    let mut all_warnings = Vec::new();
    for validator in validators {
        let warnings = validator.validate(settings);
        if !warnings.is_empty() {
            tracing::debug!(
                validator = validator.name(),
                count = warnings.len(),
                "settings validation warnings"
            );
        }
        all_warnings.extend(warnings);
    }

    all_warnings
}
