//! Options Module
//!
//! The run-scoped configuration of the macro engine. Options are read once
//! (from JSON at the napi boundary, or built directly in Rust) and are
//! immutable for the lifetime of a `MacroTransformer`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::MacroError;

pub const DEFAULT_ENV_FLAGS_IMPORT: &str = "@ember/env-flags";
pub const DEFAULT_DEBUG_TOOLS_IMPORT: &str = "@ember/debug-tools";

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPTION TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MacroOptions {
    /// Version of the package being built, compared against `until` ranges.
    pub package_version: Option<String>,
    pub env_flags: EnvFlagsOptions,
    pub debug_tools: DebugToolsOptions,
    pub features: Vec<FeatureFlagsOptions>,
    pub externalize_helpers: bool,
    pub helpers: HelpersOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvFlagsOptions {
    pub import_specifier: String,
    pub flags: HashMap<String, i64>,
}

impl Default for EnvFlagsOptions {
    fn default() -> Self {
        Self {
            import_specifier: DEFAULT_ENV_FLAGS_IMPORT.to_string(),
            flags: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugToolsOptions {
    pub import_specifier: String,
}

impl Default for DebugToolsOptions {
    fn default() -> Self {
        Self {
            import_specifier: DEFAULT_DEBUG_TOOLS_IMPORT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlagsOptions {
    /// Human readable name of the feature set, only used in logs.
    #[serde(default)]
    pub name: Option<String>,
    pub features_import: String,
    pub flags: HashMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelpersOptions {
    /// Rewrite the debug-tools import to this module when externalizing.
    pub module: Option<String>,
    /// Namespace object for `<global>.<helper>(...)` calls when externalizing.
    pub global: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADING & VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

impl MacroOptions {
    pub fn from_json(json: &str) -> Result<Self, MacroError> {
        let options: MacroOptions =
            serde_json::from_str(json).map_err(|e| MacroError::invalid_options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, MacroError> {
        let options: MacroOptions =
            serde_json::from_value(value).map_err(|e| MacroError::invalid_options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Checks the options for configuration mistakes that would otherwise
    /// surface as confusing output.
    pub fn validate(&self) -> Result<(), MacroError> {
        if let Some(version) = &self.package_version {
            semver::Version::parse(version).map_err(|e| {
                MacroError::invalid_options(format!(
                    "packageVersion \"{}\" is not a valid version: {}",
                    version, e
                ))
            })?;
        }

        if let Some(global) = &self.helpers.global {
            if !is_valid_identifier(global) {
                return Err(MacroError::invalid_options(format!(
                    "helpers.global \"{}\" is not a valid identifier",
                    global
                )));
            }
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            if feature.features_import == self.env_flags.import_specifier
                || feature.features_import == self.debug_tools.import_specifier
            {
                return Err(MacroError::invalid_options(format!(
                    "features import \"{}\" collides with a reserved import",
                    feature.features_import
                )));
            }
            if !seen.insert(feature.features_import.as_str()) {
                return Err(MacroError::invalid_options(format!(
                    "features import \"{}\" is configured more than once",
                    feature.features_import
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let options = MacroOptions::from_json(r#"{ "envFlags": { "flags": { "DEBUG": 1 } } }"#)
            .unwrap();
        assert_eq!(options.env_flags.import_specifier, DEFAULT_ENV_FLAGS_IMPORT);
        assert_eq!(options.env_flags.flags.get("DEBUG"), Some(&1));
        assert_eq!(options.debug_tools.import_specifier, DEFAULT_DEBUG_TOOLS_IMPORT);
        assert!(!options.externalize_helpers);
        assert!(options.features.is_empty());
    }

    #[test]
    fn camel_case_fields_are_read() {
        let options = MacroOptions::from_json(
            r#"{
                "packageVersion": "3.1.0",
                "externalizeHelpers": true,
                "helpers": { "global": "Ember", "module": "ember-debug" },
                "features": [
                    { "name": "ember", "featuresImport": "@ember/features", "flags": { "FEATURE_A": 0 } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(options.package_version.as_deref(), Some("3.1.0"));
        assert!(options.externalize_helpers);
        assert_eq!(options.helpers.global.as_deref(), Some("Ember"));
        assert_eq!(options.helpers.module.as_deref(), Some("ember-debug"));
        assert_eq!(options.features[0].features_import, "@ember/features");
        assert_eq!(options.features[0].flags.get("FEATURE_A"), Some(&0));
    }

    #[test]
    fn rejects_invalid_global_namespace() {
        let err = MacroOptions::from_json(r#"{ "helpers": { "global": "Ember.Debug" } }"#)
            .unwrap_err();
        assert!(matches!(err, MacroError::InvalidOptions { .. }));
    }

    #[test]
    fn rejects_invalid_package_version() {
        let err = MacroOptions::from_json(r#"{ "packageVersion": "three" }"#).unwrap_err();
        assert!(matches!(err, MacroError::InvalidOptions { .. }));
    }

    #[test]
    fn rejects_duplicate_feature_imports() {
        let err = MacroOptions::from_json(
            r#"{ "features": [
                { "featuresImport": "a", "flags": {} },
                { "featuresImport": "a", "flags": {} }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MacroError::InvalidOptions { .. }));
    }

    #[test]
    fn identifier_check() {
        assert!(is_valid_identifier("_DEBUG"));
        assert!(is_valid_identifier("$ember2"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier(""));
    }
}
