//! Flag Table Resolver
//!
//! Inlines `import { A, B as C } from '<flags module>'` into literal
//! constants, validating every imported name against the configured table.

use std::collections::HashMap;

use crate::error::MacroError;
use crate::options::{FeatureFlagsOptions, MacroOptions};
use crate::tree::{ConstDecl, Expr, ImportBinding, ImportDecl};

/// A closed mapping from flag name to its literal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTable {
    flags: HashMap<String, i64>,
}

impl FlagTable {
    pub fn new(flags: HashMap<String, i64>) -> Self {
        Self { flags }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.flags.get(name).copied()
    }

    /// Looks up a flag, failing with an error that names `module`.
    pub fn lookup(&self, name: &str, module: &str) -> Result<i64, MacroError> {
        self.get(name).ok_or_else(|| MacroError::UnknownFlag {
            name: name.to_string(),
            module: module.to_string(),
        })
    }

    /// One constant per specifier, in specifier order. Any unknown name fails
    /// the whole import and yields nothing.
    pub fn inline(
        &self,
        specifiers: &[ImportBinding],
        module: &str,
    ) -> Result<Vec<ConstDecl>, MacroError> {
        specifiers
            .iter()
            .map(|spec| {
                let value = self.lookup(&spec.imported, module)?;
                Ok(ConstDecl::new(spec.local.clone(), Expr::Number(value)))
            })
            .collect()
    }
}

/// A flag table bound to the module name it is imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagModule {
    pub import_specifier: String,
    pub table: FlagTable,
}

impl FlagModule {
    pub fn new(import_specifier: impl Into<String>, table: FlagTable) -> Self {
        Self {
            import_specifier: import_specifier.into(),
            table,
        }
    }

    pub fn matches(&self, import: &ImportDecl) -> bool {
        import.source == self.import_specifier
    }

    pub fn inline(&self, import: &ImportDecl) -> Result<Vec<ConstDecl>, MacroError> {
        self.table.inline(&import.specifiers, &self.import_specifier)
    }
}

impl From<&FeatureFlagsOptions> for FlagModule {
    fn from(options: &FeatureFlagsOptions) -> Self {
        FlagModule::new(
            options.features_import.clone(),
            FlagTable::new(options.flags.clone()),
        )
    }
}

/// The environment table plus the ordered feature tables of one run.
#[derive(Debug, Clone)]
pub struct FlagTables {
    pub env: FlagModule,
    pub features: Vec<FlagModule>,
}

impl FlagTables {
    pub fn from_options(options: &MacroOptions) -> Self {
        Self {
            env: FlagModule::new(
                options.env_flags.import_specifier.clone(),
                FlagTable::new(options.env_flags.flags.clone()),
            ),
            features: options.features.iter().map(FlagModule::from).collect(),
        }
    }

    /// First configured feature table whose module matches the import.
    pub fn feature_for(&self, import: &ImportDecl) -> Option<&FlagModule> {
        self.features.iter().find(|f| f.matches(import))
    }
}
