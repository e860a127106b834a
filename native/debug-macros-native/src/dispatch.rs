//! Binding Collector & Macro Dispatcher
//!
//! Records which local names the debug-tools import introduced and routes
//! call sites on those names to their expansion.

use crate::error::MacroError;
use crate::helpers::HelperKind;
use crate::tree::{CallSite, ImportDecl};

/// Local helper names of one module, in import order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelperBindings {
    bindings: Vec<(String, HelperKind)>,
}

impl HelperBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every specifier of the debug-tools import. Names that are
    /// not known helpers are rejected so typos do not slip through as
    /// silently ignored calls.
    pub fn collect(&mut self, import: &ImportDecl) -> Result<(), MacroError> {
        for spec in &import.specifiers {
            let kind = spec
                .imported
                .parse::<HelperKind>()
                .map_err(|_| MacroError::UnknownHelper {
                    name: spec.imported.clone(),
                    module: import.source.clone(),
                })?;
            self.insert(spec.local.clone(), kind);
        }
        Ok(())
    }

    pub fn insert(&mut self, local: String, kind: HelperKind) {
        match self.bindings.iter_mut().find(|(name, _)| *name == local) {
            Some(entry) => entry.1 = kind,
            None => self.bindings.push((local, kind)),
        }
    }

    pub fn resolve(&self, local: &str) -> Option<HelperKind> {
        self.bindings
            .iter()
            .find(|(name, _)| name == local)
            .map(|(_, kind)| *kind)
    }

    pub fn first_local(&self) -> Option<&str> {
        self.bindings.first().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Routes a call site to the helper it invokes, if any.
    pub fn dispatch(&self, site: &CallSite) -> Option<HelperKind> {
        self.resolve(&site.callee)
    }
}
