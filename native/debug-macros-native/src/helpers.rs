//! Helper Target Selector
//!
//! Decides what function a finished diagnostic calls: a method on a global
//! namespace object, a bare external function, or the local `console` API.

use std::fmt;
use std::str::FromStr;

use crate::options::MacroOptions;
use crate::tree::Expr;

/// The diagnostic helpers the engine knows how to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperKind {
    Assert,
    Warn,
    Deprecate,
}

impl HelperKind {
    pub fn name(self) -> &'static str {
        match self {
            HelperKind::Assert => "assert",
            HelperKind::Warn => "warn",
            HelperKind::Deprecate => "deprecate",
        }
    }

    /// The `console` method used when helpers are not externalized.
    pub fn console_method(self) -> &'static str {
        match self {
            HelperKind::Assert => "assert",
            HelperKind::Warn | HelperKind::Deprecate => "warn",
        }
    }
}

impl FromStr for HelperKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assert" => Ok(HelperKind::Assert),
            "warn" => Ok(HelperKind::Warn),
            "deprecate" => Ok(HelperKind::Deprecate),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperTarget {
    /// `console.<method>(...)`
    Console,
    /// `<helper>(...)`
    External,
    /// `<namespace>.<helper>(...)`
    Global(String),
}

impl HelperTarget {
    pub fn from_options(options: &MacroOptions) -> Self {
        if !options.externalize_helpers {
            return HelperTarget::Console;
        }
        match &options.helpers.global {
            Some(namespace) => HelperTarget::Global(namespace.clone()),
            None => HelperTarget::External,
        }
    }

    /// Builds the terminal call for `kind` with its final arguments.
    pub fn call(&self, kind: HelperKind, args: Vec<Expr>) -> Expr {
        let callee = match self {
            HelperTarget::Console => Expr::member(Expr::ident("console"), kind.console_method()),
            HelperTarget::External => Expr::ident(kind.name()),
            HelperTarget::Global(namespace) => {
                Expr::member(Expr::ident(namespace.clone()), kind.name())
            }
        };
        Expr::call(callee, args)
    }
}
