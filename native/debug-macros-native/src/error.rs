//! Errors raised while expanding debug macros.
//!
//! Every variant is fatal for the module being transformed. No partial output
//! is ever emitted for a module that produced an error.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_UNKNOWN_FLAG: &str = "DM-ERR-FLAG-001";
pub const ERR_DEPRECATION_META: &str = "DM-ERR-DEPRECATE-001";
pub const ERR_INVALID_DEPRECATION: &str = "DM-ERR-DEPRECATE-002";
pub const ERR_VERSION_RANGE: &str = "DM-ERR-DEPRECATE-003";
pub const ERR_UNKNOWN_HELPER: &str = "DM-ERR-HELPER-001";
pub const ERR_NESTED_HELPER: &str = "DM-ERR-HELPER-002";
pub const ERR_INVALID_OPTIONS: &str = "DM-ERR-OPTIONS-001";
pub const ERR_PARSE: &str = "DM-ERR-SYNTAX-001";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("Imported {name} from {module} which is not a supported flag.")]
    UnknownFlag { name: String, module: String },

    #[error("deprecate's meta information requires an \"{field}\" field.")]
    DeprecationMeta { field: &'static str },

    #[error("invalid deprecate call: {reason}")]
    InvalidDeprecation { reason: String },

    #[error("invalid version range \"{range}\" in deprecate's \"until\" field")]
    InvalidVersionRange { range: String },

    #[error("{name} is not a debug helper exported by {module}")]
    UnknownHelper { name: String, module: String },

    #[error("{name} is called inside the arguments of {enclosing}; debug helpers cannot be nested")]
    NestedHelper { name: String, enclosing: String },

    #[error("invalid options: {reason}")]
    InvalidOptions { reason: String },

    #[error("failed to parse module: {}", .errors.join("; "))]
    Parse { errors: Vec<String> },
}

impl MacroError {
    /// Stable diagnostic code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            MacroError::UnknownFlag { .. } => ERR_UNKNOWN_FLAG,
            MacroError::DeprecationMeta { .. } => ERR_DEPRECATION_META,
            MacroError::InvalidDeprecation { .. } => ERR_INVALID_DEPRECATION,
            MacroError::InvalidVersionRange { .. } => ERR_VERSION_RANGE,
            MacroError::UnknownHelper { .. } => ERR_UNKNOWN_HELPER,
            MacroError::NestedHelper { .. } => ERR_NESTED_HELPER,
            MacroError::InvalidOptions { .. } => ERR_INVALID_OPTIONS,
            MacroError::Parse { .. } => ERR_PARSE,
        }
    }

    pub(crate) fn invalid_options(reason: impl Into<String>) -> Self {
        MacroError::InvalidOptions {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_deprecation(reason: impl Into<String>) -> Self {
        MacroError::InvalidDeprecation {
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "napi")]
impl From<MacroError> for napi::Error {
    fn from(err: MacroError) -> Self {
        napi::Error::from_reason(format!("[{}] {}", err.code(), err))
    }
}
