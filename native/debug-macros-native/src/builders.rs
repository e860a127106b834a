//! Expansion Builders
//!
//! Decide what each helper call becomes. Every builder validates its input
//! completely before returning, so a failing call never leaves a half
//! rewritten module behind.

use semver::Version;
use tracing::debug;

use crate::error::MacroError;
use crate::helpers::{HelperKind, HelperTarget};
use crate::logical::GuardChain;
use crate::tree::Expr;
use crate::version::satisfies;

/// The outcome of expanding one call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// Replace the call with this chain once the guard name is known.
    Guarded(GuardChain),
    /// Delete the call site now.
    Remove,
}

/// Run-scoped inputs shared by all builders.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub target: &'a HelperTarget,
    pub package_version: Option<&'a Version>,
}

pub fn expand(
    kind: HelperKind,
    args: &[Expr],
    ctx: BuildContext<'_>,
) -> Result<Expansion, MacroError> {
    match kind {
        HelperKind::Assert => Ok(Expansion::Guarded(build_assert(args, ctx.target))),
        HelperKind::Warn => Ok(Expansion::Guarded(build_warn(args, ctx.target))),
        HelperKind::Deprecate => build_deprecate(args, ctx),
    }
}

/// `assert(x, "m")` becomes `guard && x && <assert>(x, "m")`: identifier
/// arguments must be defined before the assertion runs.
pub fn build_assert(args: &[Expr], target: &HelperTarget) -> GuardChain {
    let leading = args.iter().filter(|arg| arg.is_identifier()).cloned().collect();
    GuardChain::new(leading, target.call(HelperKind::Assert, args.to_vec()))
}

pub fn build_warn(args: &[Expr], target: &HelperTarget) -> GuardChain {
    GuardChain::new(Vec::new(), target.call(HelperKind::Warn, args.to_vec()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPRECATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationMeta {
    pub id: String,
    pub until: String,
    pub url: Option<String>,
}

impl DeprecationMeta {
    /// Reads `id`, `until` and `url` off an object literal. Other keys are
    /// ignored.
    pub fn from_object(meta: &Expr) -> Result<Self, MacroError> {
        if !matches!(meta, Expr::Object(_)) {
            return Err(MacroError::invalid_deprecation(
                "the third argument must be an object literal",
            ));
        }
        let read = |key: &str| meta.property(key).and_then(Expr::as_str_literal);

        let id = read("id").ok_or(MacroError::DeprecationMeta { field: "id" })?;
        let until = read("until").ok_or(MacroError::DeprecationMeta { field: "until" })?;
        Ok(Self {
            id: id.to_string(),
            until: until.to_string(),
            url: read("url").map(str::to_string),
        })
    }
}

pub fn format_deprecation_message(message: &str, meta: &DeprecationMeta) -> String {
    let mut formatted = format!(
        "DEPRECATED [{}]: {}. Will be removed in {}.",
        meta.id, message, meta.until
    );
    if let Some(url) = &meta.url {
        formatted.push_str(&format!(" See {} for more information.", url));
    }
    formatted
}

/// `deprecate(message, predicate, { id, until, url })`.
///
/// Removed outright once the package version satisfies `until`; otherwise
/// fires the formatted message when `predicate` holds.
pub fn build_deprecate(args: &[Expr], ctx: BuildContext<'_>) -> Result<Expansion, MacroError> {
    let [message, predicate, meta] = args else {
        return Err(MacroError::invalid_deprecation(format!(
            "expected 3 arguments, found {}",
            args.len()
        )));
    };
    let message = message.as_str_literal().ok_or_else(|| {
        MacroError::invalid_deprecation("the message must be a string literal")
    })?;
    let meta = DeprecationMeta::from_object(meta)?;

    // Without a package version nothing has expired yet.
    let expired = match ctx.package_version {
        Some(version) => satisfies(version, &meta.until)?,
        None => false,
    };
    if expired {
        debug!(id = %meta.id, until = %meta.until, "removing expired deprecation");
        return Ok(Expansion::Remove);
    }

    let terminal = ctx.target.call(
        HelperKind::Deprecate,
        vec![Expr::string(format_deprecation_message(message, &meta))],
    );
    Ok(Expansion::Guarded(GuardChain::new(
        vec![predicate.clone()],
        terminal,
    )))
}
