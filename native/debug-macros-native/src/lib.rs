//! # Debug Macros Native
//!
//! Compile-time expansion of debug helpers and flag imports.
//!
//! ## Expansion Invariants
//!
//! 1. **Single Guard**: Every expanded helper call is gated on one boolean
//!    identifier. It is either the module's own `DEBUG` import from the
//!    env-flags module (inlined to a literal) or a fresh `const _DEBUG`
//!    inserted at the top of the module.
//!
//! 2. **Guard Shape**: `assert(x, "m")` becomes
//!    `(_DEBUG && x && console.assert(x, "m"))`. The guard is always the
//!    leftmost operand and the chain is left-associated.
//!
//! 3. **Expired Deprecations**: A `deprecate` call whose `until` range is
//!    satisfied by the package version is deleted, never guarded.
//!
//! 4. **Closed Flag Tables**: Importing a flag that is not in its table is a
//!    compile error naming the flag and the module.
//!
//! 5. **No Partial Output**: All validation happens before the first edit.
//!    A module that fails produces no output at all.

mod builders;
mod dispatch;
mod error;
mod flags;
mod guard;
mod helpers;
mod logical;
mod options;
mod registry;
mod source_module;
mod transform;
mod tree;
mod version;

#[cfg(test)]
mod fake_tree;
#[cfg(test)]
mod builders_tests;

pub use builders::{format_deprecation_message, DeprecationMeta};
pub use error::MacroError;
pub use flags::{FlagModule, FlagTable};
pub use helpers::{HelperKind, HelperTarget};
pub use options::{
    DebugToolsOptions, EnvFlagsOptions, FeatureFlagsOptions, HelpersOptions, MacroOptions,
};
pub use source_module::SourceModule;
pub use transform::{
    transform_module, transform_modules, MacroTransformer, TransformOutput, TransformReport,
};
pub use tree::{
    CallSite, ConstDecl, Expr, ImportBinding, ImportDecl, ImportId, ModuleTree, SiteId,
};
pub use version::satisfies;

#[cfg(feature = "napi")]
pub use transform::transform_debug_macros;
