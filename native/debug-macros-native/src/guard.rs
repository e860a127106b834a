//! Guard Binding Injector
//!
//! Every expansion is gated on one boolean identifier. When the module
//! already imports `DEBUG` from the env-flags module, that import is inlined
//! and its local name becomes the guard. Otherwise a fresh constant is
//! declared at the top of the module, but only if something needs it.

use tracing::debug;

use crate::error::MacroError;
use crate::flags::FlagModule;
use crate::registry::PendingRewrites;
use crate::tree::{ConstDecl, Expr, ImportDecl, ImportId, ModuleTree};

/// Name of the env flag that gates diagnostics.
pub const GUARD_FLAG: &str = "DEBUG";

/// How the guard will be provided, decided before any mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardPlan {
    Reuse {
        import: ImportId,
        local: String,
        decls: Vec<ConstDecl>,
    },
    /// `value` is `None` when there is nothing to guard.
    Synthesize { value: Option<i64> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// The guard identifier, if one was reused or declared.
    pub guard: Option<String>,
    pub synthesized: bool,
    pub expansions: usize,
}

impl GuardPlan {
    /// Looks for an existing `DEBUG` import and validates everything the
    /// chosen outcome will need.
    pub fn prepare(
        imports: &[ImportDecl],
        env: &FlagModule,
        has_pending: bool,
    ) -> Result<Self, MacroError> {
        let existing = imports.iter().filter(|i| env.matches(i)).find_map(|import| {
            import
                .specifiers
                .iter()
                .find(|spec| spec.imported == GUARD_FLAG)
                .map(|spec| (import, spec.local.clone()))
        });

        if let Some((import, local)) = existing {
            return Ok(GuardPlan::Reuse {
                import: import.id,
                local,
                decls: env.inline(import)?,
            });
        }

        let value = if has_pending {
            Some(env.table.lookup(GUARD_FLAG, &env.import_specifier)?)
        } else {
            None
        };
        Ok(GuardPlan::Synthesize { value })
    }

    /// The env-flags import this plan takes care of, if any.
    pub fn handled_import(&self) -> Option<ImportId> {
        match self {
            GuardPlan::Reuse { import, .. } => Some(*import),
            GuardPlan::Synthesize { .. } => None,
        }
    }

    /// Provides the guard and resolves every pending expansion against it.
    pub fn apply<T: ModuleTree + ?Sized>(
        self,
        tree: &mut T,
        pending: PendingRewrites,
    ) -> GuardOutcome {
        match self {
            GuardPlan::Reuse {
                import,
                local,
                decls,
            } => {
                debug!(guard = %local, "reusing imported guard");
                tree.replace_import(import, decls);
                let expansions = pending.finalize(&local, tree);
                GuardOutcome {
                    guard: Some(local),
                    synthesized: false,
                    expansions,
                }
            }
            GuardPlan::Synthesize { value: Some(value) } if !pending.is_empty() => {
                let name = tree.generate_uid(GUARD_FLAG);
                debug!(guard = %name, "declaring guard");
                tree.insert_at_top(ConstDecl::new(name.clone(), Expr::Number(value)));
                let expansions = pending.finalize(&name, tree);
                GuardOutcome {
                    guard: Some(name),
                    synthesized: true,
                    expansions,
                }
            }
            GuardPlan::Synthesize { .. } => GuardOutcome {
                guard: None,
                synthesized: false,
                expansions: 0,
            },
        }
    }
}
