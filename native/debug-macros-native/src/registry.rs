//! Deferred Rewrite Registry & Import Cleanup
//!
//! Call sites are scanned before the guard identifier is known. Each expansion
//! is parked here as a (site, chain) pair and rewritten in one pass by
//! [`PendingRewrites::finalize`], which consumes the registry so it cannot
//! run twice.

use tracing::debug;

use crate::dispatch::HelperBindings;
use crate::logical::GuardChain;
use crate::tree::{ModuleTree, SiteId};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingExpansion {
    pub site: SiteId,
    pub chain: GuardChain,
}

#[derive(Debug, Default)]
pub struct PendingRewrites {
    entries: Vec<PendingExpansion>,
}

impl PendingRewrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, site: SiteId, chain: GuardChain) {
        self.entries.push(PendingExpansion { site, chain });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites every registered site with its chain resolved against
    /// `guard`, in source order. Returns how many sites were rewritten.
    pub fn finalize<T: ModuleTree + ?Sized>(mut self, guard: &str, tree: &mut T) -> usize {
        self.entries.sort_by_key(|entry| entry.site);
        let count = self.entries.len();
        for entry in self.entries {
            tree.replace_call(entry.site, entry.chain.resolve(guard));
        }
        debug!(guard, count, "finalized pending expansions");
        count
    }
}

/// Removes or externalizes the debug-tools import once every helper call has
/// been expanded.
///
/// All helpers are expected to come from one import statement, so only the
/// statement declaring the first collected binding is touched.
pub fn cleanup_helper_import<T: ModuleTree + ?Sized>(
    tree: &mut T,
    bindings: &HelperBindings,
    externalized_module: Option<&str>,
) {
    let Some(first_local) = bindings.first_local() else {
        return;
    };
    let Some(import) = tree.import_declaring(first_local) else {
        return;
    };

    match externalized_module {
        Some(module) => {
            debug!(module, "rewriting debug helpers import");
            tree.set_import_source(import, module);
        }
        None => {
            debug!("removing debug helpers import");
            tree.remove_import(import);
        }
    }
}
