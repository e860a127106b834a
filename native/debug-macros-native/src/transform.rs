//! Transform Module
//!
//! Runs the macro engine over one module:
//!
//! 1. collect debug helper bindings from the debug-tools import
//! 2. validate every flag import against its table
//! 3. expand each helper call site (or mark expired deprecations for removal);
//!    a helper call nested inside another one is rejected
//! 4. decide how the guard identifier is provided
//! 5. mutate: remove expired sites, provide the guard, finalize expansions,
//!    inline flag imports, clean up the helpers import
//!
//! Steps 1-4 only read the tree, so any error leaves the module untouched.

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::builders::{expand, BuildContext, Expansion};
use crate::dispatch::HelperBindings;
use crate::error::MacroError;
use crate::flags::FlagTables;
use crate::guard::GuardPlan;
use crate::helpers::HelperTarget;
use crate::options::MacroOptions;
use crate::registry::{cleanup_helper_import, PendingRewrites};
use crate::source_module::SourceModule;
use crate::tree::{CallSite, ConstDecl, ImportId, ModuleTree};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// What happened to one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    /// The guard identifier expansions were resolved against.
    pub guard: Option<String>,
    /// Whether the guard was declared by the engine rather than imported.
    pub guard_synthesized: bool,
    pub expansions: u32,
    pub removed_deprecations: u32,
    pub inlined_flag_imports: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub code: String,
    pub guard: Option<String>,
    pub expansions: u32,
    pub removed_deprecations: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

/// The engine with its run-scoped configuration resolved. Holds no
/// per-module state, so one instance can serve many modules concurrently.
#[derive(Debug, Clone)]
pub struct MacroTransformer {
    tables: FlagTables,
    target: HelperTarget,
    package_version: Option<Version>,
    debug_tools_import: String,
    externalized_module: Option<String>,
}

impl MacroTransformer {
    pub fn new(options: &MacroOptions) -> Result<Self, MacroError> {
        options.validate()?;
        let package_version = options
            .package_version
            .as_deref()
            .map(Version::parse)
            .transpose()
            .map_err(|e| MacroError::invalid_options(e.to_string()))?;

        Ok(Self {
            tables: FlagTables::from_options(options),
            target: HelperTarget::from_options(options),
            package_version,
            debug_tools_import: options.debug_tools.import_specifier.clone(),
            externalized_module: if options.externalize_helpers {
                options.helpers.module.clone()
            } else {
                None
            },
        })
    }

    pub fn transform_tree<T: ModuleTree + ?Sized>(
        &self,
        tree: &mut T,
    ) -> Result<TransformReport, MacroError> {
        let imports = tree.imports();

        let mut bindings = HelperBindings::new();
        for import in imports.iter().filter(|i| i.source == self.debug_tools_import) {
            bindings.collect(import)?;
        }

        let mut flag_inlines: Vec<(ImportId, Vec<ConstDecl>)> = Vec::new();
        for import in &imports {
            if self.tables.env.matches(import) {
                flag_inlines.push((import.id, self.tables.env.inline(import)?));
            } else if let Some(feature) = self.tables.feature_for(import) {
                flag_inlines.push((import.id, feature.inline(import)?));
            }
        }

        let ctx = BuildContext {
            target: &self.target,
            package_version: self.package_version.as_ref(),
        };
        let mut pending = PendingRewrites::new();
        let mut removals = Vec::new();
        let sites = if bindings.is_empty() {
            Vec::new()
        } else {
            tree.call_sites()
        };
        for site in &sites {
            let Some(kind) = bindings.dispatch(site) else {
                continue;
            };
            if let Some(outer) = enclosing_helper_call(site, &sites, &bindings) {
                return Err(MacroError::NestedHelper {
                    name: site.callee.clone(),
                    enclosing: outer.callee.clone(),
                });
            }
            debug!(helper = %kind, callee = %site.callee, "expanding call site");
            match expand(kind, &site.args, ctx)? {
                Expansion::Guarded(chain) => pending.register(site.id, chain),
                Expansion::Remove => removals.push(site.id),
            }
        }

        let plan = GuardPlan::prepare(&imports, &self.tables.env, !pending.is_empty())?;

        // Everything below mutates the tree.
        for site in &removals {
            tree.remove_call(*site);
        }

        let handled = plan.handled_import();
        let outcome = plan.apply(tree, pending);

        let mut inlined = u32::from(handled.is_some());
        for (import, decls) in flag_inlines {
            if Some(import) == handled {
                continue;
            }
            tree.replace_import(import, decls);
            inlined += 1;
        }

        cleanup_helper_import(tree, &bindings, self.externalized_module.as_deref());

        Ok(TransformReport {
            guard: outcome.guard,
            guard_synthesized: outcome.synthesized,
            expansions: outcome.expansions as u32,
            removed_deprecations: removals.len() as u32,
            inlined_flag_imports: inlined,
        })
    }

    pub fn transform_source(&self, source: &str) -> Result<TransformOutput, MacroError> {
        let _span = debug_span!("transform_source", bytes = source.len()).entered();
        let mut module = SourceModule::parse(source)?;
        let report = self.transform_tree(&mut module)?;
        Ok(TransformOutput {
            code: module.finish(),
            guard: report.guard,
            expansions: report.expansions,
            removed_deprecations: report.removed_deprecations,
        })
    }
}

/// The nearest call site around `site` that is itself a helper call.
/// Its replacement would carry the inner call through unexpanded.
fn enclosing_helper_call<'s>(
    site: &CallSite,
    sites: &'s [CallSite],
    bindings: &HelperBindings,
) -> Option<&'s CallSite> {
    let mut parent = site.parent;
    while let Some(id) = parent {
        let outer = sites.iter().find(|s| s.id == id)?;
        if bindings.dispatch(outer).is_some() {
            return Some(outer);
        }
        parent = outer.parent;
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn transform_module(
    source: &str,
    options: &MacroOptions,
) -> Result<TransformOutput, MacroError> {
    MacroTransformer::new(options)?.transform_source(source)
}

/// Transforms independent modules in parallel. Each module succeeds or fails
/// on its own; results keep the input order.
pub fn transform_modules(
    modules: &[(String, String)],
    options: &MacroOptions,
) -> Result<Vec<(String, Result<TransformOutput, MacroError>)>, MacroError> {
    let transformer = MacroTransformer::new(options)?;
    Ok(modules
        .par_iter()
        .map(|(path, source)| {
            let _span = debug_span!("module", path = %path).entered();
            (path.clone(), transformer.transform_source(source))
        })
        .collect())
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_debug_macros(
    code: String,
    options: serde_json::Value,
) -> napi::Result<TransformOutput> {
    let options = MacroOptions::from_value(options)?;
    Ok(transform_module(&code, &options)?)
}
