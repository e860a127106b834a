//! In-memory `ModuleTree` used to exercise the engine without a parser.

use std::collections::HashSet;

use crate::tree::{
    unique_name, CallSite, ConstDecl, Expr, ImportBinding, ImportDecl, ImportId, ModuleTree,
    SiteId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeNode {
    Import(ImportDecl),
    Const(ConstDecl),
    Call(CallSite),
    Rewritten(SiteId, Expr),
    Other(String),
}

#[derive(Debug, Default)]
pub struct FakeModule {
    pub body: Vec<FakeNode>,
    /// Mutations in the order the engine performed them.
    pub log: Vec<String>,
    names: HashSet<String>,
    next_import: usize,
    next_site: usize,
}

impl FakeModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(mut self, source: &str, specifiers: &[(&str, &str)]) -> Self {
        let specifiers: Vec<ImportBinding> = specifiers
            .iter()
            .map(|(imported, local)| ImportBinding::new(*imported, *local))
            .collect();
        for spec in &specifiers {
            self.names.insert(spec.local.clone());
        }
        self.body.push(FakeNode::Import(ImportDecl {
            id: ImportId(self.next_import),
            source: source.to_string(),
            specifiers,
        }));
        self.next_import += 1;
        self
    }

    pub fn call(self, callee: &str, args: Vec<Expr>) -> Self {
        self.push_call(callee, args, None)
    }

    /// A call statement inside the arguments of the `parent` site.
    pub fn call_within(self, parent: usize, callee: &str, args: Vec<Expr>) -> Self {
        self.push_call(callee, args, Some(SiteId(parent)))
    }

    fn push_call(mut self, callee: &str, args: Vec<Expr>, parent: Option<SiteId>) -> Self {
        self.names.insert(callee.to_string());
        for arg in &args {
            if let Expr::Identifier(name) = arg {
                self.names.insert(name.clone());
            }
        }
        self.body.push(FakeNode::Call(CallSite {
            id: SiteId(self.next_site),
            callee: callee.to_string(),
            args,
            parent,
        }));
        self.next_site += 1;
        self
    }

    pub fn declare(mut self, name: &str) -> Self {
        self.names.insert(name.to_string());
        self.body.push(FakeNode::Other(format!("let {};", name)));
        self
    }

    /// One line per node, roughly as JavaScript.
    pub fn render(&self) -> Vec<String> {
        self.body
            .iter()
            .map(|node| match node {
                FakeNode::Import(import) => {
                    let specs = import
                        .specifiers
                        .iter()
                        .map(|s| {
                            if s.imported == s.local {
                                s.local.clone()
                            } else {
                                format!("{} as {}", s.imported, s.local)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("import {{ {} }} from \"{}\";", specs, import.source)
                }
                FakeNode::Const(decl) => decl.to_string(),
                FakeNode::Call(site) => {
                    format!("{};", Expr::call(Expr::ident(site.callee.clone()), site.args.clone()))
                }
                FakeNode::Rewritten(_, expr) => format!("{};", expr),
                FakeNode::Other(text) => text.clone(),
            })
            .collect()
    }

    fn position(&self, pred: impl Fn(&FakeNode) -> bool) -> Option<usize> {
        self.body.iter().position(pred)
    }

    fn site_position(&self, site: SiteId) -> Option<usize> {
        self.position(|n| matches!(n, FakeNode::Call(c) if c.id == site))
    }

    fn import_position(&self, import: ImportId) -> Option<usize> {
        self.position(|n| matches!(n, FakeNode::Import(i) if i.id == import))
    }
}

impl ModuleTree for FakeModule {
    fn imports(&self) -> Vec<ImportDecl> {
        self.body
            .iter()
            .filter_map(|n| match n {
                FakeNode::Import(i) => Some(i.clone()),
                _ => None,
            })
            .collect()
    }

    fn call_sites(&self) -> Vec<CallSite> {
        self.body
            .iter()
            .filter_map(|n| match n {
                FakeNode::Call(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    fn generate_uid(&mut self, hint: &str) -> String {
        let name = unique_name(hint, |candidate| self.names.contains(candidate));
        self.names.insert(name.clone());
        name
    }

    fn replace_call(&mut self, site: SiteId, replacement: Expr) {
        if let Some(pos) = self.site_position(site) {
            self.body[pos] = FakeNode::Rewritten(site, replacement);
            self.log.push(format!("replace site {}", site.0));
        }
    }

    fn remove_call(&mut self, site: SiteId) {
        if let Some(pos) = self.site_position(site) {
            self.body.remove(pos);
            self.log.push(format!("remove site {}", site.0));
        }
    }

    fn insert_at_top(&mut self, decl: ConstDecl) {
        self.log.push(format!("insert {}", decl.name));
        self.body.insert(0, FakeNode::Const(decl));
    }

    fn replace_import(&mut self, import: ImportId, decls: Vec<ConstDecl>) {
        if let Some(pos) = self.import_position(import) {
            self.body
                .splice(pos..=pos, decls.into_iter().map(FakeNode::Const));
            self.log.push(format!("inline import {}", import.0));
        }
    }

    fn remove_import(&mut self, import: ImportId) {
        if let Some(pos) = self.import_position(import) {
            self.body.remove(pos);
            self.log.push(format!("remove import {}", import.0));
        }
    }

    fn set_import_source(&mut self, import: ImportId, source: &str) {
        if let Some(pos) = self.import_position(import) {
            if let FakeNode::Import(decl) = &mut self.body[pos] {
                decl.source = source.to_string();
            }
            self.log.push(format!("retarget import {}", import.0));
        }
    }
}
