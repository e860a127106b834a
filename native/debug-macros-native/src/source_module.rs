//! Source Module
//!
//! `ModuleTree` over real JavaScript/TypeScript source. The module is parsed
//! once with oxc and everything the engine may ask about is copied out of
//! the arena. Mutations are recorded as span edits and applied to the
//! original text by [`SourceModule::finish`], so untouched code keeps its
//! exact formatting.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, Expression, ExpressionStatement, ImportDeclarationSpecifier, ModuleExportName,
    ObjectPropertyKind, PropertyKey, PropertyKind, Statement,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use std::collections::HashSet;

use crate::error::MacroError;
use crate::tree::{
    unique_name, CallSite, ConstDecl, Expr, ImportBinding, ImportDecl, ImportId, ModuleTree,
    SiteId,
};

#[derive(Debug, Clone)]
struct ParsedImport {
    decl: ImportDecl,
    span: Span,
    source_span: Span,
}

#[derive(Debug, Clone)]
struct ParsedSite {
    site: CallSite,
    call_span: Span,
    statement_span: Span,
    /// Direct child of a statement list, so it can be deleted outright.
    in_statement_list: bool,
}

#[derive(Debug, Clone)]
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

#[derive(Debug)]
pub struct SourceModule {
    source: String,
    imports: Vec<ParsedImport>,
    sites: Vec<ParsedSite>,
    names: HashSet<String>,
    top_offset: u32,
    edits: Vec<Edit>,
}

impl SourceModule {
    pub fn parse(source: &str) -> Result<Self, MacroError> {
        let allocator = Allocator::default();
        let source_type = SourceType::default()
            .with_module(true)
            .with_typescript(true)
            .with_jsx(true);
        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            return Err(MacroError::Parse {
                errors: ret.errors.iter().map(|e| e.to_string()).collect(),
            });
        }
        let program = ret.program;

        let mut imports = Vec::new();
        for stmt in &program.body {
            let Statement::ImportDeclaration(decl) = stmt else {
                continue;
            };
            if decl.import_kind.is_type() {
                continue;
            }
            let mut specifiers = Vec::new();
            if let Some(list) = &decl.specifiers {
                for specifier in list {
                    specifiers.push(match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            ImportBinding::new(export_name(&s.imported), s.local.name.to_string())
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            ImportBinding::new("default", s.local.name.to_string())
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            ImportBinding::new("*", s.local.name.to_string())
                        }
                    });
                }
            }
            imports.push(ParsedImport {
                decl: ImportDecl {
                    id: ImportId(imports.len()),
                    source: decl.source.value.to_string(),
                    specifiers,
                },
                span: decl.span,
                source_span: decl.source.span,
            });
        }

        let mut collector = SiteCollector {
            source,
            sites: Vec::new(),
            enclosing: Vec::new(),
            names: HashSet::new(),
            list_statements: HashSet::new(),
        };
        collector.visit_program(&program);

        let top_offset = program
            .body
            .first()
            .map(|stmt| stmt.span().start)
            .unwrap_or(program.span.end);

        Ok(Self {
            source: source.to_string(),
            imports,
            sites: collector.sites,
            names: collector.names,
            top_offset,
            edits: Vec::new(),
        })
    }

    /// Applies the recorded edits and returns the rewritten source.
    ///
    /// Edits nested inside an earlier, wider edit are dropped; insertions at
    /// an offset land before a replacement starting at the same offset.
    pub fn finish(mut self) -> String {
        self.edits
            .sort_by_key(|e| (e.start, e.start != e.end, std::cmp::Reverse(e.end)));

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0usize;
        for edit in &self.edits {
            let (start, end) = (edit.start as usize, edit.end as usize);
            if start < cursor {
                continue;
            }
            out.push_str(&self.source[cursor..start]);
            out.push_str(&edit.text);
            cursor = end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }

    fn import(&self, id: ImportId) -> Option<&ParsedImport> {
        self.imports.get(id.0)
    }

    fn site(&self, id: SiteId) -> Option<&ParsedSite> {
        self.sites.get(id.0)
    }

    /// Whether the text before `at`, once removals are applied, ends where a
    /// new statement may safely open with `(`. A trailing comment counts as
    /// open.
    fn ends_statement_before(&self, at: u32) -> bool {
        let mut end = at as usize;
        loop {
            let before = self.source[..end].trim_end();
            let removed = self.edits.iter().find(|e| {
                e.text.is_empty() && e.start < e.end && e.end as usize == before.len()
            });
            match removed {
                Some(edit) => end = edit.start as usize,
                None => return matches!(before.chars().last(), None | Some(';' | '{' | '}')),
            }
        }
    }

    fn edit(&mut self, span: Span, text: String) {
        self.edits.push(Edit {
            start: span.start,
            end: span.end,
            text,
        });
    }
}

impl ModuleTree for SourceModule {
    fn imports(&self) -> Vec<ImportDecl> {
        self.imports.iter().map(|i| i.decl.clone()).collect()
    }

    fn call_sites(&self) -> Vec<CallSite> {
        self.sites.iter().map(|s| s.site.clone()).collect()
    }

    fn generate_uid(&mut self, hint: &str) -> String {
        let name = unique_name(hint, |candidate| self.names.contains(candidate));
        self.names.insert(name.clone());
        name
    }

    fn replace_call(&mut self, site: SiteId, replacement: Expr) {
        let Some(parsed) = self.site(site) else {
            return;
        };
        let span = parsed.call_span;
        let mut text = replacement.to_string();
        // A statement opening with `(` would continue a previous statement
        // that relies on automatic semicolon insertion.
        if parsed.in_statement_list
            && span.start == parsed.statement_span.start
            && text.starts_with('(')
            && !self.ends_statement_before(span.start)
        {
            text.insert(0, ';');
        }
        self.edit(span, text);
    }

    fn remove_call(&mut self, site: SiteId) {
        if let Some(parsed) = self.site(site) {
            let text = if parsed.in_statement_list { "" } else { ";" };
            let span = parsed.statement_span;
            self.edit(span, text.to_string());
        }
    }

    fn insert_at_top(&mut self, decl: ConstDecl) {
        let at = self.top_offset;
        self.edit(Span::new(at, at), format!("{}\n", decl));
    }

    fn replace_import(&mut self, import: ImportId, decls: Vec<ConstDecl>) {
        if let Some(span) = self.import(import).map(|i| i.span) {
            let text = decls
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            self.edit(span, text);
        }
    }

    fn remove_import(&mut self, import: ImportId) {
        if let Some(span) = self.import(import).map(|i| i.span) {
            self.edit(span, String::new());
        }
    }

    fn set_import_source(&mut self, import: ImportId, source: &str) {
        if let Some(span) = self.import(import).map(|i| i.source_span) {
            self.edit(span, Expr::string(source).to_string());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

struct SiteCollector<'s> {
    source: &'s str,
    sites: Vec<ParsedSite>,
    /// Sites whose arguments are being walked, innermost last.
    enclosing: Vec<SiteId>,
    names: HashSet<String>,
    list_statements: HashSet<(u32, u32)>,
}

impl<'a, 's> Visit<'a> for SiteCollector<'s> {
    fn visit_statements(&mut self, stmts: &oxc_allocator::Vec<'a, Statement<'a>>) {
        for stmt in stmts {
            if let Statement::ExpressionStatement(es) = stmt {
                self.list_statements.insert((es.span.start, es.span.end));
            }
        }
        walk::walk_statements(self, stmts);
    }

    fn visit_expression_statement(&mut self, stmt: &ExpressionStatement<'a>) {
        let Expression::CallExpression(call) = &stmt.expression else {
            return walk::walk_expression_statement(self, stmt);
        };
        let Expression::Identifier(callee) = &call.callee else {
            return walk::walk_expression_statement(self, stmt);
        };
        if call.optional {
            return walk::walk_expression_statement(self, stmt);
        }

        let id = SiteId(self.sites.len());
        let args = call
            .arguments
            .iter()
            .map(|arg| convert_argument(arg, self.source))
            .collect();
        self.sites.push(ParsedSite {
            site: CallSite {
                id,
                callee: callee.name.to_string(),
                args,
                parent: self.enclosing.last().copied(),
            },
            call_span: call.span,
            statement_span: stmt.span,
            in_statement_list: self
                .list_statements
                .contains(&(stmt.span.start, stmt.span.end)),
        });

        self.enclosing.push(id);
        walk::walk_expression_statement(self, stmt);
        self.enclosing.pop();
    }

    fn visit_identifier_reference(&mut self, ident: &oxc_ast::ast::IdentifierReference<'a>) {
        self.names.insert(ident.name.to_string());
    }

    fn visit_binding_identifier(&mut self, ident: &oxc_ast::ast::BindingIdentifier<'a>) {
        self.names.insert(ident.name.to_string());
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

fn source_text(source: &str, span: Span) -> String {
    source[span.start as usize..span.end as usize].to_string()
}

fn convert_argument(arg: &Argument, source: &str) -> Expr {
    match arg.as_expression() {
        Some(expr) => convert_expression(expr, source),
        None => Expr::raw(source_text(source, arg.span()), true),
    }
}

/// Copies an oxc expression into the engine's [`Expr`]. Only the shapes the
/// builders inspect are kept structured.
fn convert_expression(expr: &Expression, source: &str) -> Expr {
    match expr {
        Expression::Identifier(id) => Expr::Identifier(id.name.to_string()),
        Expression::StringLiteral(s) => Expr::String(s.value.to_string()),
        Expression::BooleanLiteral(b) => Expr::Bool(b.value),
        Expression::NullLiteral(_) => Expr::Null,
        Expression::ObjectExpression(obj) => {
            let mut props = Vec::new();
            for property in &obj.properties {
                let ObjectPropertyKind::ObjectProperty(p) = property else {
                    return Expr::raw(source_text(source, obj.span), true);
                };
                let key = match &p.key {
                    PropertyKey::StaticIdentifier(id) => id.name.to_string(),
                    PropertyKey::StringLiteral(s) => s.value.to_string(),
                    _ => return Expr::raw(source_text(source, obj.span), true),
                };
                if p.computed || p.method || !matches!(p.kind, PropertyKind::Init) {
                    return Expr::raw(source_text(source, obj.span), true);
                }
                props.push((key, convert_expression(&p.value, source)));
            }
            Expr::Object(props)
        }
        _ => {
            let atomic = !matches!(
                expr,
                Expression::LogicalExpression(_)
                    | Expression::ConditionalExpression(_)
                    | Expression::AssignmentExpression(_)
                    | Expression::SequenceExpression(_)
                    | Expression::ArrowFunctionExpression(_)
                    | Expression::YieldExpression(_)
            );
            Expr::raw(source_text(source, expr.span()), atomic)
        }
    }
}
