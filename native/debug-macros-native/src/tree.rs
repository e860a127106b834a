//! Tree Interface
//!
//! The narrow view of a module the macro engine works against. The engine
//! never touches a concrete syntax tree: it reads imports and call sites,
//! builds replacement expressions out of [`Expr`], and asks the tree to
//! perform the edits. `SourceModule` implements this on top of oxc; tests
//! substitute an in-memory tree.

use std::fmt;

use crate::options::is_valid_identifier;

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// The expression shapes the engine inspects or constructs.
///
/// Anything the engine does not need to look into is carried as [`Expr::Raw`],
/// the verbatim source text of the original expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    String(String),
    Number(i64),
    Bool(bool),
    Null,
    Object(Vec<(String, Expr)>),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    LogicalAnd(Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),
    /// Source text of an expression the engine forwards untouched.
    /// `atomic` is false when the text would need parentheses as an
    /// operand of `&&`.
    Raw { text: String, atomic: bool },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::String(value.into())
    }

    pub fn raw(text: impl Into<String>, atomic: bool) -> Self {
        Expr::Raw {
            text: text.into(),
            atomic,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::LogicalAnd(Box::new(left), Box::new(right))
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Paren(Box::new(inner))
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Expr::Identifier(_))
    }

    pub fn as_str_literal(&self) -> Option<&str> {
        match self {
            Expr::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a static property of an object literal.
    pub fn property(&self, key: &str) -> Option<&Expr> {
        match self {
            Expr::Object(props) => props.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn needs_parens_in_and(&self) -> bool {
        matches!(self, Expr::Raw { atomic: false, .. } | Expr::Object(_))
    }
}

fn write_and_operand(f: &mut fmt::Formatter<'_>, operand: &Expr) -> fmt::Result {
    if operand.needs_parens_in_and() {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    // JSON string escaping is valid JS string escaping.
    match serde_json::to_string(value) {
        Ok(quoted) => f.write_str(&quoted),
        Err(_) => Err(fmt::Error),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(name) => f.write_str(name),
            Expr::String(value) => write_string_literal(f, value),
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Null => f.write_str("null"),
            Expr::Object(props) => {
                if props.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_valid_identifier(key) {
                        f.write_str(key)?;
                    } else {
                        write_string_literal(f, key)?;
                    }
                    write!(f, ": {}", value)?;
                }
                f.write_str(" }")
            }
            Expr::Member { object, property } => write!(f, "{}.{}", object, property),
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::LogicalAnd(left, right) => {
                write_and_operand(f, left)?;
                f.write_str(" && ")?;
                write_and_operand(f, right)
            }
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::Raw { text, .. } => f.write_str(text),
        }
    }
}

/// `const <name> = <value>;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub value: Expr,
}

impl ConstDecl {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for ConstDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const {} = {};", self.name, self.value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE VIEW
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifies a top-level import statement of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportId(pub usize);

/// Identifies a call site. Ids increase in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub usize);

/// One specifier of an import statement. Default imports use the imported
/// name `default`, namespace imports use `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
}

impl ImportBinding {
    pub fn new(imported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            imported: imported.into(),
            local: local.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub id: ImportId,
    pub source: String,
    pub specifiers: Vec<ImportBinding>,
}

/// An expression statement whose expression is a call on a plain identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub id: SiteId,
    pub callee: String,
    pub args: Vec<Expr>,
    /// The nearest call site whose arguments contain this one.
    pub parent: Option<SiteId>,
}

/// Inspection and mutation capabilities the engine needs from a module.
///
/// Mutations take effect on the module itself; the engine performs all of
/// its validation before calling any of them.
pub trait ModuleTree {
    /// Top-level import statements in source order.
    fn imports(&self) -> Vec<ImportDecl>;

    /// Candidate macro call sites in source order.
    fn call_sites(&self) -> Vec<CallSite>;

    /// Returns a name derived from `hint` that collides with nothing in the
    /// module, and reserves it.
    fn generate_uid(&mut self, hint: &str) -> String;

    fn replace_call(&mut self, site: SiteId, replacement: Expr);

    fn remove_call(&mut self, site: SiteId);

    fn insert_at_top(&mut self, decl: ConstDecl);

    fn replace_import(&mut self, import: ImportId, decls: Vec<ConstDecl>);

    fn remove_import(&mut self, import: ImportId);

    fn set_import_source(&mut self, import: ImportId, source: &str);

    /// Resolves a local name to the import statement that declares it.
    fn import_declaring(&self, local: &str) -> Option<ImportId> {
        self.imports()
            .into_iter()
            .find(|import| import.specifiers.iter().any(|s| s.local == local))
            .map(|import| import.id)
    }
}

/// Picks `_hint`, `_hint2`, `_hint3`, ... until `is_taken` rejects none.
pub fn unique_name(hint: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let base = format!("_{}", hint.trim_start_matches('_'));
    if !is_taken(&base) {
        return base;
    }
    let mut i = 2;
    loop {
        let candidate = format!("{}{}", base, i);
        if !is_taken(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
