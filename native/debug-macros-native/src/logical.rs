//! Logical-Guard Compiler
//!
//! Folds leading conditions and a terminal diagnostic call into one
//! short-circuit chain whose leftmost operand is the guard identifier:
//!
//! ```text
//! guard && cond_1 && ... && cond_n && terminal
//! ```
//!
//! The chain is left-associated. The guard name is not known while call sites
//! are being scanned, so the chain is kept as a value and only resolved once
//! the name has been decided.

use crate::tree::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct GuardChain {
    leading: Vec<Expr>,
    terminal: Expr,
}

impl GuardChain {
    pub fn new(leading: Vec<Expr>, terminal: Expr) -> Self {
        Self { leading, terminal }
    }

    pub fn leading(&self) -> &[Expr] {
        &self.leading
    }

    /// Produces the parenthesized chain for `guard`.
    pub fn resolve(self, guard: &str) -> Expr {
        let head = Expr::ident(guard);
        let conditions = self.leading.into_iter().fold(head, Expr::and);
        Expr::paren(Expr::and(conditions, self.terminal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal() -> Expr {
        Expr::call(Expr::ident("warn"), vec![Expr::string("m")])
    }

    #[test]
    fn empty_leading_is_guard_and_terminal() {
        let expr = GuardChain::new(vec![], terminal()).resolve("_DEBUG");
        assert_eq!(expr.to_string(), r#"(_DEBUG && warn("m"))"#);
    }

    #[test]
    fn chain_is_left_associated() {
        let expr = GuardChain::new(vec![Expr::ident("a"), Expr::ident("b")], terminal())
            .resolve("DEBUG");

        let expected = Expr::paren(Expr::and(
            Expr::and(
                Expr::and(Expr::ident("DEBUG"), Expr::ident("a")),
                Expr::ident("b"),
            ),
            terminal(),
        ));
        assert_eq!(expr, expected);
        assert_eq!(expr.to_string(), r#"(DEBUG && a && b && warn("m"))"#);
    }
}
