//! Abstract syntax tree for the restricted condition grammar.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    /// List or tuple literal; only meaningful on the right of `in`.
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Chained comparison: `a < b <= c` is `a < b and b <= c`, with `b`
    /// evaluated once.
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Names of every variable referenced anywhere in the tree.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    /// Height of the tree; a lone literal or variable has depth 1.
    pub fn depth(&self) -> usize {
        1 + match self {
            Expr::Literal(_) | Expr::Variable(_) => 0,
            Expr::List(items) => items.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::Unary(_, inner) => inner.depth(),
            Expr::Binary(_, l, r) | Expr::And(l, r) | Expr::Or(l, r) => l.depth().max(r.depth()),
            Expr::Compare(first, rest) => rest
                .iter()
                .map(|(_, e)| e.depth())
                .fold(first.depth(), usize::max),
        }
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(name) => {
                out.insert(name.clone());
            }
            Expr::List(items) => items.iter().for_each(|e| e.collect_variables(out)),
            Expr::Unary(_, inner) => inner.collect_variables(out),
            Expr::Binary(_, l, r) | Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            Expr::Compare(first, rest) => {
                first.collect_variables(out);
                rest.iter().for_each(|(_, e)| e.collect_variables(out));
            }
        }
    }
}
