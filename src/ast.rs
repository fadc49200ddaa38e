// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the yy language.
//
// yy is expression-oriented: there is no statement type, a program is an
// ordered list of expressions and every construct (blocks, conditionals,
// loops) evaluates to a value. Nodes are immutable after parsing; function
// bodies are reference-counted so closures can share them without cloning
// the tree.

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    /// `arr << value`, in-place append yielding the array handle
    Append,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Append => "<<",
        };
        write!(f, "{}", symbol)
    }
}

/// One segment of an interpolated string literal
#[derive(Debug, Clone)]
pub enum StrSegment {
    Text(String),
    Expr(Box<Expr>),
}

/// An expression in yy: every construct evaluates to a value
#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    Str(String),
    /// String with embedded `{expr}` spans
    TemplateStr(Vec<StrSegment>),
    Bool(bool),
    Null,
    Identifier(String),
    /// Inclusive integer range `a..b`
    Range { start: Box<Expr>, end: Box<Expr> },
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `%{ key: value, ... }` with expression keys
    Map(Vec<(Expr, Expr)>),
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    /// `name := value` (declare == true) or `target = value`. Compound
    /// assignments carry their combining operator in `op`, so an Index
    /// target's object and subscript are evaluated once for both the read
    /// and the write.
    Assign { declare: bool, op: Option<BinaryOp>, target: Box<Expr>, value: Box<Expr> },
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `x[a..b]`, distinguished from Index at parse time
    Slice { object: Box<Expr>, start: Box<Expr>, end: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `\a, b { body }`
    Function { params: Vec<String>, body: Rc<Vec<Expr>> },
    /// Bare block used as a loop/conditional body; value is the last
    /// expression's value, Null when empty
    Block(Vec<Expr>),
    /// `yif g {..} yels yif g2 {..} yels {..}` flattened into guard/body arms
    Yif { arms: Vec<(Expr, Vec<Expr>)>, yels: Option<Vec<Expr>> },
    /// `yall [binder:] iterable { body }`
    Yall { binder: Option<String>, iterable: Box<Expr>, body: Vec<Expr> },
    /// `yoyo [cond] { body }`; a missing condition loops until yeet/abort
    Yoyo { condition: Option<Box<Expr>>, body: Vec<Expr> },
    /// `yeet [value]`, early return from the enclosing function
    Yeet(Option<Box<Expr>>),
    /// `yikes(msg...)`, fatal abort carrying a formatted message
    Yikes(Vec<Expr>),
    /// `yolo { body }`, body runs with dynamic coercions enabled
    Yolo(Vec<Expr>),
}

impl Expr {
    /// True for targets that may appear on the left of an assignment
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Identifier(_) | Expr::Index { .. })
    }
}
