//! The typed Abstract Syntax Tree.
//!
//! Every node is wrapped in [`Spanned`], carrying a span alongside the payload rather
//! than inside every variant (the `SymExpSrc { src, exp }` pattern). The grammar outline
//! is informative rather than a full reference grammar; this module fixes the concrete
//! shape the parser and evaluator agree on, including a handful of productions left
//! implicit by that outline (list literals, object literals, block expressions — see
//! `DESIGN.md`).

use crate::span::Span;

/// A node tagged with the source span it was parsed from.
#[derive(Debug, Clone)]
pub struct Spanned<T> {
    pub span: Span,
    pub node: T,
}

impl<T> Spanned<T> {
    pub fn new(span: Span, node: T) -> Self {
        Self { span, node }
    }
}

pub type Expr = Spanned<ExprKind>;
pub type Stmt = Spanned<StmtKind>;

#[derive(Debug, Clone)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Let {
        name: String,
        value: Expr,
    },
    Import {
        name: String,
        alias: Option<String>,
        from: String,
    },
    FnDef(FunctionLit),
    Break(Option<Expr>),
    Continue,
    Return(Option<Expr>),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct FunctionLit {
    pub name: Option<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_branch: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    Block(Block),
    If(Box<IfExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    IntDivAssign,
    RemAssign,
    PowAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies before storing.
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
            AssignOp::IntDivAssign => Some(BinaryOp::IntDiv),
            AssignOp::RemAssign => Some(BinaryOp::Rem),
            AssignOp::PowAssign => Some(BinaryOp::Pow),
        }
    }
}

/// Cast targets (`value as T`); limited to Number, String, Bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    Number,
    String,
    Bool,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Null,
    Number(f64),
    Bool(bool),
    Str(String),
    Ident(String),
    Pair(Box<Expr>, Box<Expr>),
    List(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Range(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Cast(Box<Expr>, CastTarget),
    Assign(Box<Expr>, AssignOp, Box<Expr>),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    If(IfExpr),
    For {
        var: String,
        lower: Box<Expr>,
        upper: Box<Expr>,
        body: Block,
    },
    While {
        cond: Box<Expr>,
        body: Block,
    },
    Loop {
        body: Block,
    },
    Try {
        try_block: Block,
        err_name: String,
        catch_block: Block,
    },
    Fn(FunctionLit),
    Block(Block),
}

/// A parsed module: its own statement list plus the filename it came from.
#[derive(Debug, Clone)]
pub struct Module {
    pub filename: std::rc::Rc<str>,
    pub stmts: Vec<Stmt>,
}
