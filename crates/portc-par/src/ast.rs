//! Abstract syntax tree: one sum type per syntactic category (`Procedure`,
//! `Stmt`, `Expr`, type terminals) rather than a single generic tagged node.
//!
//! Every node that a later pass annotates (with a resolved scope or an
//! inferred type) carries a [`NodeId`]; the annotation itself lives in a
//! side table owned by that pass (`portc-sem`), since the AST here cannot
//! depend on `portc-sem`'s `Type`.

use portc_util::{Position, Range};

/// Identifies an AST node for side-table lookups (scopes, inferred types).
pub type NodeId = u32;

pub(crate) fn covering(ranges: impl IntoIterator<Item = Range>, fallback: Position) -> Range {
    let mut iter = ranges.into_iter();
    match iter.next() {
        None => Range::point(fallback),
        Some(first) => iter.fold(first, |acc, r| acc.union(r)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    Real,
    Inteiro,
    Caractere,
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub id: NodeId,
    pub keyword: TypeKeyword,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeNode,
    pub name: Ident,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub procedures: Vec<Procedure>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Procedure {
    pub id: NodeId,
    pub ret_type: Option<TypeNode>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Block,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign(Assign),
    VarDecl(VarDecl),
    Call(Expr),
    Read(Read),
    Print(Print),
    Return(Return),
    If(If),
    While(While),
    For(For),
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub id: NodeId,
    pub target: Ident,
    pub value: Expr,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeNode,
    pub names: Vec<Ident>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Read {
    pub target: Ident,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct StringLit {
    pub id: NodeId,
    pub text: String,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub enum PrintArg {
    Str(StringLit),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Print {
    pub arg: PrintArg,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub value: Expr,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct If {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct While {
    pub cond: Expr,
    pub body: Block,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct For {
    pub init: Assign,
    pub cond: Expr,
    pub step: Assign,
    pub body: Block,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit { id: NodeId, value: i64, range: Range },
    RealLit { id: NodeId, value: f64, range: Range },
    CharLit { id: NodeId, value: i64, range: Range },
    Ident(Ident),
    Binary { id: NodeId, op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, range: Range },
    Unary { id: NodeId, op: UnOp, operand: Box<Expr>, range: Range },
    Call { id: NodeId, callee: Ident, args: Vec<Expr>, range: Range },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::IntLit { id, .. }
            | Expr::RealLit { id, .. }
            | Expr::CharLit { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Call { id, .. } => *id,
            Expr::Ident(ident) => ident.id,
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Expr::IntLit { range, .. }
            | Expr::RealLit { range, .. }
            | Expr::CharLit { range, .. }
            | Expr::Binary { range, .. }
            | Expr::Unary { range, .. }
            | Expr::Call { range, .. } => *range,
            Expr::Ident(ident) => ident.range,
        }
    }
}

impl Stmt {
    pub fn range(&self) -> Range {
        match self {
            Stmt::Assign(a) => a.range,
            Stmt::VarDecl(v) => v.range,
            Stmt::Call(e) => e.range(),
            Stmt::Read(r) => r.range,
            Stmt::Print(p) => p.range,
            Stmt::Return(r) => r.range,
            Stmt::If(i) => i.range,
            Stmt::While(w) => w.range,
            Stmt::For(f) => f.range,
        }
    }
}
