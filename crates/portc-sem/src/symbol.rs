//! The semantic entity behind a declared name.

use crate::types::Type;
use portc_par::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Procedure,
    Argument,
    Local,
}

#[derive(Debug, Clone)]
pub struct ParamDesc {
    pub name: String,
    pub ty: Type,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// The AST node that declared this symbol (a `Procedure` node for
    /// procedures, the declaring `Ident` node for arguments and locals).
    pub decl: NodeId,
    /// Filled in by the type checker; absent only between resolution and
    /// the signature-inference pass.
    pub ty: Option<Type>,
    pub is_builtin: bool,
    /// Ordered parameter list, present only on `Procedure` symbols.
    pub params: Option<Vec<ParamDesc>>,
}
