//! Lexical scope tree: a parent-linked chain of ribs, one per procedure
//! (`argScope`) and per block, rooted at the process-wide Universe scope.

use crate::symbol::{ParamDesc, Symbol, SymbolKind};
use crate::types::{ProcType, Type};
use portc_util::index_vec::{Idx, IndexVec};
use std::collections::HashMap;
use std::fmt;

/// A handle to a lexical scope. Stable for the rest of compilation once
/// assigned, and reused by the emitter as a local-name mangling suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl Idx for ScopeId {
    fn from_usize(idx: usize) -> Self {
        ScopeId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const UNIVERSE: ScopeId = ScopeId(0);

#[derive(Debug)]
struct Rib {
    parent: Option<ScopeId>,
    bindings: HashMap<String, Symbol>,
}

/// The tree of lexical scopes built during resolution. IDs are assigned by
/// a monotonically increasing counter starting at 0 for the Universe scope;
/// they are stable for the rest of compilation and reused by the emitter
/// as mangling keys.
#[derive(Debug)]
pub struct ScopeTree {
    ribs: IndexVec<ScopeId, Rib>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        let mut universe = Rib { parent: None, bindings: HashMap::new() };
        for sym in builtins() {
            universe.bindings.insert(sym.name.clone(), sym);
        }
        let mut ribs = IndexVec::new();
        ribs.push(universe);
        Self { ribs }
    }

    pub fn create_child(&mut self, parent: ScopeId) -> ScopeId {
        self.ribs.push(Rib { parent: Some(parent), bindings: HashMap::new() })
    }

    /// Insert `symbol` into `scope`. Fails if the name is already bound
    /// in this exact scope (shadowing an ancestor scope is fine).
    #[allow(clippy::result_unit_err)]
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), ()> {
        let rib = &mut self.ribs[scope];
        if rib.bindings.contains_key(&symbol.name) {
            return Err(());
        }
        rib.bindings.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Walk from `scope` up through ancestors, returning the scope the
    /// binding actually lives in along with the symbol.
    pub fn find(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let rib = &self.ribs[id];
            if let Some(sym) = rib.bindings.get(name) {
                return Some((id, sym));
            }
            cur = rib.parent;
        }
        None
    }

    /// Direct (non-walking) mutable access, for the type checker writing
    /// inferred types back onto symbols whose home scope is already known.
    pub fn get_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.ribs[scope].bindings.get_mut(name)
    }
}

fn builtins() -> Vec<Symbol> {
    vec![
        Symbol {
            name: "raiz".to_string(),
            kind: SymbolKind::Procedure,
            decl: 0,
            ty: Some(Type::Procedure(ProcType { params: vec![Type::Real], ret: Box::new(Type::Real) })),
            is_builtin: true,
            params: Some(vec![ParamDesc { name: "x".to_string(), ty: Type::Real, position: 0 }]),
        },
        Symbol {
            name: "expo".to_string(),
            kind: SymbolKind::Procedure,
            decl: 0,
            ty: Some(Type::Procedure(ProcType { params: vec![Type::Real, Type::Real], ret: Box::new(Type::Real) })),
            is_builtin: true,
            params: Some(vec![
                ParamDesc { name: "base".to_string(), ty: Type::Real, position: 0 },
                ParamDesc { name: "expoente".to_string(), ty: Type::Real, position: 1 },
            ]),
        },
    ]
}
