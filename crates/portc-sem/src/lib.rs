//! portc-sem - name resolution and type checking for Portugol.
//!
//! Two independent passes run in sequence over the parsed AST: the
//! [`resolve`] module builds nested lexical scopes and binds every
//! identifier occurrence to a symbol, then the [`check`] module infers
//! procedure signatures and checks the typing rules of §4.4 over the
//! resolved tree. [`analyze`] composes both and hands the result to the
//! emitter as an [`Analysis`].

pub mod check;
pub mod resolve;
pub mod scope;
pub mod symbol;
pub mod types;

use portc_par::{Module, NodeId};
use portc_util::Diagnostic;
use scope::{ScopeId, ScopeTree};
use std::collections::HashMap;
use types::Type;

pub use symbol::{ParamDesc, Symbol, SymbolKind};
pub use types::ProcType;

/// Everything the emitter needs: the resolved scope tree, the scope each
/// identifier's lookup started from, and every expression's inferred type.
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeTree,
    pub global: ScopeId,
    pub node_scope: HashMap<NodeId, ScopeId>,
    pub types: HashMap<NodeId, Type>,
}

/// Run the resolver then the type checker over a parsed module.
pub fn analyze(module: &Module, file: &str) -> Result<Analysis, Diagnostic> {
    let resolution = resolve::resolve(module, file)?;
    let mut scopes = resolution.scopes;

    check::infer_signatures(module, &mut scopes, &resolution.node_scope, resolution.global)?;
    check::check_entry_shape(&scopes, module, resolution.global, file)?;

    let mut checker = check::Checker::new(&mut scopes, &resolution.node_scope, file);
    checker.check_module(module)?;
    let types = checker.types;

    Ok(Analysis { scopes, global: resolution.global, node_scope: resolution.node_scope, types })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline_analyzes_a_valid_program() {
        let module = portc_par::parse(
            "inteiro soma(inteiro a, inteiro b) { retorne a + b; } \
             inteiro entrada() { inteiro total; total = soma(1, 2); imprima(total); retorne total; }",
            "ok.por",
        )
        .unwrap();
        let analysis = analyze(&module, "ok.por").unwrap();
        assert!(!analysis.types.is_empty());
    }

    #[test]
    fn full_pipeline_rejects_missing_entry_point() {
        let module = portc_par::parse("inteiro soma() { retorne 0; }", "bad.por").unwrap();
        let err = analyze(&module, "bad.por").unwrap_err();
        assert_eq!(err.code, portc_util::DiagnosticCode::NoEntryPoint);
    }
}
