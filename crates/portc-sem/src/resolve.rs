//! Two-pass name resolver: Pass 1 declares every top-level procedure in the
//! Global scope, Pass 2 walks each body creating a scope per block and
//! binding every identifier occurrence.

use crate::scope::{ScopeId, ScopeTree, UNIVERSE};
use crate::symbol::{Symbol, SymbolKind};
use portc_par::{Assign, Block, Expr, For, Ident, If, Module, PrintArg, Stmt, While};
use portc_util::{Diagnostic, DiagnosticCode, Range};
use std::collections::HashMap;

use portc_par::NodeId;

/// The result of resolution: the scope tree, the Global scope id, and a
/// table mapping every `Ident` node to the scope its lookup should start
/// from (its own home scope, for declaring occurrences).
#[derive(Debug)]
pub struct Resolution {
    pub scopes: ScopeTree,
    pub global: ScopeId,
    pub node_scope: HashMap<NodeId, ScopeId>,
}

fn already_defined(file: &str, range: Range, name: &str) -> Diagnostic {
    Diagnostic::at(
        DiagnosticCode::NameAlreadyDefined,
        format!("'{name}' is already defined in this scope"),
        file,
        range,
    )
}

fn not_declared(file: &str, range: Range, name: &str) -> Diagnostic {
    Diagnostic::at(
        DiagnosticCode::SymbolNotDeclared,
        format!("'{name}' is not declared"),
        file,
        range,
    )
}

pub fn resolve(module: &Module, file: &str) -> Result<Resolution, Diagnostic> {
    let mut scopes = ScopeTree::new();
    let mut node_scope = HashMap::new();
    let global = scopes.create_child(UNIVERSE);

    for proc in &module.procedures {
        let symbol = Symbol {
            name: proc.name.name.clone(),
            kind: SymbolKind::Procedure,
            decl: proc.id,
            ty: None,
            is_builtin: false,
            params: None,
        };
        scopes
            .declare(global, symbol)
            .map_err(|_| already_defined(file, proc.name.range, &proc.name.name))?;
    }

    for proc in &module.procedures {
        let arg_scope = scopes.create_child(global);
        node_scope.insert(proc.id, arg_scope);

        for param in &proc.params {
            let symbol = Symbol {
                name: param.name.name.clone(),
                kind: SymbolKind::Argument,
                decl: param.name.id,
                ty: None,
                is_builtin: false,
                params: None,
            };
            scopes
                .declare(arg_scope, symbol)
                .map_err(|_| already_defined(file, param.name.range, &param.name.name))?;
            node_scope.insert(param.name.id, arg_scope);
        }

        resolve_block(&proc.body, arg_scope, &mut scopes, &mut node_scope, file)?;
    }

    if scopes.find(global, "entrada").is_none() {
        return Err(Diagnostic::at(
            DiagnosticCode::NoEntryPoint,
            "no procedure named 'entrada' was found",
            file,
            module.range,
        ));
    }

    Ok(Resolution { scopes, global, node_scope })
}

fn resolve_block(
    block: &Block,
    parent: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    let own = scopes.create_child(parent);
    node_scope.insert(block.id, own);
    for stmt in &block.stmts {
        resolve_stmt(stmt, own, scopes, node_scope, file)?;
    }
    Ok(())
}

fn resolve_stmt(
    stmt: &Stmt,
    scope: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    match stmt {
        Stmt::Assign(a) => resolve_assign(a, scope, scopes, node_scope, file),
        Stmt::VarDecl(v) => {
            for name in &v.names {
                let symbol = Symbol {
                    name: name.name.clone(),
                    kind: SymbolKind::Local,
                    decl: name.id,
                    ty: None,
                    is_builtin: false,
                    params: None,
                };
                scopes
                    .declare(scope, symbol)
                    .map_err(|_| already_defined(file, name.range, &name.name))?;
                node_scope.insert(name.id, scope);
            }
            Ok(())
        }
        Stmt::Call(e) => resolve_expr(e, scope, scopes, node_scope, file),
        Stmt::Read(r) => resolve_ident_use(&r.target, scope, scopes, node_scope, file),
        Stmt::Print(p) => match &p.arg {
            PrintArg::Str(_) => Ok(()),
            PrintArg::Expr(e) => resolve_expr(e, scope, scopes, node_scope, file),
        },
        Stmt::Return(r) => resolve_expr(&r.value, scope, scopes, node_scope, file),
        Stmt::If(i) => resolve_if(i, scope, scopes, node_scope, file),
        Stmt::While(w) => resolve_while(w, scope, scopes, node_scope, file),
        Stmt::For(f) => resolve_for(f, scope, scopes, node_scope, file),
    }
}

fn resolve_assign(
    a: &Assign,
    scope: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    resolve_ident_use(&a.target, scope, scopes, node_scope, file)?;
    resolve_expr(&a.value, scope, scopes, node_scope, file)
}

fn resolve_if(
    i: &If,
    scope: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    resolve_expr(&i.cond, scope, scopes, node_scope, file)?;
    resolve_block(&i.then_block, scope, scopes, node_scope, file)?;
    if let Some(else_block) = &i.else_block {
        resolve_block(else_block, scope, scopes, node_scope, file)?;
    }
    Ok(())
}

fn resolve_while(
    w: &While,
    scope: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    resolve_expr(&w.cond, scope, scopes, node_scope, file)?;
    resolve_block(&w.body, scope, scopes, node_scope, file)
}

fn resolve_for(
    f: &For,
    scope: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    resolve_assign(&f.init, scope, scopes, node_scope, file)?;
    resolve_expr(&f.cond, scope, scopes, node_scope, file)?;
    resolve_assign(&f.step, scope, scopes, node_scope, file)?;
    resolve_block(&f.body, scope, scopes, node_scope, file)
}

fn resolve_ident_use(
    ident: &Ident,
    scope: ScopeId,
    scopes: &ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    if scopes.find(scope, &ident.name).is_none() {
        return Err(not_declared(file, ident.range, &ident.name));
    }
    node_scope.insert(ident.id, scope);
    Ok(())
}

fn resolve_expr(
    expr: &Expr,
    scope: ScopeId,
    scopes: &mut ScopeTree,
    node_scope: &mut HashMap<NodeId, ScopeId>,
    file: &str,
) -> Result<(), Diagnostic> {
    match expr {
        Expr::IntLit { .. } | Expr::RealLit { .. } | Expr::CharLit { .. } => Ok(()),
        Expr::Ident(ident) => resolve_ident_use(ident, scope, scopes, node_scope, file),
        Expr::Binary { lhs, rhs, .. } => {
            resolve_expr(lhs, scope, scopes, node_scope, file)?;
            resolve_expr(rhs, scope, scopes, node_scope, file)
        }
        Expr::Unary { operand, .. } => resolve_expr(operand, scope, scopes, node_scope, file),
        Expr::Call { callee, args, .. } => {
            resolve_ident_use(callee, scope, scopes, node_scope, file)?;
            for arg in args {
                resolve_expr(arg, scope, scopes, node_scope, file)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_src(src: &str) -> Result<Resolution, Diagnostic> {
        let module = portc_par::parse(src, "test.por").expect("fixture should parse");
        resolve(&module, "test.por")
    }

    #[test]
    fn entry_point_is_required() {
        let err = resolve_src("inteiro soma() { retorne 0; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::NoEntryPoint);
    }

    #[test]
    fn duplicate_top_level_procedure_is_rejected() {
        let err = resolve_src(
            "inteiro entrada() { retorne 0; } inteiro entrada() { retorne 1; }",
        )
        .unwrap_err();
        assert_eq!(err.code, DiagnosticCode::NameAlreadyDefined);
    }

    #[test]
    fn undeclared_identifier_is_rejected() {
        let err = resolve_src("inteiro entrada() { retorne x; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::SymbolNotDeclared);
    }

    #[test]
    fn duplicate_local_in_same_block_is_rejected() {
        let err = resolve_src("inteiro entrada() { inteiro x, x; retorne 0; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::NameAlreadyDefined);
    }

    #[test]
    fn shadowing_an_outer_local_in_a_nested_block_is_allowed() {
        let res = resolve_src(
            "inteiro entrada() { inteiro x; se (x) { inteiro x; x = 1; } retorne x; }",
        );
        assert!(res.is_ok());
    }

    #[test]
    fn valid_program_resolves_cleanly() {
        let res = resolve_src(
            "inteiro soma(inteiro a, inteiro b) { retorne a + b; } \
             inteiro entrada() { inteiro total; total = soma(1, 2); retorne total; }",
        );
        assert!(res.is_ok());
    }
}
