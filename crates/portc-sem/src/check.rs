//! Two-pass type checker: infers procedure signatures, then walks every
//! body checking statement and expression typing rules.

use crate::scope::{ScopeId, ScopeTree};
use crate::symbol::ParamDesc;
use crate::types::{assignable, convert, type_of_keyword, ProcType, Type};
use portc_par::{Assign, BinOp, Block, Expr, For, If, Module, Print, PrintArg, Read, Return, Stmt, UnOp, VarDecl, While};
use portc_util::{Diagnostic, DiagnosticCode, Range};
use std::collections::HashMap;

use portc_par::NodeId;

fn err(code: DiagnosticCode, message: impl Into<String>, file: &str, range: Range) -> Diagnostic {
    Diagnostic::at(code, message, file, range)
}

/// Pass 1: write each procedure's parameter and return types onto its
/// symbol (and its argument symbols), from the type terminals in the AST.
pub fn infer_signatures(
    module: &Module,
    scopes: &mut ScopeTree,
    node_scope: &HashMap<NodeId, ScopeId>,
    global: ScopeId,
) -> Result<(), Diagnostic> {
    for proc in &module.procedures {
        let arg_scope = node_scope[&proc.id];
        let mut params = Vec::with_capacity(proc.params.len());
        for (position, param) in proc.params.iter().enumerate() {
            let ty = type_of_keyword(param.ty.keyword);
            params.push(ParamDesc { name: param.name.name.clone(), ty: ty.clone(), position });
            let sym = scopes
                .get_mut(arg_scope, &param.name.name)
                .expect("argument symbol was declared during resolution");
            sym.ty = Some(ty);
        }
        let ret = proc.ret_type.as_ref().map(|t| type_of_keyword(t.keyword)).unwrap_or(Type::Integer);
        let proc_ty = Type::Procedure(ProcType { params: params.iter().map(|p| p.ty.clone()).collect(), ret: Box::new(ret) });
        let sym = scopes
            .get_mut(global, &proc.name.name)
            .expect("procedure symbol was declared during resolution");
        sym.ty = Some(proc_ty);
        sym.params = Some(params);
    }
    Ok(())
}

pub fn check_entry_shape(scopes: &ScopeTree, module: &Module, global: ScopeId, file: &str) -> Result<(), Diagnostic> {
    let (_, entrada) = scopes.find(global, "entrada").expect("resolver already verified presence");
    let shape_ok = matches!(
        &entrada.ty,
        Some(Type::Procedure(ProcType { params, ret })) if params.is_empty() && **ret == Type::Integer
    );
    if shape_ok {
        Ok(())
    } else {
        let decl = module
            .procedures
            .iter()
            .find(|p| p.name.name == "entrada")
            .expect("resolver already verified presence");
        Err(err(
            DiagnosticCode::WrongEntryType,
            "'entrada' must take no arguments and return inteiro",
            file,
            decl.name.range,
        ))
    }
}

pub struct Checker<'a> {
    scopes: &'a mut ScopeTree,
    node_scope: &'a HashMap<NodeId, ScopeId>,
    file: &'a str,
    pub types: HashMap<NodeId, Type>,
}

impl<'a> Checker<'a> {
    pub fn new(scopes: &'a mut ScopeTree, node_scope: &'a HashMap<NodeId, ScopeId>, file: &'a str) -> Self {
        Self { scopes, node_scope, file, types: HashMap::new() }
    }

    pub fn check_module(&mut self, module: &Module) -> Result<(), Diagnostic> {
        for proc in &module.procedures {
            let (_, sym) = self
                .scopes
                .find(self.node_scope[&proc.id], &proc.name.name)
                .unwrap_or_else(|| panic!("procedure symbol for '{}' must exist", proc.name.name));
            let ret = match &sym.ty {
                Some(Type::Procedure(ProcType { ret, .. })) => (**ret).clone(),
                _ => unreachable!("signatures were inferred in pass 1"),
            };
            self.check_block(&proc.body, &ret)?;
        }
        Ok(())
    }

    fn symbol_type(&self, scope: ScopeId, name: &str) -> Type {
        self.scopes
            .find(scope, name)
            .and_then(|(_, sym)| sym.ty.clone())
            .expect("resolver guarantees the binding exists; pass 1 guarantees its type is set")
    }

    fn check_block(&mut self, block: &Block, ret: &Type) -> Result<(), Diagnostic> {
        for stmt in &block.stmts {
            self.check_stmt(stmt, ret)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt, ret: &Type) -> Result<(), Diagnostic> {
        match stmt {
            Stmt::Assign(a) => self.check_assign(a),
            Stmt::VarDecl(v) => self.check_var_decl(v),
            Stmt::Call(e) => self.check_expr(e).map(|_| ()),
            Stmt::Read(r) => self.check_read(r),
            Stmt::Print(p) => self.check_print(p),
            Stmt::Return(r) => self.check_return(r, ret),
            Stmt::If(i) => self.check_if(i, ret),
            Stmt::While(w) => self.check_while(w, ret),
            Stmt::For(f) => self.check_for(f, ret),
        }
    }

    fn check_var_decl(&mut self, v: &VarDecl) -> Result<(), Diagnostic> {
        let ty = type_of_keyword(v.ty.keyword);
        self.types.insert(v.ty.id, ty.clone());
        for name in &v.names {
            self.types.insert(name.id, ty.clone());
            let home = self.node_scope[&name.id];
            let sym = self
                .scopes
                .get_mut(home, &name.name)
                .expect("local symbol was declared during resolution");
            sym.ty = Some(ty.clone());
        }
        Ok(())
    }

    fn check_read(&mut self, r: &Read) -> Result<(), Diagnostic> {
        let scope = self.node_scope[&r.target.id];
        let ty = self.symbol_type(scope, &r.target.name);
        self.types.insert(r.target.id, ty);
        Ok(())
    }

    fn check_print(&mut self, p: &Print) -> Result<(), Diagnostic> {
        match &p.arg {
            PrintArg::Str(s) => {
                self.types.insert(s.id, Type::String);
                Ok(())
            }
            PrintArg::Expr(e) => self.check_expr(e).map(|_| ()),
        }
    }

    fn check_return(&mut self, r: &Return, ret: &Type) -> Result<(), Diagnostic> {
        let ty = self.check_expr(&r.value)?;
        if assignable(ret, &ty) {
            Ok(())
        } else {
            Err(err(
                DiagnosticCode::VarNotAssignable,
                format!("cannot return a value of type {ty:?} from a procedure returning {ret:?}"),
                self.file,
                r.value.range(),
            ))
        }
    }

    fn check_assign(&mut self, a: &Assign) -> Result<(), Diagnostic> {
        let scope = self.node_scope[&a.target.id];
        let target_ty = self.symbol_type(scope, &a.target.name);
        let value_ty = self.check_expr(&a.value)?;
        if !assignable(&target_ty, &value_ty) {
            return Err(err(
                DiagnosticCode::VarNotAssignable,
                format!("cannot assign a value of type {value_ty:?} to '{}' of type {target_ty:?}", a.target.name),
                self.file,
                a.range,
            ));
        }
        self.types.insert(a.target.id, target_ty);
        Ok(())
    }

    fn check_if(&mut self, i: &If, ret: &Type) -> Result<(), Diagnostic> {
        self.check_condition(&i.cond)?;
        self.check_block(&i.then_block, ret)?;
        if let Some(else_block) = &i.else_block {
            self.check_block(else_block, ret)?;
        }
        Ok(())
    }

    fn check_while(&mut self, w: &While, ret: &Type) -> Result<(), Diagnostic> {
        self.check_condition(&w.cond)?;
        self.check_block(&w.body, ret)
    }

    fn check_for(&mut self, f: &For, ret: &Type) -> Result<(), Diagnostic> {
        self.check_assign(&f.init)?;
        self.check_condition(&f.cond)?;
        self.check_assign(&f.step)?;
        self.check_block(&f.body, ret)
    }

    fn check_condition(&mut self, cond: &Expr) -> Result<(), Diagnostic> {
        let ty = self.check_expr(cond)?;
        if ty == Type::Integer {
            Ok(())
        } else {
            Err(err(DiagnosticCode::InvalidTypeForCond, "condition must be inteiro-valued", self.file, cond.range()))
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, Diagnostic> {
        let ty = match expr {
            Expr::IntLit { .. } => Type::Integer,
            Expr::RealLit { .. } => Type::Real,
            Expr::CharLit { .. } => Type::Character,
            Expr::Ident(ident) => {
                let scope = self.node_scope[&ident.id];
                self.symbol_type(scope, &ident.name)
            }
            Expr::Binary { op, lhs, rhs, range, .. } => self.check_binary(*op, lhs, rhs, *range)?,
            Expr::Unary { op, operand, range, .. } => self.check_unary(*op, operand, *range)?,
            Expr::Call { callee, args, range, .. } => self.check_call(callee, args, *range)?,
        };
        self.types.insert(expr.id(), ty.clone());
        Ok(ty)
    }

    fn check_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, range: Range) -> Result<Type, Diagnostic> {
        let lty = self.check_expr(lhs)?;
        let rty = self.check_expr(rhs)?;
        match op {
            BinOp::And | BinOp::Or | BinOp::Mod => {
                if lty == Type::Integer && rty == Type::Integer {
                    Ok(Type::Integer)
                } else {
                    Err(err(DiagnosticCode::ExpectedTypeOp, "operands must be inteiro", self.file, range))
                }
            }
            BinOp::EqEq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                if lty == rty {
                    Ok(Type::Integer)
                } else {
                    Err(err(
                        DiagnosticCode::OpUnequalTypes,
                        format!("cannot compare {lty:?} with {rty:?}"),
                        self.file,
                        range,
                    ))
                }
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => convert(&lty, &rty).ok_or_else(|| {
                err(DiagnosticCode::ExpectedTypeOp, format!("cannot apply this operator to {lty:?} and {rty:?}"), self.file, range)
            }),
        }
    }

    fn check_unary(&mut self, op: UnOp, operand: &Expr, range: Range) -> Result<Type, Diagnostic> {
        let ty = self.check_expr(operand)?;
        match op {
            UnOp::Neg => Ok(ty),
            UnOp::Not => {
                if ty == Type::Integer {
                    Ok(Type::Integer)
                } else {
                    Err(err(DiagnosticCode::ExpectedTypeOp, "operand of 'nao' must be inteiro", self.file, range))
                }
            }
        }
    }

    fn check_call(&mut self, callee: &portc_par::Ident, args: &[Expr], range: Range) -> Result<Type, Diagnostic> {
        let scope = self.node_scope[&callee.id];
        let callee_ty = self.symbol_type(scope, &callee.name);
        self.types.insert(callee.id, callee_ty.clone());
        let Type::Procedure(ProcType { params, ret }) = callee_ty else {
            return Err(err(DiagnosticCode::ExpectedTypeOp, format!("'{}' is not callable", callee.name), self.file, range));
        };
        if params.len() != args.len() {
            return Err(err(
                DiagnosticCode::ArgNotAssignable,
                format!("'{}' expects {} argument(s), found {}", callee.name, params.len(), args.len()),
                self.file,
                range,
            ));
        }
        for (param_ty, arg) in params.iter().zip(args) {
            let arg_ty = self.check_expr(arg)?;
            if !assignable(param_ty, &arg_ty) {
                return Err(err(
                    DiagnosticCode::ArgNotAssignable,
                    format!("cannot pass a value of type {arg_ty:?} where {param_ty:?} is expected"),
                    self.file,
                    arg.range(),
                ));
            }
        }
        Ok(*ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;

    fn check_src(src: &str) -> Result<HashMap<NodeId, Type>, Diagnostic> {
        let module = portc_par::parse(src, "test.por").expect("fixture should parse");
        let resolution = resolve(&module, "test.por")?;
        let mut scopes = resolution.scopes;
        infer_signatures(&module, &mut scopes, &resolution.node_scope, resolution.global)?;
        check_entry_shape(&scopes, &module, resolution.global, "test.por")?;
        let mut checker = Checker::new(&mut scopes, &resolution.node_scope, "test.por");
        checker.check_module(&module)?;
        Ok(checker.types)
    }

    #[test]
    fn entry_point_must_take_no_arguments() {
        let err = check_src("inteiro entrada(inteiro x) { retorne x; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::WrongEntryType);
    }

    #[test]
    fn entry_point_must_return_inteiro() {
        let err = check_src("real entrada() { retorne 1.0; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::WrongEntryType);
    }

    #[test]
    fn wrong_entry_type_points_at_entrada_not_the_start_of_the_file() {
        let err = check_src("inteiro outraCoisa() { retorne 0; }\nreal entrada() { retorne 1.0; }").unwrap_err();
        let loc = err.location.expect("WrongEntryType should carry a location");
        assert_eq!(loc.range.begin.line, 1);
        assert!(loc.range.begin.column > 0);
    }

    #[test]
    fn mismatched_assignment_is_rejected() {
        let err = check_src("inteiro entrada() { caractere c; c = 1000000; retorne 0; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::VarNotAssignable);
    }

    #[test]
    fn widening_assignment_is_allowed() {
        let types = check_src("inteiro entrada() { real r; inteiro i; r = i; retorne 0; }").unwrap();
        assert!(!types.is_empty());
    }

    #[test]
    fn comparison_between_unequal_types_is_rejected() {
        let err = check_src("inteiro entrada() { real r; inteiro i; se (r == i) {} retorne 0; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::OpUnequalTypes);
    }

    #[test]
    fn arithmetic_between_real_and_integer_widens_to_real() {
        let module = portc_par::parse("inteiro entrada() { real r; inteiro i; r = r + i; retorne 0; }", "test.por").unwrap();
        let resolution = resolve(&module, "test.por").unwrap();
        let mut scopes = resolution.scopes;
        infer_signatures(&module, &mut scopes, &resolution.node_scope, resolution.global).unwrap();
        let mut checker = Checker::new(&mut scopes, &resolution.node_scope, "test.por");
        checker.check_module(&module).unwrap();
    }

    #[test]
    fn condition_must_be_integer() {
        let err = check_src("inteiro entrada() { real r; se (r) {} retorne 0; }").unwrap_err();
        assert_eq!(err.code, DiagnosticCode::InvalidTypeForCond);
    }

    #[test]
    fn call_arity_mismatch_is_rejected() {
        let err = check_src(
            "inteiro soma(inteiro a, inteiro b) { retorne a + b; } \
             inteiro entrada() { retorne soma(1); }",
        )
        .unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ArgNotAssignable);
    }

    #[test]
    fn builtin_raiz_is_callable_with_one_real_argument() {
        let module = portc_par::parse("real calcula() { retorne raiz(2.0); } inteiro entrada() { retorne 0; }", "test.por").unwrap();
        let resolution = resolve(&module, "test.por").unwrap();
        let mut scopes = resolution.scopes;
        infer_signatures(&module, &mut scopes, &resolution.node_scope, resolution.global).unwrap();
        let mut checker = Checker::new(&mut scopes, &resolution.node_scope, "test.por");
        assert!(checker.check_module(&module).is_ok());
    }

    #[test]
    fn valid_program_type_checks_cleanly() {
        let types = check_src(
            "inteiro soma(inteiro a, inteiro b) { retorne a + b; } \
             inteiro entrada() { inteiro total; total = soma(1, 2); retorne total; }",
        )
        .unwrap();
        assert!(!types.is_empty());
    }
}
