//! Translates a resolved, typed module into a single C translation unit.

use crate::error::{CodeGenError, Result};
use portc_par::{Assign, BinOp, Block, Expr, For, Ident, If, Module, Print, PrintArg, Read, Stmt, UnOp, VarDecl};
use portc_sem::Analysis;
use std::fmt::Write as _;

pub struct Emitter<'a> {
    module_name: &'a str,
    module: &'a Module,
    analysis: &'a Analysis,
    out: String,
}

/// Emit `module` (already resolved and type-checked as `analysis`) as C
/// source text, prefixing every global name with `module_name`.
pub fn emit(module_name: &str, module: &Module, analysis: &Analysis) -> Result<String> {
    let mut emitter = Emitter { module_name, module, analysis, out: String::new() };
    emitter.emit_module()?;
    Ok(emitter.out)
}

impl<'a> Emitter<'a> {
    fn emit_module(&mut self) -> Result<()> {
        self.out.push_str("#include <stdio.h>\n#include <math.h>\n\n");

        for proc in &self.module.procedures {
            writeln!(self.out, "{};", self.signature(proc)).unwrap();
        }
        self.out.push('\n');

        writeln!(self.out, "int main(void) {{\n    return {}_entrada();\n}}\n", self.module_name).unwrap();

        for proc in &self.module.procedures {
            self.emit_procedure(proc)?;
        }
        Ok(())
    }

    fn signature(&self, proc: &portc_par::Procedure) -> String {
        let ret = self.proc_return_ctype(proc);
        let arg_scope = self.analysis.node_scope[&proc.id];
        let params: Vec<String> = proc
            .params
            .iter()
            .map(|p| format!("{} {}", ctype_of_keyword(p.ty.keyword), mangle_local(&p.name.name, arg_scope)))
            .collect();
        format!("{} {}_{}({})", ret, self.module_name, proc.name.name, if params.is_empty() { "void".to_string() } else { params.join(", ") })
    }

    fn proc_return_ctype(&self, proc: &portc_par::Procedure) -> &'static str {
        match &proc.ret_type {
            Some(t) => ctype_of_keyword(t.keyword),
            None => "int",
        }
    }

    fn emit_procedure(&mut self, proc: &portc_par::Procedure) -> Result<()> {
        writeln!(self.out, "{} {{", self.signature(proc)).unwrap();
        self.emit_block(&proc.body, 1)?;
        self.out.push_str("}\n\n");
        Ok(())
    }

    fn emit_block(&mut self, block: &Block, indent: usize) -> Result<()> {
        for stmt in &block.stmts {
            self.emit_stmt(stmt, indent)?;
        }
        Ok(())
    }

    fn pad(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push_str("    ");
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt, indent: usize) -> Result<()> {
        match stmt {
            Stmt::Assign(a) => self.emit_assign(a, indent),
            Stmt::VarDecl(v) => self.emit_var_decl(v, indent),
            Stmt::Call(e) => {
                self.pad(indent);
                let text = self.emit_expr(e)?;
                writeln!(self.out, "{};", text).unwrap();
                Ok(())
            }
            Stmt::Read(r) => self.emit_read(r, indent),
            Stmt::Print(p) => self.emit_print(p, indent),
            Stmt::Return(r) => {
                self.pad(indent);
                let text = self.emit_expr(&r.value)?;
                writeln!(self.out, "return {};", text).unwrap();
                Ok(())
            }
            Stmt::If(i) => self.emit_if(i, indent),
            Stmt::While(w) => {
                self.pad(indent);
                let cond = self.emit_expr(&w.cond)?;
                writeln!(self.out, "while ({}) {{", cond).unwrap();
                self.emit_block(&w.body, indent + 1)?;
                self.pad(indent);
                self.out.push_str("}\n");
                Ok(())
            }
            Stmt::For(f) => self.emit_for(f, indent),
        }
    }

    fn emit_var_decl(&mut self, v: &VarDecl, indent: usize) -> Result<()> {
        let ctype = ctype_of_keyword(v.ty.keyword);
        for name in &v.names {
            let scope = self.analysis.node_scope[&name.id];
            self.pad(indent);
            writeln!(self.out, "{} {};", ctype, mangle_local(&name.name, scope)).unwrap();
        }
        Ok(())
    }

    fn emit_assign(&mut self, a: &Assign, indent: usize) -> Result<()> {
        self.pad(indent);
        let target = self.mangle_ident(&a.target);
        let value = self.emit_expr(&a.value)?;
        writeln!(self.out, "{} = {};", target, value).unwrap();
        Ok(())
    }

    fn emit_read(&mut self, r: &Read, indent: usize) -> Result<()> {
        self.pad(indent);
        let ty = self.ident_type(&r.target)?;
        let fmt = scanf_format(&ty)?;
        let target = self.mangle_ident(&r.target);
        writeln!(self.out, "scanf(\"{}\", &{});", fmt, target).unwrap();
        Ok(())
    }

    fn emit_print(&mut self, p: &Print, indent: usize) -> Result<()> {
        self.pad(indent);
        match &p.arg {
            PrintArg::Str(s) => {
                writeln!(self.out, "printf({});", s.text).unwrap();
            }
            PrintArg::Expr(e) => {
                let ty = self
                    .analysis
                    .types
                    .get(&e.id())
                    .cloned()
                    .ok_or_else(|| CodeGenError::TypeMappingError("expression has no inferred type".into()))?;
                let fmt = printf_format(&ty)?;
                let text = self.emit_expr(e)?;
                writeln!(self.out, "printf(\"{}\", {});", fmt, text).unwrap();
            }
        }
        Ok(())
    }

    fn emit_if(&mut self, i: &If, indent: usize) -> Result<()> {
        self.pad(indent);
        let cond = self.emit_expr(&i.cond)?;
        writeln!(self.out, "if ({}) {{", cond).unwrap();
        self.emit_block(&i.then_block, indent + 1)?;
        self.pad(indent);
        if let Some(else_block) = &i.else_block {
            self.out.push_str("} else {\n");
            self.emit_block(else_block, indent + 1)?;
            self.pad(indent);
            self.out.push_str("}\n");
        } else {
            self.out.push_str("}\n");
        }
        Ok(())
    }

    fn emit_for(&mut self, f: &For, indent: usize) -> Result<()> {
        self.pad(indent);
        let init_target = self.mangle_ident(&f.init.target);
        let init_value = self.emit_expr(&f.init.value)?;
        let cond = self.emit_expr(&f.cond)?;
        let step_target = self.mangle_ident(&f.step.target);
        let step_value = self.emit_expr(&f.step.value)?;
        writeln!(
            self.out,
            "for ({} = {}; {}; {} = {}) {{",
            init_target, init_value, cond, step_target, step_value
        )
        .unwrap();
        self.emit_block(&f.body, indent + 1)?;
        self.pad(indent);
        self.out.push_str("}\n");
        Ok(())
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<String> {
        Ok(match expr {
            Expr::IntLit { value, .. } => value.to_string(),
            Expr::RealLit { value, .. } => format!("{:?}", value),
            Expr::CharLit { value, .. } => format!("'\\x{:02x}'", value),
            Expr::Ident(ident) => self.mangle_ident(ident),
            Expr::Binary { op, lhs, rhs, .. } => {
                let l = self.emit_expr(lhs)?;
                let r = self.emit_expr(rhs)?;
                format!("({} {} {})", l, c_binop(*op), r)
            }
            Expr::Unary { op, operand, .. } => {
                let o = self.emit_expr(operand)?;
                format!("({}{})", c_unop(*op), o)
            }
            Expr::Call { callee, args, .. } => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.emit_expr(arg)?);
                }
                let name = match callee.name.as_str() {
                    "raiz" => "sqrt".to_string(),
                    "expo" => "pow".to_string(),
                    _ => format!("{}_{}", self.module_name, callee.name),
                };
                format!("{}({})", name, rendered.join(", "))
            }
        })
    }

    fn ident_type(&self, ident: &Ident) -> Result<portc_sem::types::Type> {
        let scope = self.analysis.node_scope[&ident.id];
        self.analysis
            .scopes
            .find(scope, &ident.name)
            .and_then(|(_, sym)| sym.ty.clone())
            .ok_or_else(|| CodeGenError::Internal(format!("unresolved identifier '{}' reached code generation", ident.name)))
    }

    fn mangle_ident(&self, ident: &Ident) -> String {
        let scope = self.analysis.node_scope[&ident.id];
        let home = self
            .analysis
            .scopes
            .find(scope, &ident.name)
            .map(|(home, _)| home)
            .unwrap_or(scope);
        if home == self.analysis.global {
            format!("{}_{}", self.module_name, ident.name)
        } else {
            mangle_local(&ident.name, home)
        }
    }
}

fn mangle_local(name: &str, scope: portc_sem::scope::ScopeId) -> String {
    format!("{}{}", name, scope)
}

fn ctype_of_keyword(keyword: portc_par::TypeKeyword) -> &'static str {
    match keyword {
        portc_par::TypeKeyword::Real => "double",
        portc_par::TypeKeyword::Inteiro => "int",
        portc_par::TypeKeyword::Caractere => "char",
    }
}

fn scanf_format(ty: &portc_sem::types::Type) -> Result<&'static str> {
    use portc_sem::types::Type;
    match ty {
        Type::Integer => Ok("%d"),
        Type::Real => Ok("%lf"),
        Type::Character => Ok("%c"),
        other => Err(CodeGenError::TypeMappingError(format!("{other:?} has no scanf format"))),
    }
}

fn printf_format(ty: &portc_sem::types::Type) -> Result<&'static str> {
    use portc_sem::types::Type;
    match ty {
        Type::Integer => Ok("%d"),
        Type::Real => Ok("%f"),
        Type::Character => Ok("%c"),
        other => Err(CodeGenError::TypeMappingError(format!("{other:?} has no printf format"))),
    }
}

fn c_binop(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::EqEq => "==",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn c_unop(op: UnOp) -> &'static str {
    match op {
        UnOp::Neg => "-",
        UnOp::Not => "!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> String {
        let module = portc_par::parse(src, "prog.por").expect("fixture should parse");
        let analysis = portc_sem::analyze(&module, "prog.por").expect("fixture should type-check");
        emit("prog", &module, &analysis).expect("fixture should emit")
    }

    #[test]
    fn entry_point_calls_into_a_generated_main() {
        let c = compile("inteiro entrada() { retorne 0; }");
        assert!(c.contains("int main(void) {\n    return prog_entrada();\n}"));
        assert!(c.contains("int prog_entrada(void) {"));
    }

    #[test]
    fn global_procedures_are_mangled_with_the_module_name() {
        let c = compile(
            "inteiro soma(inteiro a, inteiro b) { retorne a + b; } \
             inteiro entrada() { retorne soma(1, 2); }",
        );
        assert!(c.contains("int prog_soma(int a"));
        assert!(c.contains("prog_soma(1, 2)"));
    }

    #[test]
    fn locals_are_suffixed_with_their_scope_id() {
        let c = compile("inteiro entrada() { inteiro total; total = 1; retorne total; }");
        let decl = c.lines().find(|l| l.trim_start().starts_with("int total")).expect("local declaration");
        let mangled = decl.trim().trim_end_matches(';').split_whitespace().nth(1).unwrap().to_string();
        assert!(c.contains(&format!("{} = 1;", mangled)));
        assert!(c.contains(&format!("return {};", mangled)));
    }

    #[test]
    fn arithmetic_is_fully_parenthesised() {
        let c = compile("inteiro entrada() { retorne 1 + 2 * 3; }");
        assert!(c.contains("(1 + (2 * 3))"));
    }

    #[test]
    fn builtin_calls_bypass_mangling() {
        let c = compile("real calcula() { retorne raiz(2.0); } inteiro entrada() { retorne 0; }");
        assert!(c.contains("sqrt(2.0)"));
    }

    #[test]
    fn shadowed_locals_get_distinct_mangled_names() {
        let c = compile("inteiro entrada() { inteiro x; se (x) { inteiro x; x = 1; } retorne x; }");
        let outer_decl_count = c.matches("int x").count();
        assert!(outer_decl_count >= 2);
    }

    #[test]
    fn print_of_string_literal_emits_the_raw_quoted_text() {
        let c = compile(r#"inteiro entrada() { imprima("ola mundo"); retorne 0; }"#);
        assert!(c.contains(r#"printf("ola mundo");"#));
    }

    #[test]
    fn print_of_expression_picks_format_from_its_type() {
        let c = compile("inteiro entrada() { inteiro x; x = 5; imprima(x); retorne 0; }");
        assert!(c.contains("printf(\"%d\", x"));
    }

    #[test]
    fn read_picks_scanf_format_from_declared_type() {
        let c = compile("inteiro entrada() { real r; leia(r); retorne 0; }");
        assert!(c.contains("scanf(\"%lf\", &r"));
    }
}
