//! Recursive-descent parser with one token of lookahead (two at the single
//! LL(2) point: deciding whether an identifier starts an assignment or a
//! call statement).

use crate::ast::*;
use portc_lex::{LexValue, Lexer, TokenKind};
use portc_util::{Diagnostic, DiagnosticCode, Range};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: portc_lex::Lexeme,
    file: String,
    next_id: NodeId,
}

/// Parse a whole module from `source`, named `file` for diagnostics.
pub fn parse(source: &str, file: impl Into<String>) -> Result<Module, Diagnostic> {
    let mut parser = Parser::new(source, file)?;
    parser.parse_module()
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, file: impl Into<String>) -> Result<Self, Diagnostic> {
        let file = file.into();
        let mut lexer = Lexer::new(source, file.clone());
        let cur = lexer.next()?;
        Ok(Self { lexer, cur, file, next_id: 0 })
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn bump(&mut self) -> Result<portc_lex::Lexeme, Diagnostic> {
        let old = self.cur.clone();
        self.cur = self.lexer.next()?;
        Ok(old)
    }

    fn peek_next_kind(&mut self) -> Result<TokenKind, Diagnostic> {
        Ok(self.lexer.peek()?.kind)
    }

    fn expected_symbol(&self, what: &str) -> Diagnostic {
        Diagnostic::at(
            DiagnosticCode::ExpectedSymbol,
            format!("expected {what}, found '{}'", self.cur.text),
            self.file.clone(),
            self.cur.range,
        )
    }

    fn expected_prod(&self, what: &str) -> Diagnostic {
        Diagnostic::at(
            DiagnosticCode::ExpectedProd,
            format!("expected {what}"),
            self.file.clone(),
            self.cur.range,
        )
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<portc_lex::Lexeme, Diagnostic> {
        if self.cur.kind == kind {
            self.bump()
        } else {
            Err(self.expected_symbol(what))
        }
    }

    fn parse_module(&mut self) -> Result<Module, Diagnostic> {
        let mut procedures = Vec::new();
        while self.cur.kind != TokenKind::Eof {
            procedures.push(self.parse_procedure()?);
        }
        if self.cur.kind != TokenKind::Eof {
            return Err(Diagnostic::at(
                DiagnosticCode::ExpectedEOF,
                "unexpected tokens after the end of the module",
                self.file.clone(),
                self.cur.range,
            ));
        }
        let range = covering(procedures.iter().map(|p| p.range), self.cur.range.begin);
        Ok(Module { procedures, range })
    }

    fn parse_procedure(&mut self) -> Result<Procedure, Diagnostic> {
        let id = self.fresh_id();
        let ret_type = self.try_parse_type()?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if self.cur.kind != TokenKind::RParen {
            loop {
                params.push(self.parse_param()?);
                if self.cur.kind == TokenKind::Comma {
                    self.bump()?;
                    if self.cur.kind == TokenKind::RParen {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        let range = covering(
            ret_type
                .iter()
                .map(|t| t.range)
                .chain([name.range])
                .chain(params.iter().map(|p| p.range))
                .chain([body.range]),
            name.range.begin,
        );
        Ok(Procedure { id, ret_type, name, params, body, range })
    }

    fn try_parse_type(&mut self) -> Result<Option<TypeNode>, Diagnostic> {
        let keyword = match self.cur.kind {
            TokenKind::Real => TypeKeyword::Real,
            TokenKind::Inteiro => TypeKeyword::Inteiro,
            TokenKind::Caractere => TypeKeyword::Caractere,
            _ => return Ok(None),
        };
        let id = self.fresh_id();
        let tok = self.bump()?;
        Ok(Some(TypeNode { id, keyword, range: tok.range }))
    }

    fn parse_type(&mut self) -> Result<TypeNode, Diagnostic> {
        self.try_parse_type()?.ok_or_else(|| self.expected_symbol("a type ('real', 'inteiro', or 'caractere')"))
    }

    fn parse_param(&mut self) -> Result<Param, Diagnostic> {
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        let range = ty.range.union(name.range);
        Ok(Param { ty, name, range })
    }

    fn parse_ident(&mut self) -> Result<Ident, Diagnostic> {
        let id = self.fresh_id();
        let tok = self.expect(TokenKind::Ident, "an identifier")?;
        Ok(Ident { id, name: tok.text, range: tok.range })
    }

    fn parse_block(&mut self) -> Result<Block, Diagnostic> {
        let id = self.fresh_id();
        let lbrace = self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while self.cur.kind != TokenKind::RBrace {
            if self.cur.kind == TokenKind::Eof {
                return Err(self.expected_symbol("'}'"));
            }
            stmts.push(self.parse_command()?);
        }
        let rbrace = self.expect(TokenKind::RBrace, "'}'")?;
        let range = covering(stmts.iter().map(|s| s.range()), lbrace.range.begin).union(Range::point(rbrace.range.end));
        Ok(Block { id, stmts, range })
    }

    fn parse_command(&mut self) -> Result<Stmt, Diagnostic> {
        match self.cur.kind {
            TokenKind::Real | TokenKind::Inteiro | TokenKind::Caractere => {
                let decl = self.parse_var_decl()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Stmt::VarDecl(decl))
            }
            TokenKind::Leia => {
                let read = self.parse_read()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Stmt::Read(read))
            }
            TokenKind::Imprima => {
                let print = self.parse_print()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Stmt::Print(print))
            }
            TokenKind::Retorne => {
                let ret = self.parse_return()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Stmt::Return(ret))
            }
            TokenKind::Se => Ok(Stmt::If(self.parse_if()?)),
            TokenKind::Enquanto => Ok(Stmt::While(self.parse_while()?)),
            TokenKind::Para => Ok(Stmt::For(self.parse_for()?)),
            TokenKind::Ident => {
                if self.peek_next_kind()? == TokenKind::Eq {
                    let assign = self.parse_assign()?;
                    self.expect(TokenKind::Semi, "';'")?;
                    Ok(Stmt::Assign(assign))
                } else {
                    let callee = self.parse_ident()?;
                    let call = self.parse_call(callee)?;
                    self.expect(TokenKind::Semi, "';'")?;
                    Ok(Stmt::Call(call))
                }
            }
            _ => Err(self.expected_prod("a command")),
        }
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, Diagnostic> {
        let ty = self.parse_type()?;
        let mut names = vec![self.parse_ident()?];
        while self.cur.kind == TokenKind::Comma {
            self.bump()?;
            names.push(self.parse_ident()?);
        }
        let range = covering(names.iter().map(|n| n.range), ty.range.begin).union(ty.range);
        Ok(VarDecl { ty, names, range })
    }

    fn parse_read(&mut self) -> Result<Read, Diagnostic> {
        let kw = self.expect(TokenKind::Leia, "'leia'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let target = self.parse_ident()?;
        let rparen = self.expect(TokenKind::RParen, "')'")?;
        Ok(Read { target, range: kw.range.union(rparen.range) })
    }

    fn parse_print(&mut self) -> Result<Print, Diagnostic> {
        let kw = self.expect(TokenKind::Imprima, "'imprima'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let arg = if self.cur.kind == TokenKind::StringLit {
            let id = self.fresh_id();
            let tok = self.bump()?;
            PrintArg::Str(StringLit { id, text: tok.text, range: tok.range })
        } else {
            PrintArg::Expr(self.parse_expr()?)
        };
        let rparen = self.expect(TokenKind::RParen, "')'")?;
        Ok(Print { arg, range: kw.range.union(rparen.range) })
    }

    fn parse_return(&mut self) -> Result<Return, Diagnostic> {
        let kw = self.expect(TokenKind::Retorne, "'retorne'")?;
        let value = self.parse_expr()?;
        let range = kw.range.union(value.range());
        Ok(Return { value, range })
    }

    fn parse_if(&mut self) -> Result<If, Diagnostic> {
        let kw = self.expect(TokenKind::Se, "'se'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_block = self.parse_block()?;
        let mut range = kw.range.union(cond.range()).union(then_block.range);
        let else_block = if self.cur.kind == TokenKind::Senao {
            self.bump()?;
            let block = self.parse_block()?;
            range = range.union(block.range);
            Some(block)
        } else {
            None
        };
        Ok(If { cond, then_block, else_block, range })
    }

    fn parse_while(&mut self) -> Result<While, Diagnostic> {
        let kw = self.expect(TokenKind::Enquanto, "'enquanto'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        let range = kw.range.union(cond.range()).union(body.range);
        Ok(While { cond, body, range })
    }

    fn parse_for(&mut self) -> Result<For, Diagnostic> {
        let kw = self.expect(TokenKind::Para, "'para'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let init = self.parse_assign()?;
        self.expect(TokenKind::Semi, "';'")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Semi, "';'")?;
        let step = self.parse_assign()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        let range = kw.range.union(init.range).union(cond.range()).union(step.range).union(body.range);
        Ok(For { init, cond, step, body, range })
    }

    fn parse_assign(&mut self) -> Result<Assign, Diagnostic> {
        let id = self.fresh_id();
        let target = self.parse_ident()?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        let range = target.range.union(value.range());
        Ok(Assign { id, target, value, range })
    }

    fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_and()?;
        while self.cur.kind == TokenKind::Ou {
            self.bump()?;
            let right = self.parse_and()?;
            left = self.make_binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_comp()?;
        while self.cur.kind == TokenKind::E {
            self.bump()?;
            let right = self.parse_comp()?;
            left = self.make_binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comp(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_add()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::EqEq => BinOp::EqEq,
                TokenKind::BangEq => BinOp::NotEq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_add()?;
            left = self.make_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_add(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_mul()?;
            left = self.make_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_unary()?;
            left = self.make_binary(op, left, right);
        }
        Ok(left)
    }

    fn make_binary(&mut self, op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        let id = self.fresh_id();
        let range = lhs.range().union(rhs.range());
        Expr::Binary { id, op, lhs: Box::new(lhs), rhs: Box::new(rhs), range }
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let prefix = match self.cur.kind {
            TokenKind::Minus => Some((UnOp::Neg, self.bump()?)),
            TokenKind::Nao => Some((UnOp::Not, self.bump()?)),
            _ => None,
        };
        let primary = self.parse_primary()?;
        let with_call = if let Expr::Ident(ident) = &primary {
            if self.cur.kind == TokenKind::LParen {
                self.parse_call(ident.clone())?
            } else {
                primary
            }
        } else {
            primary
        };
        Ok(match prefix {
            Some((op, tok)) => {
                let id = self.fresh_id();
                let range = tok.range.union(with_call.range());
                Expr::Unary { id, op, operand: Box::new(with_call), range }
            }
            None => with_call,
        })
    }

    fn parse_call(&mut self, callee: Ident) -> Result<Expr, Diagnostic> {
        let id = self.fresh_id();
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.cur.kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expr()?);
                if self.cur.kind == TokenKind::Comma {
                    self.bump()?;
                    if self.cur.kind == TokenKind::RParen {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        let rparen = self.expect(TokenKind::RParen, "')'")?;
        let range = covering(args.iter().map(|a| a.range()), callee.range.begin)
            .union(callee.range)
            .union(Range::point(rparen.range.end));
        Ok(Expr::Call { id, callee, args, range })
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        match self.cur.kind {
            TokenKind::IntLit => {
                let id = self.fresh_id();
                let tok = self.bump()?;
                let Some(LexValue::Int(value)) = tok.value else { unreachable!("lexer always decodes IntLit") };
                Ok(Expr::IntLit { id, value, range: tok.range })
            }
            TokenKind::RealLit => {
                let id = self.fresh_id();
                let tok = self.bump()?;
                let Some(LexValue::Real(value)) = tok.value else { unreachable!("lexer always decodes RealLit") };
                Ok(Expr::RealLit { id, value, range: tok.range })
            }
            TokenKind::CharLit => {
                let id = self.fresh_id();
                let tok = self.bump()?;
                let Some(LexValue::Int(value)) = tok.value else { unreachable!("lexer always decodes CharLit") };
                Ok(Expr::CharLit { id, value, range: tok.range })
            }
            TokenKind::Ident => {
                let ident = self.parse_ident()?;
                Ok(Expr::Ident(ident))
            }
            TokenKind::LParen => {
                self.bump()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.expected_prod("an expression")),
        }
    }
}
