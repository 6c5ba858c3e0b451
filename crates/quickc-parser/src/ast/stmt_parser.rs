//! Statement parsing: blocks, declarations, control flow and jumps.

use bumpalo::collections::Vec as BVec;
use quickc_core::ParseError;

use super::parser::Parser;
use crate::ast::expr::Expr;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// `{ stmt* }`, recovering from errors at statement boundaries.
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let start = self.expect(TokenKind::LeftBrace)?.span;
        let mut stmts = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    if self.is_fatal() {
                        return Err(err);
                    }
                    self.report(err);
                    self.synchronize_statement();
                }
            }
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(Block {
            stmts: stmts.into_bump_slice(),
            span: self.span_from(start),
        })
    }

    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        self.enter()?;
        let result = self.parse_statement_inner();
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = self.peek();

        match token.kind {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(token.span))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                self.advance();
                self.expect_semicolon();
                Ok(Stmt::Break(self.span_from(token.span)))
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_semicolon();
                Ok(Stmt::Continue(self.span_from(token.span)))
            }
            _ if self.is_var_decl() => {
                let decl = self.parse_var_decl()?;
                self.expect_semicolon();
                Ok(Stmt::VarDecl(VarDeclStmt {
                    span: self.span_from(decl.span),
                    ..decl
                }))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect_semicolon();
                Ok(Stmt::Expr(ExprStmt {
                    expr: self.arena.alloc(expr),
                    span: self.span_from(token.span),
                }))
            }
        }
    }

    /// Whether the upcoming tokens read `Type name`.
    ///
    /// Keyword types and `var` always start a declaration; a dotted name
    /// does only when an identifier follows it.
    pub(super) fn is_var_decl(&self) -> bool {
        let kind = self.peek().kind;
        if kind.is_primitive_type() {
            // `int.MaxValue` and `string.Concat(..)` are expressions.
            return self.peek_nth(1).kind != TokenKind::Dot;
        }
        if kind == TokenKind::Var {
            return self.peek_nth(1).kind == TokenKind::Identifier;
        }
        if kind != TokenKind::Identifier {
            return false;
        }

        let mut n = 1;
        while self.peek_nth(n).kind == TokenKind::Dot && self.peek_nth(n + 1).kind == TokenKind::Identifier {
            n += 2;
        }
        self.peek_nth(n).kind == TokenKind::Identifier
    }

    /// `Type name (= init)? (, name (= init)?)*` without the trailing `;`.
    fn parse_var_decl(&mut self) -> Result<VarDeclStmt<'ast>, ParseError> {
        let start = self.peek().span;
        let ty = self.parse_type(true)?;

        let mut vars = BVec::new_in(self.arena);
        vars.push(self.parse_var_declarator()?);
        while self.eat(TokenKind::Comma).is_some() {
            vars.push(self.parse_var_declarator()?);
        }

        Ok(VarDeclStmt {
            ty,
            vars: vars.into_bump_slice(),
            span: self.span_from(start),
        })
    }

    /// `name (= init)?`
    pub(super) fn parse_var_declarator(&mut self) -> Result<VarDeclarator<'ast>, ParseError> {
        let name = self.expect_ident()?;
        let init = if self.eat(TokenKind::Equal).is_some() {
            let expr = self.parse_expr()?;
            Some(&*self.arena.alloc(expr))
        } else {
            None
        };

        Ok(VarDeclarator {
            name,
            init,
            span: self.span_from(name.span),
        })
    }

    /// `( expr )` as used by `if`, `while` and `do`.
    fn parse_condition(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::RightParen)?;
        Ok(self.arena.alloc(expr))
    }

    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_condition()?;
        let then_stmt = self.parse_statement()?;
        let else_stmt = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: self.span_from(start),
        })))
    }

    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::While)?.span;
        let condition = self.parse_condition()?;
        let body = self.parse_statement()?;

        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_do_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Do)?.span;
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        let condition = self.parse_condition()?;
        self.expect_semicolon();

        Ok(Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            condition,
            span: self.span_from(start),
        })))
    }

    /// `for (init?; condition?; update,*) body`
    fn parse_for(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::For)?.span;
        self.expect(TokenKind::LeftParen)?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if self.is_var_decl() {
            Some(ForInit::VarDecl(self.parse_var_decl()?))
        } else {
            Some(ForInit::Exprs(self.parse_expr_list(TokenKind::Semicolon)?))
        };
        self.expect(TokenKind::Semicolon)?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expr()?;
            Some(&*self.arena.alloc(expr))
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.check(TokenKind::RightParen) {
            &[][..]
        } else {
            self.parse_expr_list(TokenKind::RightParen)?
        };
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_statement()?;

        Ok(Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            update,
            body,
            span: self.span_from(start),
        })))
    }

    /// Comma-separated expressions up to (not including) `end`.
    fn parse_expr_list(&mut self, end: TokenKind) -> Result<&'ast [Expr<'ast>], ParseError> {
        let mut exprs = BVec::new_in(self.arena);
        exprs.push(self.parse_expr()?);
        while !self.check(end) && self.eat(TokenKind::Comma).is_some() {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs.into_bump_slice())
    }

    fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expr()?;
            Some(&*self.arena.alloc(expr))
        };
        self.expect_semicolon();

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: self.span_from(start),
        }))
    }
}
