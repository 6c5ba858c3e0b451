//! Declaration parsing: the compilation unit, usings, namespaces, classes
//! and class members.

use bumpalo::collections::Vec as BVec;
use quickc_core::{DataType, ParseError, ParseErrorKind, Span, Visibility};

use super::parser::Parser;
use crate::ast::decl::*;
use crate::ast::types::{TypeExpr, TypeKind};
use crate::ast::{Ident, Script};
use crate::lexer::TokenKind;

/// Where a modifier list appears; decides which modifiers are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierTarget {
    Class,
    Field,
    Method,
    Constructor,
}

impl<'ast> Parser<'ast> {
    /// Parse the whole token buffer into a [`Script`], recovering from
    /// errors at declaration boundaries.
    pub fn parse_script(&mut self) -> Script<'ast> {
        let start = self.peek().span;
        let usings = self.parse_usings();
        let items = self.parse_items(true);
        Script::new(usings, items, self.span_from(start))
    }

    fn parse_usings(&mut self) -> &'ast [UsingDirective<'ast>] {
        let mut usings = BVec::new_in(self.arena);
        while self.check(TokenKind::Using) && !self.is_fatal() {
            match self.parse_using() {
                Ok(using) => usings.push(using),
                Err(err) => {
                    self.report(err);
                    self.synchronize_statement();
                }
            }
        }
        usings.into_bump_slice()
    }

    /// `using A.B;`
    fn parse_using(&mut self) -> Result<UsingDirective<'ast>, ParseError> {
        let start = self.expect(TokenKind::Using)?.span;
        let path = self.parse_dotted_path()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(UsingDirective {
            path,
            span: self.span_from(start),
        })
    }

    /// `Ident ('.' Ident)*`
    pub(super) fn parse_dotted_path(&mut self) -> Result<&'ast [Ident<'ast>], ParseError> {
        let mut path = BVec::new_in(self.arena);
        path.push(self.expect_ident()?);
        while self.eat(TokenKind::Dot).is_some() {
            path.push(self.expect_ident()?);
        }
        Ok(path.into_bump_slice())
    }

    /// Items until `}` (inside a namespace) or EOF (`top_level`).
    fn parse_items(&mut self, top_level: bool) -> &'ast [Item<'ast>] {
        let mut items = BVec::new_in(self.arena);

        loop {
            if self.is_fatal() || self.is_eof() {
                break;
            }
            if !top_level && self.check(TokenKind::RightBrace) {
                break;
            }

            match self.peek().kind {
                TokenKind::Namespace => match self.parse_namespace() {
                    Ok(ns) => {
                        let file_scoped = ns.file_scoped;
                        items.push(Item::Namespace(ns));
                        if file_scoped {
                            break;
                        }
                    }
                    Err(err) => {
                        self.report(err);
                        self.synchronize_member();
                    }
                },
                TokenKind::Using => {
                    let span = self.peek().span;
                    self.report(ParseError::new(
                        ParseErrorKind::ExpectedDeclaration,
                        span,
                        "a using clause must precede all other elements defined in the namespace",
                    ));
                    self.synchronize_statement();
                }
                TokenKind::RightBrace => {
                    let token = self.advance();
                    self.report(ParseError::new(
                        ParseErrorKind::ExpectedDeclaration,
                        token.span,
                        "type or namespace definition, or end-of-file expected",
                    ));
                }
                _ => match self.parse_class() {
                    Ok(class) => items.push(Item::Class(class)),
                    Err(err) => {
                        self.report(err);
                        self.synchronize_member();
                    }
                },
            }
        }

        items.into_bump_slice()
    }

    /// `namespace A.B { usings items }` or `namespace A.B; usings items`
    fn parse_namespace(&mut self) -> Result<NamespaceDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Namespace)?.span;
        let path = self.parse_dotted_path()?;

        if self.eat(TokenKind::Semicolon).is_some() {
            let usings = self.parse_usings();
            let items = self.parse_items(true);
            return Ok(NamespaceDecl {
                path,
                usings,
                items,
                file_scoped: true,
                span: self.span_from(start),
            });
        }

        self.nested(|p| {
            p.expect(TokenKind::LeftBrace)?;
            let usings = p.parse_usings();
            let items = p.parse_items(false);
            p.expect(TokenKind::RightBrace)?;
            Ok(NamespaceDecl {
                path,
                usings,
                items,
                file_scoped: false,
                span: p.span_from(start),
            })
        })
    }

    /// `modifiers class Name { members }`
    fn parse_class(&mut self) -> Result<ClassDecl<'ast>, ParseError> {
        let start = self.peek().span;
        let modifiers = self.parse_modifiers(ModifierTarget::Class)?;

        if !self.check(TokenKind::Class) {
            let token = self.peek();
            let message = if modifiers.visibility.is_some() || modifiers.is_static {
                format!("class expected, found {}", token.describe())
            } else {
                "type or namespace definition, or end-of-file expected".to_string()
            };
            return Err(ParseError::new(
                ParseErrorKind::ExpectedDeclaration,
                token.span,
                message,
            ));
        }
        self.advance();

        let name = self.expect_ident()?;

        self.nested(|p| {
            p.expect(TokenKind::LeftBrace)?;
            let members = p.parse_members(name);
            p.expect(TokenKind::RightBrace)?;
            Ok(ClassDecl {
                modifiers,
                name,
                members,
                span: p.span_from(start),
            })
        })
    }

    fn parse_members(&mut self, class_name: Ident<'ast>) -> &'ast [ClassMember<'ast>] {
        let mut members = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() && !self.is_fatal() {
            match self.parse_member(class_name) {
                Ok(member) => members.push(member),
                Err(err) => {
                    self.report(err);
                    self.synchronize_member();
                }
            }
        }

        members.into_bump_slice()
    }

    fn parse_member(&mut self, class_name: Ident<'ast>) -> Result<ClassMember<'ast>, ParseError> {
        let start = self.peek().span;
        let modifiers_start = self.position;
        let prelim = self.parse_modifier_list()?;

        // Constructor: `Name(`
        let token = self.peek();
        if token.kind == TokenKind::Identifier
            && token.lexeme == class_name.name
            && self.peek_nth(1).kind == TokenKind::LeftParen
        {
            let modifiers = self.check_modifiers(prelim, ModifierTarget::Constructor, modifiers_start)?;
            let name = self.expect_ident()?;
            let params = self.parse_params()?;
            let body = self.parse_method_body()?;
            return Ok(ClassMember::Constructor(ConstructorDecl {
                modifiers,
                name,
                params,
                body,
                span: self.span_from(start),
            }));
        }

        if !self.starts_type() {
            let token = self.peek();
            return Err(ParseError::new(
                ParseErrorKind::ExpectedClassMember,
                token.span,
                format!(
                    "invalid token {} in class member declaration",
                    token.describe()
                ),
            ));
        }

        // `Foo(` where Foo is not the class: a method missing its return type.
        if self.peek().kind == TokenKind::Identifier && self.peek_nth(1).kind == TokenKind::LeftParen {
            let token = self.peek();
            return Err(ParseError::new(
                ParseErrorKind::InvalidDeclaration,
                token.span,
                "method must have a return type",
            ));
        }

        let ty = self.parse_type(false)?;

        if self.peek().kind == TokenKind::Identifier && self.peek_nth(1).kind == TokenKind::LeftParen {
            let modifiers = self.check_modifiers(prelim, ModifierTarget::Method, modifiers_start)?;
            let name = self.expect_ident()?;
            let params = self.parse_params()?;
            let body = self.parse_method_body()?;
            return Ok(ClassMember::Method(MethodDecl {
                modifiers,
                return_type: ty,
                name,
                params,
                body,
                span: self.span_from(start),
            }));
        }

        let modifiers = self.check_modifiers(prelim, ModifierTarget::Field, modifiers_start)?;
        let mut vars = BVec::new_in(self.arena);
        vars.push(self.parse_var_declarator()?);
        while self.eat(TokenKind::Comma).is_some() {
            vars.push(self.parse_var_declarator()?);
        }
        self.expect_semicolon();

        Ok(ClassMember::Field(FieldDecl {
            modifiers,
            ty,
            vars: vars.into_bump_slice(),
            span: self.span_from(start),
        }))
    }

    /// `(type name, ...)`
    fn parse_params(&mut self) -> Result<&'ast [Param<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);

        if !self.check(TokenKind::RightParen) {
            loop {
                let start = self.peek().span;
                let ty = self.parse_type(false)?;
                let name = self.expect_ident()?;
                params.push(Param {
                    ty,
                    name,
                    span: self.span_from(start),
                });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(params.into_bump_slice())
    }

    /// `{ ... }` or `=> expr;`
    fn parse_method_body(&mut self) -> Result<MethodBody<'ast>, ParseError> {
        if self.eat(TokenKind::Arrow).is_some() {
            let expr = self.parse_expr()?;
            self.expect_semicolon();
            return Ok(MethodBody::Expr(self.arena.alloc(expr)));
        }

        if self.check(TokenKind::LeftBrace) {
            return Ok(MethodBody::Block(self.parse_block()?));
        }

        let token = self.peek();
        Err(ParseError::expected_token(token.span, "'{' or '=>'", &token.describe()))
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Whether the current token can begin a type.
    pub(super) fn starts_type(&self) -> bool {
        let kind = self.peek().kind;
        kind.is_primitive_type() || kind == TokenKind::Var || kind == TokenKind::Identifier
    }

    /// Parse a type. `var` is only accepted where `allow_var` is set.
    pub(super) fn parse_type(&mut self, allow_var: bool) -> Result<TypeExpr<'ast>, ParseError> {
        let token = self.peek();

        let ty = match token.kind {
            TokenKind::Void => DataType::Void,
            TokenKind::Int => DataType::Int,
            TokenKind::Long => DataType::Long,
            TokenKind::Double => DataType::Double,
            TokenKind::Bool => DataType::Bool,
            TokenKind::String => DataType::String,
            TokenKind::Var if allow_var => {
                self.advance();
                return Ok(TypeExpr {
                    kind: TypeKind::Var,
                    span: token.span,
                });
            }
            TokenKind::Var => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedType,
                    token.span,
                    "the contextual keyword 'var' may only appear within a local variable declaration",
                ));
            }
            TokenKind::Identifier => {
                let start = token.span;
                let path = self.parse_dotted_path()?;
                return Ok(TypeExpr {
                    kind: TypeKind::Named(path),
                    span: self.span_from(start),
                });
            }
            _ => return Err(ParseError::expected_type(token.span, &token.describe())),
        };

        self.advance();
        Ok(TypeExpr::primitive(ty, token.span))
    }

    // ========================================================================
    // Modifiers
    // ========================================================================

    fn parse_modifiers(&mut self, target: ModifierTarget) -> Result<Modifiers, ParseError> {
        let start = self.position;
        let modifiers = self.parse_modifier_list()?;
        self.check_modifiers(modifiers, target, start)
    }

    /// Collect modifier keywords, rejecting duplicates and conflicting
    /// access levels. Placement is checked separately.
    fn parse_modifier_list(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers {
            span: Span::point(self.peek().span.line, self.peek().span.col),
            ..Modifiers::default()
        };
        let mut seen: Vec<TokenKind> = Vec::new();

        while self.peek().kind.is_modifier() {
            let token = self.advance();
            if seen.contains(&token.kind) {
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateModifier,
                    token.span,
                    format!("duplicate {} modifier", token.kind),
                ));
            }
            seen.push(token.kind);

            let visibility = match token.kind {
                TokenKind::Public => Some(Visibility::Public),
                TokenKind::Private => Some(Visibility::Private),
                TokenKind::Protected => Some(Visibility::Protected),
                TokenKind::Internal => Some(Visibility::Internal),
                TokenKind::Static => {
                    modifiers.is_static = true;
                    None
                }
                _ => {
                    modifiers.is_readonly = true;
                    None
                }
            };

            if let Some(visibility) = visibility {
                if modifiers.visibility.is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::MultipleAccessModifiers,
                        token.span,
                        "more than one protection modifier",
                    ));
                }
                modifiers.visibility = Some(visibility);
            }

            modifiers.span = modifiers.span.merge(token.span);
        }

        Ok(modifiers)
    }

    fn check_modifiers(
        &self,
        modifiers: Modifiers,
        target: ModifierTarget,
        start: usize,
    ) -> Result<Modifiers, ParseError> {
        let invalid = |kind: TokenKind| -> bool {
            match (target, kind) {
                (ModifierTarget::Class, TokenKind::Readonly) => true,
                (ModifierTarget::Method, TokenKind::Readonly) => true,
                (ModifierTarget::Constructor, TokenKind::Readonly | TokenKind::Static) => true,
                _ => false,
            }
        };

        for token in &self.buffer[start..self.position] {
            if token.kind.is_modifier() && invalid(token.kind) {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidModifier,
                    token.span,
                    format!("the modifier {} is not valid for this item", token.kind),
                ));
            }
        }

        Ok(modifiers)
    }
}
