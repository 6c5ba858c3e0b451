//! Expression parsing using Pratt parsing for precedence.
//!
//! See [`crate::ast::expr`] for the precedence table.

use bumpalo::collections::Vec as BVec;
use quickc_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::ops::TERNARY_BINDING_POWER;
use crate::ast::{AssignOp, BinaryOp, Ident, PostfixOp, UnaryOp};
use crate::lexer::{Token, TokenKind};

impl<'ast> Parser<'ast> {
    /// Parse a full expression, assignment included.
    pub fn parse_expr(&mut self) -> Result<Expr<'ast>, ParseError> {
        self.parse_expr_bp(0)
    }

    /// Parse an expression whose operators bind at least as tightly as
    /// `min_bp`, one nesting level deeper.
    ///
    /// Every recursive path through the expression grammar passes through
    /// here, so this is the only place expressions enter the nesting guard.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr<'ast>, ParseError> {
        self.enter()?;
        let result = self.parse_operators(min_bp);
        self.leave();
        result
    }

    /// Operator loop of [`Parser::parse_expr_bp`]. Left-associative chains
    /// fold in place and do not deepen the recursion.
    fn parse_operators(&mut self, min_bp: u8) -> Result<Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let token = self.peek();

            if let Some(op) = AssignOp::from_token(token.kind) {
                let (l_bp, r_bp) = AssignOp::BINDING_POWER;
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let value = self.parse_expr_bp(r_bp)?;
                let span = lhs.span().merge(value.span());
                lhs = Expr::Assign(self.arena.alloc(AssignExpr {
                    target: self.arena.alloc(lhs),
                    op,
                    value: self.arena.alloc(value),
                    span,
                }));
                continue;
            }

            if token.kind == TokenKind::Question {
                let (l_bp, r_bp) = TERNARY_BINDING_POWER;
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let then_expr = self.parse_expr()?;
                self.expect(TokenKind::Colon)?;
                let else_expr = self.parse_expr_bp(r_bp)?;
                let span = lhs.span().merge(else_expr.span());
                lhs = Expr::Ternary(self.arena.alloc(TernaryExpr {
                    condition: self.arena.alloc(lhs),
                    then_expr: self.arena.alloc(then_expr),
                    else_expr: self.arena.alloc(else_expr),
                    span,
                }));
                continue;
            }

            let Some(op) = BinaryOp::from_token(token.kind) else {
                break;
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();

            let rhs = self.parse_expr_bp(r_bp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(self.arena.alloc(BinaryExpr {
                left: self.arena.alloc(lhs),
                op,
                right: self.arena.alloc(rhs),
                span,
            }));
        }

        Ok(lhs)
    }

    /// Prefix operators, then a primary with its postfix chain.
    fn parse_prefix(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = self.peek();

        let Some(op) = UnaryOp::from_token(token.kind) else {
            let primary = self.parse_primary()?;
            return self.parse_postfix(primary);
        };

        // `-2147483648` must be an int, so negative integer literals are
        // folded before the magnitude is range-checked.
        if op == UnaryOp::Neg
            && matches!(self.peek_nth(1).kind, TokenKind::IntLiteral | TokenKind::LongLiteral)
            && self.peek_nth(2).kind != TokenKind::Dot
        {
            self.advance();
            let literal = self.advance();
            let span = token.span.merge(literal.span);
            let kind = self.integer_literal(literal, true)?;
            return self.parse_postfix(Expr::Literal(LiteralExpr { kind, span }));
        }

        self.advance();
        let operand = self.parse_expr_bp(UnaryOp::BINDING_POWER)?;
        let span = token.span.merge(operand.span());
        Ok(Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand: self.arena.alloc(operand),
            span,
        })))
    }

    fn parse_primary(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = self.peek();

        match token.kind {
            TokenKind::This => {
                self.advance();
                Ok(Expr::This(token.span))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Ident(Ident::new(token.lexeme, token.span)))
            }
            // Keyword aliases used as a type name: `int.MaxValue`, `string.Concat(..)`.
            k if k.is_primitive_type() && k != TokenKind::Void && self.peek_nth(1).kind == TokenKind::Dot => {
                self.advance();
                Ok(Expr::Ident(Ident::new(token.lexeme, token.span)))
            }
            TokenKind::LeftParen => self.parse_paren(token),
            _ => self.parse_literal(token),
        }
    }

    /// `( expr )`, with `open` already peeked.
    fn parse_paren(&mut self, open: Token<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.advance();
        let inner = self.parse_expr()?;
        self.expect(TokenKind::RightParen)?;
        Ok(Expr::Paren(self.arena.alloc(ParenExpr {
            expr: self.arena.alloc(inner),
            span: self.span_from(open.span),
        })))
    }

    // Must stay off the recursive path.
    #[inline(never)]
    fn parse_literal(&mut self, token: Token<'ast>) -> Result<Expr<'ast>, ParseError> {
        if !matches!(
            token.kind,
            TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::StringLiteral
                | TokenKind::True
                | TokenKind::False
        ) {
            return Err(ParseError::expected_expression(token.span, &token.describe()));
        }
        self.advance();

        let kind = match token.kind {
            TokenKind::DoubleLiteral => {
                let text = token.lexeme.trim_end_matches(['d', 'D']);
                let value = text.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("invalid real literal '{}'", token.lexeme),
                    )
                })?;
                LiteralKind::Double(value)
            }
            TokenKind::StringLiteral => LiteralKind::String(token.lexeme),
            TokenKind::True => LiteralKind::Bool(true),
            TokenKind::False => LiteralKind::Bool(false),
            _ => self.integer_literal(token, false)?,
        };

        Ok(Expr::Literal(LiteralExpr {
            kind,
            span: token.span,
        }))
    }

    /// Member access, calls and postfix `++`/`--`.
    fn parse_postfix(&mut self, mut expr: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_ident()?;
                    let span = expr.span().merge(member.span);
                    expr = Expr::Member(self.arena.alloc(MemberExpr {
                        object: self.arena.alloc(expr),
                        member,
                        span,
                    }));
                }
                TokenKind::LeftParen => {
                    let args = self.parse_args()?;
                    let span = self.span_from(expr.span());
                    expr = Expr::Call(self.arena.alloc(CallExpr {
                        callee: self.arena.alloc(expr),
                        args,
                        span,
                    }));
                }
                kind => {
                    let Some(op) = PostfixOp::from_token(kind) else {
                        return Ok(expr);
                    };
                    let token = self.advance();
                    let span = expr.span().merge(token.span);
                    expr = Expr::Postfix(self.arena.alloc(PostfixExpr {
                        operand: self.arena.alloc(expr),
                        op,
                        span,
                    }));
                }
            }
        }
    }

    /// `( expr, ... )`
    fn parse_args(&mut self) -> Result<&'ast [Expr<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(args.into_bump_slice())
    }

    /// Decode an integer literal token. Unsuffixed literals are `int` when
    /// they fit and `long` otherwise; `L` forces `long`.
    fn integer_literal(&self, token: Token<'ast>, negative: bool) -> Result<LiteralKind<'ast>, ParseError> {
        let is_long = token.kind == TokenKind::LongLiteral;
        let digits = token.lexeme.trim_end_matches(['L', 'l']);
        let too_large = || {
            ParseError::new(
                ParseErrorKind::InvalidLiteral,
                token.span,
                "integral constant is too large",
            )
        };

        let magnitude = digits.parse::<u64>().map_err(|_| too_large())?;
        let value: i128 = if negative {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };

        if !is_long && let Ok(v) = i32::try_from(value) {
            return Ok(LiteralKind::Int(v));
        }
        match i64::try_from(value) {
            Ok(v) => Ok(LiteralKind::Long(v)),
            Err(_) => Err(too_large()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use bumpalo::Bump;
    use quickc_core::ParseErrorKind;

    fn parse_expr<'a>(source: &str, arena: &'a Bump) -> Result<Expr<'a>, ParseErrorKind> {
        let mut parser = Parser::new(source, arena);
        let expr = parser.parse_expr().map_err(|e| e.kind)?;
        assert!(parser.is_eof(), "trailing tokens in {source:?}");
        Ok(expr)
    }

    fn binary<'a>(expr: Expr<'a>) -> &'a BinaryExpr<'a> {
        match expr {
            Expr::Binary(b) => b,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn precedence() {
        let arena = Bump::new();
        let expr = parse_expr("1 + 2 * 3", &arena).unwrap();
        let add = binary(expr);
        assert_eq!(add.op, BinaryOp::Add);
        assert_eq!(binary(*add.right).op, BinaryOp::Mul);

        let expr = parse_expr("a < b && c == d || e", &arena).unwrap();
        let or = binary(expr);
        assert_eq!(or.op, BinaryOp::LogicalOr);
        assert_eq!(binary(*or.left).op, BinaryOp::LogicalAnd);
    }

    #[test]
    fn left_associative_subtraction() {
        let arena = Bump::new();
        let sub = binary(parse_expr("10 - 4 - 3", &arena).unwrap());
        assert!(matches!(sub.left, Expr::Binary(b) if b.op == BinaryOp::Sub));
        assert!(matches!(sub.right, Expr::Literal(_)));
    }

    #[test]
    fn assignment_is_right_associative() {
        let arena = Bump::new();
        let Expr::Assign(outer) = parse_expr("a = b += 2", &arena).unwrap() else {
            panic!("expected assignment");
        };
        assert_eq!(outer.op, AssignOp::Assign);
        assert!(matches!(outer.value, Expr::Assign(inner) if inner.op == AssignOp::AddAssign));
    }

    #[test]
    fn ternary_nests_in_else_branch() {
        let arena = Bump::new();
        let Expr::Ternary(t) = parse_expr("a ? 1 : b ? 2 : 3", &arena).unwrap() else {
            panic!("expected ternary");
        };
        assert!(matches!(t.else_expr, Expr::Ternary(_)));
    }

    #[test]
    fn member_calls_and_postfix() {
        let arena = Bump::new();
        let Expr::Call(call) = parse_expr("System.Console.WriteLine(\"hi\", x++)", &arena).unwrap() else {
            panic!("expected call");
        };
        let path = call.callee.as_dotted_path().unwrap();
        let names: Vec<_> = path.iter().map(|i| i.name).collect();
        assert_eq!(names, ["System", "Console", "WriteLine"]);
        assert!(matches!(call.args[1], Expr::Postfix(p) if p.op == PostfixOp::PostInc));
    }

    #[test]
    fn keyword_type_as_receiver() {
        let arena = Bump::new();
        let Expr::Member(m) = parse_expr("int.MaxValue", &arena).unwrap() else {
            panic!("expected member access");
        };
        assert!(matches!(m.object, Expr::Ident(i) if i.name == "int"));
        assert_eq!(m.member.name, "MaxValue");
    }

    #[test]
    fn integer_literal_typing() {
        let arena = Bump::new();
        let lit = |s: &str| match parse_expr(s, &arena).unwrap() {
            Expr::Literal(l) => l.kind,
            other => panic!("expected literal, got {other:?}"),
        };
        assert_eq!(lit("2147483647"), LiteralKind::Int(i32::MAX));
        assert_eq!(lit("2147483648"), LiteralKind::Long(2147483648));
        assert_eq!(lit("-2147483648"), LiteralKind::Int(i32::MIN));
        assert_eq!(lit("7L"), LiteralKind::Long(7));
        assert_eq!(lit("2.5"), LiteralKind::Double(2.5));
        assert_eq!(lit("\"a\\nb\""), LiteralKind::String("a\nb"));
    }

    #[test]
    fn integer_too_large() {
        let arena = Bump::new();
        assert_eq!(
            parse_expr("99999999999999999999", &arena).unwrap_err(),
            ParseErrorKind::InvalidLiteral
        );
    }

    #[test]
    fn unary_operators() {
        let arena = Bump::new();
        let Expr::Unary(u) = parse_expr("!done", &arena).unwrap() else {
            panic!("expected unary");
        };
        assert_eq!(u.op, UnaryOp::LogicalNot);
        let Expr::Unary(u) = parse_expr("-x * 2", &arena).map(|e| *binary(e).left).unwrap() else {
            panic!("expected unary on the left");
        };
        assert_eq!(u.op, UnaryOp::Neg);
    }

    #[test]
    fn left_associative_chains_do_not_nest() {
        let arena = Bump::new();
        let chain = vec!["x"; 10_000].join(" - ");
        let expr = parse_expr(&chain, &arena).unwrap();
        assert_eq!(binary(expr).op, BinaryOp::Sub);
    }

    #[test]
    fn deep_parentheses_trip_the_guard() {
        let arena = Bump::new();
        let depth = MAX_NESTING as usize + 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_expr(&source, &arena).unwrap_err(), ParseErrorKind::NestingTooDeep);

        let depth = MAX_NESTING as usize - 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_expr(&source, &arena).is_ok());
    }

    #[test]
    fn missing_operand() {
        let arena = Bump::new();
        assert_eq!(parse_expr("1 +", &arena).unwrap_err(), ParseErrorKind::ExpectedExpression);
    }
}
