//! Expression AST nodes.
//!
//! # Expression Precedence
//!
//! Lowest to highest:
//! 1. Assignment (`=`, `+=`, ...) - right associative
//! 2. Ternary (`?:`) - right associative
//! 3. Logical OR (`||`)
//! 4. Logical AND (`&&`)
//! 5. Equality (`==`, `!=`)
//! 6. Relational (`<`, `<=`, `>`, `>=`)
//! 7. Additive (`+`, `-`)
//! 8. Multiplicative (`*`, `/`, `%`)
//! 9. Prefix unary (`-`, `+`, `!`, `++`, `--`)
//! 10. Postfix (call, member access, `++`, `--`)

use crate::ast::{AssignOp, BinaryOp, Ident, PostfixOp, UnaryOp};
use quickc_core::Span;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value (`42`, `2.5`, `"text"`, `true`)
    Literal(LiteralExpr<'ast>),
    /// Identifier (`count`, `Console`)
    Ident(Ident<'ast>),
    /// `this`
    This(Span),
    /// Binary operation (`a + b`, `x && y`)
    Binary(&'ast BinaryExpr<'ast>),
    /// Prefix unary operation (`-x`, `!done`, `++i`)
    Unary(&'ast UnaryExpr<'ast>),
    /// Postfix increment or decrement (`i++`)
    Postfix(&'ast PostfixExpr<'ast>),
    /// Assignment (`x = 1`, `total += x`)
    Assign(&'ast AssignExpr<'ast>),
    /// Conditional (`c ? a : b`)
    Ternary(&'ast TernaryExpr<'ast>),
    /// Call (`Greet()`, `Math.Max(a, b)`)
    Call(&'ast CallExpr<'ast>),
    /// Member access (`Console.Out`, `s.Length`)
    Member(&'ast MemberExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::This(span) => *span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Postfix(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Ternary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Member(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr<'ast> {
        let mut expr = self;
        while let Self::Paren(p) = expr {
            expr = p.expr;
        }
        expr
    }

    /// The dotted path this expression spells, if it is only names and
    /// member accesses (`System.Console.WriteLine`).
    pub fn as_dotted_path(&self) -> Option<Vec<Ident<'ast>>> {
        let mut path = Vec::new();
        let mut expr = self;
        loop {
            match expr {
                Self::Ident(ident) => {
                    path.push(*ident);
                    path.reverse();
                    return Some(path);
                }
                Self::Member(m) => {
                    path.push(m.member);
                    expr = m.object;
                }
                _ => return None,
            }
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal's value
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// Literal values.
///
/// Examples:
/// - `42` (int), `3000000000` or `7L` (long)
/// - `2.5`, `2.5d` (double)
/// - `"a\nb"` (string)
/// - `true`, `false`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// Boolean
    Bool(bool),
    /// Decoded string contents.
    String(&'ast str),
}

/// A binary operation.
///
/// Examples:
/// - `a + b`
/// - `x < 10 && !done`
/// - `"n=" + n`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A prefix unary operation.
///
/// Examples:
/// - `-x`
/// - `!flag`
/// - `++count`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A postfix increment or decrement (`i++`, `i--`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostfixExpr<'ast> {
    /// Operand, which must be assignable
    pub operand: &'ast Expr<'ast>,
    /// Operator
    pub op: PostfixOp,
    /// Source location
    pub span: Span,
}

/// An assignment.
///
/// Examples:
/// - `x = 1`
/// - `total += x`
/// - `a = b = 0` (right associative)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    /// Assignment target
    pub target: &'ast Expr<'ast>,
    /// Plain or compound operator
    pub op: AssignOp,
    /// Assigned value
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A conditional expression (`condition ? then_expr : else_expr`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    /// Condition, which must be `bool`
    pub condition: &'ast Expr<'ast>,
    /// Value when the condition holds
    pub then_expr: &'ast Expr<'ast>,
    /// Value otherwise
    pub else_expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// `callee(args)`. The callee is a name or a member access.
///
/// Examples:
/// - `Greet()`
/// - `Console.WriteLine("hi")`
/// - `text.Substring(1, 2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// The called method group
    pub callee: &'ast Expr<'ast>,
    /// Arguments in order
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A member access (`object.member`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    /// Receiver: a value, a class or a namespace
    pub object: &'ast Expr<'ast>,
    /// Member name
    pub member: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    /// The inner expression
    pub expr: &'ast Expr<'ast>,
    /// Source location, parentheses included
    pub span: Span,
}
