//! Statement AST nodes.
//!
//! Provides nodes for the statement forms of the language:
//! - Blocks and empty statements
//! - Local variable declarations
//! - Expression statements
//! - Control flow (if, while, do-while, for)
//! - Jump statements (return, break, continue)

use crate::ast::expr::Expr;
use crate::ast::types::TypeExpr;
use crate::ast::Ident;
use quickc_core::Span;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Block statement
    Block(Block<'ast>),
    /// Local variable declaration
    VarDecl(VarDeclStmt<'ast>),
    /// Expression statement (expr;)
    Expr(ExprStmt<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
    /// Do-while loop
    DoWhile(&'ast DoWhileStmt<'ast>),
    /// For loop
    For(&'ast ForStmt<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// `break;`
    Break(Span),
    /// `continue;`
    Continue(Span),
    /// A lone `;`.
    Empty(Span),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Block(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Expr(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::DoWhile(s) => s.span,
            Self::For(s) => s.span,
            Self::Return(s) => s.span,
            Self::Break(span) | Self::Continue(span) | Self::Empty(span) => *span,
        }
    }
}

/// A block of statements.
///
/// Examples:
/// - `{ }`
/// - `{ int x = 1; x++; }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in source order
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location, braces included
    pub span: Span,
}

/// A local variable declaration statement.
///
/// Examples:
/// - `int x;`
/// - `int x = 1, y;`
/// - `var s = "a";`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    /// The declared type, or `var`
    pub ty: TypeExpr<'ast>,
    /// Variable declarators (can be multiple)
    pub vars: &'ast [VarDeclarator<'ast>],
    /// Source location
    pub span: Span,
}

/// A single variable declarator within a local or field declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    /// Variable name
    pub name: Ident<'ast>,
    /// Optional initializer
    pub init: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// An expression statement (expression followed by semicolon).
///
/// Only assignments, calls and increments are valid here; the parser accepts
/// any expression and the compiler rejects the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An if statement.
///
/// Examples:
/// - `if (x > 0) return 1;`
/// - `if (done) { ... } else { ... }`
/// - `if (a) ... else if (b) ... else ...`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition, which must be `bool`
    pub condition: &'ast Expr<'ast>,
    /// Statement run when the condition holds
    pub then_stmt: Stmt<'ast>,
    /// Optional else branch; an `else if` is a nested if here
    pub else_stmt: Option<Stmt<'ast>>,
    /// Source location
    pub span: Span,
}

/// A while loop.
///
/// Examples:
/// - `while (i < 10) i++;`
/// - `while (true) { ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    /// Loop condition
    pub condition: &'ast Expr<'ast>,
    /// Loop body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A do-while loop.
///
/// Examples:
/// - `do { i--; } while (i > 0);`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    /// Loop body, run at least once
    pub body: Stmt<'ast>,
    /// Loop condition
    pub condition: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A for loop.
///
/// Examples:
/// - `for (int i = 0; i < 10; i++) { ... }`
/// - `for (i = 0, j = 9; i < j; i++, j--) { ... }`
/// - `for (;;) { ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Optional initializer
    pub init: Option<ForInit<'ast>>,
    /// Optional condition; missing means `true`
    pub condition: Option<&'ast Expr<'ast>>,
    /// Update expressions, run after each iteration
    pub update: &'ast [Expr<'ast>],
    /// Loop body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// Initializer clause of a for loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForInit<'ast> {
    /// Variable declaration (`int i = 0`)
    VarDecl(VarDeclStmt<'ast>),
    /// Comma-separated expressions (`i = 0, j = 9`)
    Exprs(&'ast [Expr<'ast>]),
}

/// A return statement.
///
/// Examples:
/// - `return;`
/// - `return expr;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Optional return value
    pub value: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}
