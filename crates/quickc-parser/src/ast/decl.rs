//! Declaration AST nodes: usings, namespaces, classes and their members.
//!
//! Provides nodes for:
//! - Using directives
//! - Namespaces (block and file-scoped)
//! - Classes
//! - Fields, methods and constructors

use crate::ast::expr::Expr;
use crate::ast::stmt::{Block, VarDeclarator};
use crate::ast::types::TypeExpr;
use crate::ast::Ident;
use quickc_core::{Span, Visibility};

/// A using directive.
///
/// Examples:
/// - `using System;`
/// - `using System.Text.RegularExpressions;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsingDirective<'ast> {
    /// Namespace path segments
    pub path: &'ast [Ident<'ast>],
    /// Source location
    pub span: Span,
}

impl UsingDirective<'_> {
    /// The namespace path joined with `.`.
    pub fn dotted(&self) -> String {
        dotted(self.path)
    }
}

/// Join a path of identifiers with `.`.
pub fn dotted(path: &[Ident<'_>]) -> String {
    path.iter().map(|i| i.name).collect::<Vec<_>>().join(".")
}

/// A top-level or namespace-level item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    /// Namespace declaration
    Namespace(NamespaceDecl<'ast>),
    /// Class declaration
    Class(ClassDecl<'ast>),
}

impl<'ast> Item<'ast> {
    /// Get the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Self::Namespace(d) => d.span,
            Self::Class(d) => d.span,
        }
    }
}

/// A namespace declaration.
///
/// Examples:
/// - `namespace Samples { class A { } }`
/// - `namespace Samples.Text;` (file-scoped)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamespaceDecl<'ast> {
    /// Namespace path segments (`A.B` is two)
    pub path: &'ast [Ident<'ast>],
    /// Using directives inside the namespace
    pub usings: &'ast [UsingDirective<'ast>],
    /// Nested namespaces and classes
    pub items: &'ast [Item<'ast>],
    /// Whether this is the `namespace A.B;` form
    pub file_scoped: bool,
    /// Source location
    pub span: Span,
}

/// Modifiers written before a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Modifiers {
    /// Declared accessibility, if any was written
    pub visibility: Option<Visibility>,
    /// `static`
    pub is_static: bool,
    /// `readonly` (fields only)
    pub is_readonly: bool,
    /// Source location of the modifier list
    pub span: Span,
}

impl Modifiers {
    /// Declared visibility, or `default` if none was written.
    pub fn visibility_or(&self, default: Visibility) -> Visibility {
        self.visibility.unwrap_or(default)
    }
}

/// A class declaration.
///
/// Examples:
/// - `class Greeter { }`
/// - `public static class Helpers { public static int Twice(int x) => x * 2; }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    /// Class modifiers
    pub modifiers: Modifiers,
    /// Class name
    pub name: Ident<'ast>,
    /// Members in source order
    pub members: &'ast [ClassMember<'ast>],
    /// Source location
    pub span: Span,
}

/// A member of a class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassMember<'ast> {
    /// Field declaration
    Field(FieldDecl<'ast>),
    /// Method declaration
    Method(MethodDecl<'ast>),
    /// Constructor declaration
    Constructor(ConstructorDecl<'ast>),
}

impl<'ast> ClassMember<'ast> {
    /// Get the span of this member.
    pub fn span(&self) -> Span {
        match self {
            Self::Field(d) => d.span,
            Self::Method(d) => d.span,
            Self::Constructor(d) => d.span,
        }
    }
}

/// A field declaration.
///
/// Examples:
/// - `int count;`
/// - `private int count = 0, total;`
/// - `static readonly string Prefix = "> ";`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    /// Field modifiers
    pub modifiers: Modifiers,
    /// Field type
    pub ty: TypeExpr<'ast>,
    /// Declarators (can be multiple)
    pub vars: &'ast [VarDeclarator<'ast>],
    /// Source location
    pub span: Span,
}

/// A method or constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter type
    pub ty: TypeExpr<'ast>,
    /// Parameter name
    pub name: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// The body of a method or constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MethodBody<'ast> {
    /// `{ ... }`
    Block(Block<'ast>),
    /// `=> expr;`
    Expr(&'ast Expr<'ast>),
}

impl MethodBody<'_> {
    /// Get the span of this body.
    pub fn span(&self) -> Span {
        match self {
            MethodBody::Block(b) => b.span,
            MethodBody::Expr(e) => e.span(),
        }
    }
}

/// A method declaration.
///
/// Examples:
/// - `public string Greet() { return greeting; }`
/// - `public int Add(int a, int b) => a + b;`
/// - `static int Twice(int x) => x * 2;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    /// Method modifiers
    pub modifiers: Modifiers,
    /// Return type (`void` allowed)
    pub return_type: TypeExpr<'ast>,
    /// Method name
    pub name: Ident<'ast>,
    /// Parameters in order
    pub params: &'ast [Param<'ast>],
    /// Method body
    pub body: MethodBody<'ast>,
    /// Source location
    pub span: Span,
}

/// A constructor declaration.
///
/// Examples:
/// - `public Counter() { count = 0; }`
/// - `Greeter(string greeting) => this.greeting = greeting;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructorDecl<'ast> {
    /// Constructor modifiers
    pub modifiers: Modifiers,
    /// Name, which matches the enclosing class
    pub name: Ident<'ast>,
    /// Parameters in order
    pub params: &'ast [Param<'ast>],
    /// Constructor body
    pub body: MethodBody<'ast>,
    /// Source location
    pub span: Span,
}
