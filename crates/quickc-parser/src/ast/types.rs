//! Type expressions as written in source.

use crate::ast::Ident;
use quickc_core::{DataType, Span};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub kind: TypeKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeKind<'ast> {
    /// A keyword type (`int`, `string`, `void`, ...).
    Primitive(DataType),
    /// `var`, inferred from the initializer.
    Var,
    /// Any other name; resolved (or rejected) by the compiler.
    Named(&'ast [Ident<'ast>]),
}

impl<'ast> TypeExpr<'ast> {
    pub fn primitive(ty: DataType, span: Span) -> Self {
        Self {
            kind: TypeKind::Primitive(ty),
            span,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(DataType::Void))
    }

    pub fn is_var(&self) -> bool {
        matches!(self.kind, TypeKind::Var)
    }

    /// How the type was spelled, for diagnostics.
    pub fn display_name(&self) -> String {
        match self.kind {
            TypeKind::Primitive(ty) => ty.name().to_string(),
            TypeKind::Var => "var".to_string(),
            TypeKind::Named(path) => path
                .iter()
                .map(|i| i.name)
                .collect::<Vec<_>>()
                .join("."),
        }
    }
}
