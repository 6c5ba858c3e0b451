//! Abstract syntax tree and parser.
//!
//! ```
//! use quickc_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     using System;
//!     namespace Samples {
//!         public class Counter {
//!             private int count;
//!             public int Next() { count++; return count; }
//!         }
//!     }
//! "#;
//!
//! let output = Parser::parse(source, &arena).unwrap();
//! assert!(output.errors.is_empty());
//! assert_eq!(output.script.usings().len(), 1);
//! ```

pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod types;

mod decl_parser;
mod expr_parser;
mod parser;
mod stmt_parser;

pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use parser::{MAX_NESTING, ParseOutput, Parser};
pub use stmt::*;
pub use types::*;

use quickc_core::Span;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    #[inline]
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A parsed compilation unit.
///
/// All nodes borrow from the arena passed to [`Parser::parse`].
#[derive(Debug, Clone, Copy)]
pub struct Script<'ast> {
    usings: &'ast [UsingDirective<'ast>],
    items: &'ast [Item<'ast>],
    span: Span,
}

impl<'ast> Script<'ast> {
    pub(crate) fn new(
        usings: &'ast [UsingDirective<'ast>],
        items: &'ast [Item<'ast>],
        span: Span,
    ) -> Self {
        Self { usings, items, span }
    }

    /// Using directives at the top of the file.
    pub fn usings(&self) -> &'ast [UsingDirective<'ast>] {
        self.usings
    }

    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Visit every class with its enclosing namespace path and the usings
    /// in scope at its declaration (outermost first).
    pub fn for_each_class(
        &self,
        mut f: impl FnMut(&[Ident<'ast>], &[UsingDirective<'ast>], &ClassDecl<'ast>),
    ) {
        let mut usings: Vec<UsingDirective<'ast>> = self.usings.to_vec();
        walk_items(self.items, &mut Vec::new(), &mut usings, &mut f);
    }
}

fn walk_items<'ast>(
    items: &'ast [Item<'ast>],
    namespace: &mut Vec<Ident<'ast>>,
    usings: &mut Vec<UsingDirective<'ast>>,
    f: &mut impl FnMut(&[Ident<'ast>], &[UsingDirective<'ast>], &ClassDecl<'ast>),
) {
    for item in items {
        match item {
            Item::Class(class) => f(namespace.as_slice(), usings.as_slice(), class),
            Item::Namespace(ns) => {
                let ns_len = namespace.len();
                let usings_len = usings.len();
                namespace.extend_from_slice(ns.path);
                usings.extend_from_slice(ns.usings);
                walk_items(ns.items, namespace, usings, f);
                namespace.truncate(ns_len);
                usings.truncate(usings_len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn nested_namespaces_compose_paths() {
        let arena = Bump::new();
        let source = "namespace A { using System.Text; namespace B.C { class X {} } class Y {} }";
        let output = Parser::parse(source, &arena).unwrap();
        assert!(output.errors.is_empty(), "{}", output.errors);

        let mut seen = Vec::new();
        output.script.for_each_class(|ns, usings, class| {
            seen.push((dotted(ns), usings.len(), class.name.name.to_string()));
        });
        assert_eq!(
            seen,
            [
                ("A.B.C".to_string(), 1, "X".to_string()),
                ("A".to_string(), 1, "Y".to_string()),
            ]
        );
    }

    #[test]
    fn file_scoped_namespace_owns_following_classes() {
        let arena = Bump::new();
        let source = "using System; namespace Samples; class A {} class B {}";
        let output = Parser::parse(source, &arena).unwrap();
        assert!(output.errors.is_empty(), "{}", output.errors);

        let mut names = Vec::new();
        output.script.for_each_class(|ns, _, class| {
            names.push(format!("{}.{}", dotted(ns), class.name.name));
        });
        assert_eq!(names, ["Samples.A", "Samples.B"]);
    }
}
