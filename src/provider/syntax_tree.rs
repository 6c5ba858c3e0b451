use bumpalo::Bump;
use quickc_core::{Diagnostic, Diagnostics};
use quickc_parser::Parser;
use quickc_parser::ast::Script;

use super::Provider;
use crate::error::ParseFailure;

/// A parsed script and the syntax errors recovered from while parsing it.
///
/// All nodes live in the arena the tree was parsed into.
#[derive(Debug, Clone)]
pub struct SyntaxTree<'ast> {
    script: Script<'ast>,
    diagnostics: Diagnostics,
}

impl<'ast> SyntaxTree<'ast> {
    /// Parse `source`. Fails only when the source is fundamentally
    /// unparsable; ordinary syntax errors land in [`diagnostics`](Self::diagnostics).
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Self, ParseFailure> {
        let output = Parser::parse(source, arena).map_err(|error| ParseFailure { error })?;
        let diagnostics = output.errors.into_iter().map(Diagnostic::from).collect();
        Ok(Self {
            script: output.script,
            diagnostics,
        })
    }

    pub fn script(&self) -> &Script<'ast> {
        &self.script
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_blocking()
    }
}

/// Parses the code provider's text into a caller-owned arena.
pub struct SyntaxTreeProvider<'ast, C> {
    code: C,
    arena: &'ast Bump,
}

impl<'ast, C: Provider<String>> SyntaxTreeProvider<'ast, C> {
    pub fn new(code: C, arena: &'ast Bump) -> Self {
        Self { code, arena }
    }
}

impl<'ast, C: Provider<String>> Provider<Result<SyntaxTree<'ast>, ParseFailure>>
    for SyntaxTreeProvider<'ast, C>
{
    fn provide(&self) -> Result<SyntaxTree<'ast>, ParseFailure> {
        SyntaxTree::parse(&self.code.provide(), self.arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CodeProvider;

    #[test]
    fn syntax_errors_are_recorded_not_raised() {
        let arena = Bump::new();
        let provider = SyntaxTreeProvider::new(CodeProvider::new("class A { int x }"), &arena);
        let tree = provider.provide().unwrap();
        assert!(tree.has_errors());
        assert!(tree.diagnostics().iter().all(|d| d.code.starts_with("QC1")));
    }

    #[test]
    fn excessive_nesting_is_fatal() {
        let arena = Bump::new();
        let depth = quickc_parser::MAX_NESTING as usize + 10;
        let source = format!(
            "class A {{ int M() => {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        assert!(SyntaxTree::parse(&source, &arena).is_err());
    }

    #[test]
    fn parentheses_up_to_the_limit_parse_on_a_default_thread() {
        // The class body and the method's expression take one level each.
        let depth = quickc_parser::MAX_NESTING as usize - 3;
        let source = format!(
            "class A {{ int M() => {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let has_errors = std::thread::spawn(move || {
            let arena = Bump::new();
            SyntaxTree::parse(&source, &arena).map(|tree| tree.has_errors())
        })
        .join()
        .unwrap();
        assert_eq!(has_errors, Ok(false));
    }

    #[test]
    fn reparsing_yields_equivalent_trees() {
        let arena = Bump::new();
        let source = "namespace N { class A { public int M() => 1; } }";
        let first = SyntaxTree::parse(source, &arena).unwrap();
        let second = SyntaxTree::parse(source, &arena).unwrap();
        assert_eq!(format!("{:?}", first.script()), format!("{:?}", second.script()));
    }
}
