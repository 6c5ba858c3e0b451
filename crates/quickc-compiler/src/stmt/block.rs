//! Block statements.

use quickc_parser::ast::Block;

use super::{StmtCompiler, first_statement};

impl StmtCompiler<'_, '_, '_> {
    /// Compile a block in its own scope. Only the first unreachable
    /// statement of a block is warned about.
    pub fn compile_block(&mut self, block: &Block<'_>, reachable: bool) -> bool {
        self.locals.push_scope();
        let mut live = reachable;
        let mut warned = false;
        for stmt in block.stmts {
            let parent = reachable && !warned;
            if !live && parent && first_statement(stmt).is_some() {
                warned = true;
            }
            live = self.compile_nested(stmt, live, parent);
        }
        self.locals.pop_scope();
        live
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::DataType;

    use super::super::test_support::{codes, compile_body};
    use crate::bytecode::OpCode;
    use crate::options::{CompilationOptions, OptimizationLevel};

    #[test]
    fn code_after_return_is_warned_once() {
        let (_, diagnostics) = compile_body(
            DataType::Int,
            "return 1; int a = 2; int b = 3;",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0162"]);
        assert!(!diagnostics.has_blocking());
    }

    #[test]
    fn empty_statements_are_not_unreachable_code() {
        let (_, diagnostics) = compile_body(DataType::Void, "return; ;", CompilationOptions::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn release_builds_drop_unreachable_code() {
        let release = CompilationOptions::default().with_optimization_level(OptimizationLevel::Release);
        let (body, _) = compile_body(DataType::Int, "return 1; Console.WriteLine(2);", release);
        assert_eq!(body.code, [OpCode::Constant as u8, 0, 0, OpCode::Return as u8]);

        let debug = CompilationOptions::default().with_optimization_level(OptimizationLevel::Debug);
        let (body, _) = compile_body(DataType::Int, "return 1; Console.WriteLine(2);", debug);
        assert!(body.code.len() > 4);
    }

    #[test]
    fn block_locals_go_out_of_scope() {
        let (body, diagnostics) = compile_body(
            DataType::Void,
            "{ int a = 1; } { int a = 2; }",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(body.locals, 2);
    }
}
