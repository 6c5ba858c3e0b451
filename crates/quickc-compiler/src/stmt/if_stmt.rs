//! If statements.
//!
//! ```text
//!       [cond] JUMP_IF_FALSE else
//!       [then] JUMP end
//! else: [else]
//! end:
//! ```
//!
//! The `JUMP end` is left out when there is no else branch or the then
//! branch cannot complete.

use quickc_parser::ast::IfStmt;

use super::StmtCompiler;
use crate::bytecode::OpCode;

impl StmtCompiler<'_, '_, '_> {
    pub fn compile_if(&mut self, stmt: &IfStmt<'_>, reachable: bool) -> bool {
        let (constant, _) = self.condition(stmt.condition);
        let else_jump = self.emitter.emit_jump(OpCode::JumpIfFalse);

        let then_live = reachable && constant != Some(false);
        let then_end = self.compile_nested(&stmt.then_stmt, then_live, reachable);

        let Some(else_stmt) = &stmt.else_stmt else {
            self.emitter.patch_jump(else_jump);
            return then_end || (reachable && constant != Some(true));
        };

        let end_jump = then_end.then(|| self.emitter.emit_jump(OpCode::Jump));
        self.emitter.patch_jump(else_jump);
        let else_live = reachable && constant != Some(true);
        let else_end = self.compile_nested(else_stmt, else_live, reachable);
        if let Some(label) = end_jump {
            self.emitter.patch_jump(label);
        }
        then_end || else_end
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::DataType;

    use super::super::test_support::{codes, compile_body};
    use crate::options::CompilationOptions;

    #[test]
    fn both_branches_returning_ends_the_method() {
        let (_, diagnostics) = compile_body(
            DataType::Int,
            "int x = 0; if (x < 2) return 1; else return 2;",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "int x = 0; if (x > 0) return 1;",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0161"]);
    }

    #[test]
    fn constant_conditions_make_branches_unreachable() {
        let (_, diagnostics) = compile_body(
            DataType::Void,
            "if (false) { Console.WriteLine(1); }",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0162"]);

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "if (true) return 1;",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "if (1 < 2) return 1; else return 2;",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0162"]);
    }

    #[test]
    fn conditions_must_be_bool() {
        let (_, diagnostics) = compile_body(DataType::Void, "if (1) { }", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0029"]);
    }
}
