//! Do-while loops.
//!
//! ```text
//! body: [body]
//! cont: [cond] JUMP_IF_FALSE end
//!       LOOP body
//! end:
//! ```

use quickc_parser::ast::DoWhileStmt;

use super::StmtCompiler;
use crate::bytecode::OpCode;

impl StmtCompiler<'_, '_, '_> {
    pub fn compile_do_while(&mut self, stmt: &DoWhileStmt<'_>, reachable: bool) -> bool {
        let body_start = self.emitter.current_offset();
        self.emitter.enter_loop(None);
        let body_end = self.compile_nested(&stmt.body, reachable, reachable);
        self.emitter.patch_continues();

        let (constant, start) = self.condition(stmt.condition);
        match constant {
            Some(true) => {
                self.emitter.truncate(start);
                self.emitter.emit_loop(body_start);
            }
            Some(false) => self.emitter.truncate(start),
            None => {
                let exit = self.emitter.emit_jump(OpCode::JumpIfFalse);
                self.emitter.emit_loop(body_start);
                self.emitter.patch_jump(exit);
            }
        }
        let exit = self.emitter.exit_loop();

        let condition_reached = body_end || exit.has_continue;
        exit.has_break || (constant != Some(true) && condition_reached)
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::DataType;

    use super::super::test_support::{codes, compile_body};
    use crate::bytecode::OpCode;
    use crate::options::CompilationOptions;

    fn op(op: OpCode) -> u8 {
        op as u8
    }

    #[test]
    fn body_runs_before_the_test() {
        let (body, diagnostics) = compile_body(
            DataType::Void,
            "bool again = false; do { } while (again);",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(
            body.code,
            [
                op(OpCode::PushFalse),
                op(OpCode::SetLocal), 0, 0,
                op(OpCode::GetLocal), 0, 0,
                op(OpCode::JumpIfFalse), 0, 3,
                op(OpCode::Loop), 0, 9,
                op(OpCode::ReturnVoid),
            ]
        );
    }

    #[test]
    fn forever_loops_do_not_complete() {
        let (_, diagnostics) = compile_body(DataType::Int, "do { } while (true);", CompilationOptions::default());
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "do { return 1; } while (true);",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "int i = 0; do { i++; continue; } while (i < 3);",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0161"]);
    }
}
