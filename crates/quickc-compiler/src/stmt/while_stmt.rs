//! While loops.
//!
//! ```text
//! start: [cond] JUMP_IF_FALSE end
//!        [body]
//!        LOOP start
//! end:
//! ```
//!
//! `continue` jumps back to `start`. A constant-true condition emits no test.

use quickc_parser::ast::WhileStmt;

use super::StmtCompiler;
use crate::bytecode::OpCode;

impl StmtCompiler<'_, '_, '_> {
    pub fn compile_while(&mut self, stmt: &WhileStmt<'_>, reachable: bool) -> bool {
        let (constant, start) = self.condition(stmt.condition);
        let exit = if constant == Some(true) {
            self.emitter.truncate(start);
            None
        } else {
            Some(self.emitter.emit_jump(OpCode::JumpIfFalse))
        };

        self.emitter.enter_loop(Some(start));
        let body_live = reachable && constant != Some(false);
        self.compile_nested(&stmt.body, body_live, reachable);
        self.emitter.emit_loop(start);
        if let Some(label) = exit {
            self.emitter.patch_jump(label);
        }
        let exit = self.emitter.exit_loop();

        reachable && (constant != Some(true) || exit.has_break)
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
    fn loop_layout() {
        let (body, diagnostics) = compile_body(
            DataType::Void,
            "int i = 0; while (i < 3) i++;",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(
            body.code,
            [
                op(OpCode::Constant), 0, 0,
                op(OpCode::SetLocal), 0, 0,
                // start = 6
                op(OpCode::GetLocal), 0, 0,
                op(OpCode::Constant), 0, 1,
                op(OpCode::LtI32),
                op(OpCode::JumpIfFalse), 0, 13,
                op(OpCode::GetLocal), 0, 0,
                op(OpCode::Constant), 0, 2,
                op(OpCode::AddI32),
                op(OpCode::SetLocal), 0, 0,
                op(OpCode::Loop), 0, 23,
                op(OpCode::ReturnVoid),
            ]
        );
    }

    #[test]
    fn infinite_loops_need_a_break_to_complete() {
        let (_, diagnostics) = compile_body(DataType::Int, "while (true) { }", CompilationOptions::default());
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "while (true) { break; }",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0161"]);
    }

    #[test]
    fn break_outside_a_loop() {
        let (_, diagnostics) = compile_body(DataType::Void, "break;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0139"]);
    }
}
