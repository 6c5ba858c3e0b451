//! For loops.
//!
//! ```text
//!        [init]
//! start: [cond] JUMP_IF_FALSE end
//!        [body]
//! cont:  [update]
//!        LOOP start
//! end:
//! ```
//!
//! Variables declared by the initializer are scoped to the loop.

use quickc_parser::ast::{ForInit, ForStmt};

use super::StmtCompiler;
use crate::bytecode::OpCode;

impl StmtCompiler<'_, '_, '_> {
    pub fn compile_for(&mut self, stmt: &ForStmt<'_>, reachable: bool) -> bool {
        self.locals.push_scope();

        match &stmt.init {
            Some(ForInit::VarDecl(decl)) => self.compile_var_decl(decl),
            Some(ForInit::Exprs(exprs)) => {
                for expr in exprs.iter() {
                    let result = self.expr_compiler().compile_discarded(expr);
                    self.report(result);
                }
            }
            None => {}
        }

        let start = self.emitter.current_offset();
        let constant = match stmt.condition {
            Some(condition) => {
                let (constant, condition_start) = self.condition(condition);
                if constant == Some(true) {
                    self.emitter.truncate(condition_start);
                }
                constant
            }
            None => Some(true),
        };
        let exit = (constant != Some(true)).then(|| self.emitter.emit_jump(OpCode::JumpIfFalse));

        self.emitter.enter_loop(None);
        let body_live = reachable && constant != Some(false);
        self.compile_nested(&stmt.body, body_live, reachable);
        self.emitter.patch_continues();
        for update in stmt.update {
            let result = self.expr_compiler().compile_discarded(update);
            self.report(result);
        }
        self.emitter.emit_loop(start);
        if let Some(label) = exit {
            self.emitter.patch_jump(label);
        }
        let exit = self.emitter.exit_loop();

        self.locals.pop_scope();
        reachable && (constant != Some(true) || exit.has_break)
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::DataType;

    use super::super::test_support::{codes, compile_body};
    use crate::options::CompilationOptions;

    #[test]
    fn loop_variables_are_scoped_to_the_loop() {
        let (body, diagnostics) = compile_body(
            DataType::Void,
            "for (int i = 0; i < 3; i++) { } for (int i = 0; i < 3; i++) { }",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(body.locals, 2);
    }

    #[test]
    fn missing_condition_loops_forever() {
        let (_, diagnostics) = compile_body(DataType::Int, "for (;;) { }", CompilationOptions::default());
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(
            DataType::Int,
            "for (int i = 0; ; i++) { if (i > 2) break; }",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0161"]);
    }

    #[test]
    fn update_expressions_must_be_statements() {
        let (_, diagnostics) = compile_body(
            DataType::Void,
            "for (int i = 0; i < 3; i + 1) { }",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0201"]);
    }
}
