//! The conditional operator.
//!
//! ```text
//!       [cond] JUMP_IF_FALSE else
//!       [then] (conv) JUMP end
//! else: [else] (conv)
//! end:
//! ```
//!
//! Both branches are compiled before the result type is known, then cut out
//! and re-laid with the conversion each needs.

use quickc_core::{CompilationError, DataType};
use quickc_parser::ast::TernaryExpr;

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;
use crate::conversion::{self, convert_constant};
use crate::expr_info::ExprInfo;

impl ExprCompiler<'_, '_, '_> {
    pub(super) fn compile_ternary(&mut self, ternary: &TernaryExpr<'_>) -> Result<ExprInfo> {
        let start = self.offset();
        let condition = self.check(ternary.condition, DataType::Bool)?;
        let else_jump = self.emitter.emit_jump(OpCode::JumpIfFalse);

        let branch_start = self.offset();
        let then = self.compile(ternary.then_expr)?;
        let then_code = self.emitter.take_since(branch_start);
        let otherwise = self.compile(ternary.else_expr)?;
        let else_code = self.emitter.take_since(branch_start);

        let mismatch = || CompilationError::ConditionalTypeMismatch {
            first: then.ty.name().to_string(),
            second: otherwise.ty.name().to_string(),
            span: ternary.span,
        };
        let ty = if then.ty == otherwise.ty {
            then.ty
        } else if conversion::is_implicitly_convertible(otherwise.ty, then.ty) {
            then.ty
        } else if conversion::is_implicitly_convertible(then.ty, otherwise.ty) {
            otherwise.ty
        } else {
            return Err(mismatch());
        };
        if ty.is_void() {
            return Err(mismatch());
        }

        if let (Some(cond), Some(a), Some(b)) = (&condition.constant, &then.constant, &otherwise.constant) {
            let chosen = if cond.as_bool() == Some(true) { a } else { b };
            let value = convert_constant(chosen, ty).ok_or_else(mismatch)?;
            return Ok(self.replace_with_constant(start, value));
        }

        let widen = |from: DataType| conversion::implicit(from, ty).and_then(|c| c.op());
        self.emitter.append(&then_code);
        if let Some(op) = widen(then.ty) {
            self.emitter.emit(op);
        }
        let end_jump = self.emitter.emit_jump(OpCode::Jump);
        self.emitter.patch_jump(else_jump);
        self.emitter.append(&else_code);
        if let Some(op) = widen(otherwise.ty) {
            self.emitter.emit(op);
        }
        self.emitter.patch_jump(end_jump);

        Ok(ExprInfo::rvalue(ty, start))
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::{DataType, Value};

    use super::super::test_support::{compile_expr, error_code};
    use crate::bytecode::OpCode;

    fn op(op: OpCode) -> u8 {
        op as u8
    }

    #[test]
    fn branches_are_widened_to_a_common_type() {
        let compiled = compile_expr("b ? 1 : 2L", &[("b", DataType::Bool)]);
        assert_eq!(compiled.info.unwrap().ty, DataType::Long);
        assert_eq!(
            compiled.code,
            [
                op(OpCode::GetLocal), 0, 0,
                op(OpCode::JumpIfFalse), 0, 7,
                op(OpCode::Constant), 0, 0,
                op(OpCode::I32ToI64),
                op(OpCode::Jump), 0, 3,
                op(OpCode::Constant), 0, 1,
            ]
        );
    }

    #[test]
    fn constant_conditionals_fold() {
        let compiled = compile_expr("1 < 2 ? 1 : 2.5", &[]);
        assert_eq!(compiled.info.unwrap().constant, Some(Value::Double(1.0)));
    }

    #[test]
    fn incompatible_branches() {
        assert_eq!(error_code("b ? 1 : \"a\"", &[("b", DataType::Bool)]), "QC0173");
        assert_eq!(error_code("1 ? 2 : 3", &[]), "QC0029");
    }
}
