//! Unary operators and increments.

use quickc_core::{CompilationError, DataType, Span, Value};
use quickc_parser::ast::{Expr, PostfixExpr, PostfixOp, UnaryExpr, UnaryOp};

use super::{ExprCompiler, Result, fold_error};
use crate::bytecode::{OpCode, eval};
use crate::expr_info::ExprInfo;

fn one(ty: DataType) -> Value {
    match ty {
        DataType::Long => Value::Long(1),
        DataType::Double => Value::Double(1.0),
        _ => Value::Int(1),
    }
}

fn step_op(ty: DataType, increment: bool) -> OpCode {
    match (ty, increment) {
        (DataType::Long, true) => OpCode::AddI64,
        (DataType::Long, false) => OpCode::SubI64,
        (DataType::Double, true) => OpCode::AddF64,
        (DataType::Double, false) => OpCode::SubF64,
        (_, true) => OpCode::AddI32,
        (_, false) => OpCode::SubI32,
    }
}

impl ExprCompiler<'_, '_, '_> {
    pub(super) fn compile_unary(&mut self, un: &UnaryExpr<'_>) -> Result<ExprInfo> {
        if matches!(un.op, UnaryOp::PreInc | UnaryOp::PreDec) {
            let increment = un.op == UnaryOp::PreInc;
            return self.compile_inc_dec(un.operand, increment, true, false, un.span);
        }

        let operand = self.compile(un.operand)?;
        let op = match (un.op, operand.ty) {
            (UnaryOp::Plus, ty) if ty.is_numeric() => return Ok(operand),
            (UnaryOp::Neg, DataType::Int) => OpCode::NegI32,
            (UnaryOp::Neg, DataType::Long) => OpCode::NegI64,
            (UnaryOp::Neg, DataType::Double) => OpCode::NegF64,
            (UnaryOp::LogicalNot, DataType::Bool) => OpCode::Not,
            (op, ty) => {
                return Err(CompilationError::InvalidUnaryOperand {
                    op: op.as_str().to_string(),
                    operand: ty.name().to_string(),
                    span: un.span,
                });
            }
        };

        if let Some(value) = &operand.constant {
            let folded = eval::unary(op, value, true).map_err(|e| fold_error(e, un.span))?;
            return Ok(self.replace_with_constant(operand.start, folded));
        }
        self.emitter.emit(op);
        Ok(ExprInfo::rvalue(operand.ty, operand.start))
    }

    pub(super) fn compile_postfix(&mut self, post: &PostfixExpr<'_>, discard: bool) -> Result<ExprInfo> {
        let increment = post.op == PostfixOp::PostInc;
        self.compile_inc_dec(post.operand, increment, false, discard, post.span)
    }

    /// `++x`, `x--` and friends.
    ///
    /// ```text
    /// prefix:  [get] CONST 1 ADD DUP [set]
    /// postfix: [get] DUP CONST 1 ADD [set]
    /// ```
    ///
    /// The `DUP` is left out when the value is discarded.
    pub(super) fn compile_inc_dec(
        &mut self,
        target: &Expr<'_>,
        increment: bool,
        prefix: bool,
        discard: bool,
        span: Span,
    ) -> Result<ExprInfo> {
        let place = self.resolve_place(target)?;
        let ty = place.ty();
        if !ty.is_numeric() {
            return Err(CompilationError::InvalidUnaryOperand {
                op: if increment { "++" } else { "--" }.to_string(),
                operand: ty.name().to_string(),
                span,
            });
        }

        let start = self.offset();
        self.emit_load(&place);
        if !prefix && !discard {
            self.emitter.emit(OpCode::Dup);
        }
        self.emitter.emit_value(&one(ty));
        self.emitter.emit(step_op(ty, increment));
        if prefix && !discard {
            self.emitter.emit(OpCode::Dup);
        }
        self.emit_store(&place);

        Ok(ExprInfo::rvalue(if discard { DataType::Void } else { ty }, start))
    }
}
