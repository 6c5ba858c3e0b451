//! Binary operators.
//!
//! Arithmetic and comparison operands are widened to a common numeric type.
//! `+` concatenates as soon as either side is a string, converting the other
//! side with `ToString` semantics. `&&` and `||` short-circuit:
//!
//! ```text
//! [left] DUP JUMP_IF_FALSE end POP [right] end:     // &&
//! [left] DUP JUMP_IF_TRUE  end POP [right] end:     // ||
//! ```

use quickc_core::{CompilationError, DataType, Value};
use quickc_parser::ast::{BinaryExpr, BinaryOp, Expr};

use super::{ExprCompiler, Result, fold_error};
use crate::bytecode::{OpCode, eval};
use crate::conversion::{self, numeric_promotion};
use crate::expr_info::ExprInfo;

/// How to evaluate a non-logical binary operator for given operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BinaryPlan {
    /// Conversion applied to each operand before the operator.
    pub left: Option<OpCode>,
    pub right: Option<OpCode>,
    /// The type both operands have once converted.
    pub operand: DataType,
    pub op: OpCode,
    pub result: DataType,
}

fn typed(op: BinaryOp, ty: DataType) -> Option<OpCode> {
    use BinaryOp::*;
    use OpCode::*;
    Some(match (ty, op) {
        (DataType::Int, Add) => AddI32,
        (DataType::Int, Sub) => SubI32,
        (DataType::Int, Mul) => MulI32,
        (DataType::Int, Div) => DivI32,
        (DataType::Int, Mod) => ModI32,
        (DataType::Int, Less) => LtI32,
        (DataType::Int, LessEqual) => LeI32,
        (DataType::Int, Greater) => GtI32,
        (DataType::Int, GreaterEqual) => GeI32,
        (DataType::Long, Add) => AddI64,
        (DataType::Long, Sub) => SubI64,
        (DataType::Long, Mul) => MulI64,
        (DataType::Long, Div) => DivI64,
        (DataType::Long, Mod) => ModI64,
        (DataType::Long, Less) => LtI64,
        (DataType::Long, LessEqual) => LeI64,
        (DataType::Long, Greater) => GtI64,
        (DataType::Long, GreaterEqual) => GeI64,
        (DataType::Double, Add) => AddF64,
        (DataType::Double, Sub) => SubF64,
        (DataType::Double, Mul) => MulF64,
        (DataType::Double, Div) => DivF64,
        (DataType::Double, Mod) => ModF64,
        (DataType::Double, Less) => LtF64,
        (DataType::Double, LessEqual) => LeF64,
        (DataType::Double, Greater) => GtF64,
        (DataType::Double, GreaterEqual) => GeF64,
        _ => return None,
    })
}

fn widen(from: DataType, to: DataType) -> Option<OpCode> {
    conversion::implicit(from, to).and_then(|c| c.op())
}

/// Plan `left op right`. Logical operators have no plan; they compile to jumps.
pub(crate) fn plan_binary(op: BinaryOp, left: DataType, right: DataType) -> Option<BinaryPlan> {
    use BinaryOp::*;
    if left.is_void() || right.is_void() {
        return None;
    }
    match op {
        LogicalOr | LogicalAnd => None,
        Add if left == DataType::String || right == DataType::String => Some(BinaryPlan {
            left: (left != DataType::String).then_some(OpCode::ToStr),
            right: (right != DataType::String).then_some(OpCode::ToStr),
            operand: DataType::String,
            op: OpCode::Concat,
            result: DataType::String,
        }),
        Equal | NotEqual => {
            let eq = if op == Equal { OpCode::Eq } else { OpCode::Ne };
            let operand = match numeric_promotion(left, right) {
                Some(ty) => ty,
                None if left == right => left,
                None => return None,
            };
            Some(BinaryPlan {
                left: widen(left, operand),
                right: widen(right, operand),
                operand,
                op: eq,
                result: DataType::Bool,
            })
        }
        _ => {
            let operand = numeric_promotion(left, right)?;
            Some(BinaryPlan {
                left: widen(left, operand),
                right: widen(right, operand),
                operand,
                op: typed(op, operand)?,
                result: if op.is_comparison() {
                    DataType::Bool
                } else {
                    operand
                },
            })
        }
    }
}

pub(crate) fn is_zero(value: &Value) -> bool {
    matches!(value, Value::Int(0) | Value::Long(0))
}

impl ExprCompiler<'_, '_, '_> {
    /// Compile a binary expression. The left spine (`a + b + c + ...`) is
    /// walked in a loop, so long chains cost no recursion.
    pub(super) fn compile_binary(&mut self, bin: &BinaryExpr<'_>) -> Result<ExprInfo> {
        let mut spine = vec![bin];
        let mut leftmost = bin.left;
        while let Expr::Binary(inner) = *leftmost {
            spine.push(inner);
            leftmost = inner.left;
        }

        let mut left = self.compile(leftmost)?;
        for bin in spine.into_iter().rev() {
            left = if bin.op.is_logical() {
                self.apply_logical(bin, left)?
            } else {
                self.apply_arithmetic(bin, left)?
            };
        }
        Ok(left)
    }

    /// `left <op> right` where `left` is already on the stack.
    fn apply_arithmetic(&mut self, bin: &BinaryExpr<'_>, left: ExprInfo) -> Result<ExprInfo> {
        let left_end = self.offset();
        let right = self.compile(bin.right)?;

        let plan = plan_binary(bin.op, left.ty, right.ty).ok_or_else(|| {
            CompilationError::InvalidBinaryOperands {
                op: bin.op.as_str().to_string(),
                left: left.ty.name().to_string(),
                right: right.ty.name().to_string(),
                span: bin.span,
            }
        })?;
        self.apply_plan(&plan, left, left_end, right, bin.op, bin.span)
    }

    /// Convert both operands and apply the operator, folding when both
    /// operands are known.
    pub(super) fn apply_plan(
        &mut self,
        plan: &BinaryPlan,
        left: ExprInfo,
        left_end: usize,
        right: ExprInfo,
        op: BinaryOp,
        span: quickc_core::Span,
    ) -> Result<ExprInfo> {
        let end = self.offset();
        let right = self.convert_operand(right, plan.right, plan.operand, end, span)?;
        let left = self.convert_operand(left, plan.left, plan.operand, left_end, span)?;

        if matches!(op, BinaryOp::Div | BinaryOp::Mod)
            && plan.operand.is_integral()
            && right.constant.as_ref().is_some_and(is_zero)
        {
            return Err(CompilationError::DivisionByConstantZero { span });
        }

        if let (Some(l), Some(r)) = (&left.constant, &right.constant) {
            let value = eval::binary(plan.op, l, r, true).map_err(|e| fold_error(e, span))?;
            return Ok(self.replace_with_constant(left.start, value));
        }

        self.emitter.emit(plan.op);
        Ok(ExprInfo::rvalue(plan.result, left.start))
    }

    /// Short-circuit `left && right` or `left || right` where `left` is
    /// already on the stack.
    fn apply_logical(&mut self, bin: &BinaryExpr<'_>, left: ExprInfo) -> Result<ExprInfo> {
        self.emitter.emit(OpCode::Dup);
        let skip = self.emitter.emit_jump(if bin.op == BinaryOp::LogicalAnd {
            OpCode::JumpIfFalse
        } else {
            OpCode::JumpIfTrue
        });
        self.emitter.emit(OpCode::Pop);
        let right = self.compile(bin.right)?;
        self.emitter.patch_jump(skip);

        if left.ty != DataType::Bool || right.ty != DataType::Bool {
            return Err(CompilationError::InvalidBinaryOperands {
                op: bin.op.as_str().to_string(),
                left: left.ty.name().to_string(),
                right: right.ty.name().to_string(),
                span: bin.span,
            });
        }

        if let (Some(Value::Bool(l)), Some(Value::Bool(r))) = (&left.constant, &right.constant) {
            let value = if bin.op == BinaryOp::LogicalAnd {
                *l && *r
            } else {
                *l || *r
            };
            return Ok(self.replace_with_constant(left.start, Value::Bool(value)));
        }
        Ok(ExprInfo::rvalue(DataType::Bool, left.start))
    }
}
