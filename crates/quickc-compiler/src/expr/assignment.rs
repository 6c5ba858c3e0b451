//! Assignment targets and the assignment operators.
//!
//! ```text
//! x = v     : [v] DUP SET x
//! x += v    : GET x [v] ADD DUP SET x
//! ```
//!
//! The `DUP` is dropped when the assignment is a statement.

use quickc_core::{CompilationError, DataType};
use quickc_parser::ast::{AssignExpr, BinaryOp, Expr};

use super::{ExprCompiler, FieldRef, Resolved, Result, plan_binary};
use super::binary::is_zero;
use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::image::MethodKind;

/// Something a value can be stored into.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Place {
    Local { slot: u16, ty: DataType },
    Field(FieldRef),
}

impl Place {
    pub fn ty(&self) -> DataType {
        match self {
            Place::Local { ty, .. } => *ty,
            Place::Field(field) => field.ty,
        }
    }
}

impl ExprCompiler<'_, '_, '_> {
    /// Resolve the left-hand side of an assignment or increment.
    pub(super) fn resolve_place(&mut self, target: &Expr<'_>) -> Result<Place> {
        let target = target.unparenthesized();
        let resolved = match target {
            Expr::Ident(_) | Expr::Member(_) => self.resolve(target)?,
            _ => {
                return Err(CompilationError::InvalidAssignmentTarget {
                    span: target.span(),
                });
            }
        };
        match resolved {
            Resolved::Local { slot, ty } => Ok(Place::Local { slot, ty }),
            Resolved::Field(field) => {
                self.check_writable(&field, target)?;
                Ok(Place::Field(field))
            }
            _ => Err(CompilationError::InvalidAssignmentTarget {
                span: target.span(),
            }),
        }
    }

    /// Readonly fields are writable only from their own class's constructors
    /// (instance fields) or type initializer (static fields).
    fn check_writable(&self, field: &FieldRef, target: &Expr<'_>) -> Result<()> {
        if !field.is_readonly {
            return Ok(());
        }
        let in_own_class = field.class == self.method.class;
        let allowed = in_own_class
            && if field.is_static {
                self.method.kind == MethodKind::TypeInitializer
            } else {
                self.method.kind == MethodKind::Constructor
            };
        if allowed {
            Ok(())
        } else {
            Err(CompilationError::ReadonlyAssignment {
                name: field.name.clone(),
                span: target.span(),
            })
        }
    }

    pub(super) fn emit_load(&mut self, place: &Place) {
        match place {
            Place::Local { slot, .. } => self.emitter.emit_get_local(*slot),
            Place::Field(field) if field.is_static => {
                self.emitter.emit_u16(OpCode::GetStatic, field.slot)
            }
            Place::Field(field) => self.emitter.emit_u16(OpCode::GetField, field.slot),
        }
    }

    pub(super) fn emit_store(&mut self, place: &Place) {
        match place {
            Place::Local { slot, .. } => self.emitter.emit_set_local(*slot),
            Place::Field(field) if field.is_static => {
                self.emitter.emit_u16(OpCode::SetStatic, field.slot)
            }
            Place::Field(field) => self.emitter.emit_u16(OpCode::SetField, field.slot),
        }
    }

    pub(super) fn compile_assign(&mut self, assign: &AssignExpr<'_>, discard: bool) -> Result<ExprInfo> {
        let place = self.resolve_place(assign.target)?;
        let ty = place.ty();
        let start = self.offset();

        match assign.op.binary_op() {
            None => {
                self.check(assign.value, ty)?;
            }
            Some(op) => self.compile_compound(&place, op, assign)?,
        }

        if !discard {
            self.emitter.emit(OpCode::Dup);
        }
        self.emit_store(&place);
        Ok(ExprInfo::rvalue(if discard { DataType::Void } else { ty }, start))
    }

    /// `x op= v` is `x = x op v` with `x` evaluated once; the result must
    /// already have the type of `x`.
    fn compile_compound(&mut self, place: &Place, op: BinaryOp, assign: &AssignExpr<'_>) -> Result<()> {
        let ty = place.ty();
        self.emit_load(place);
        let left_end = self.offset();
        let right = self.compile(assign.value)?;

        let plan = plan_binary(op, ty, right.ty).ok_or_else(|| {
            CompilationError::InvalidBinaryOperands {
                op: assign.op.as_str().to_string(),
                left: ty.name().to_string(),
                right: right.ty.name().to_string(),
                span: assign.span,
            }
        })?;
        if plan.result != ty {
            return Err(CompilationError::TypeMismatch {
                from: plan.result.name().to_string(),
                to: ty.name().to_string(),
                span: assign.span,
            });
        }

        let end = self.offset();
        let right = self.convert_operand(right, plan.right, plan.operand, end, assign.span)?;
        if let Some(widen) = plan.left {
            self.emitter.insert_op(left_end, widen);
        }
        if matches!(op, BinaryOp::Div | BinaryOp::Mod)
            && plan.operand.is_integral()
            && right.constant.as_ref().is_some_and(is_zero)
        {
            return Err(CompilationError::DivisionByConstantZero { span: assign.span });
        }
        self.emitter.emit(plan.op);
        Ok(())
    }
}
