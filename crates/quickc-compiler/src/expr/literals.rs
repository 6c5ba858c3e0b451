//! Literal expressions.

use quickc_core::Value;
use quickc_parser::ast::{LiteralExpr, LiteralKind};

use super::ExprCompiler;
use crate::expr_info::ExprInfo;

impl ExprCompiler<'_, '_, '_> {
    pub(super) fn compile_literal(&mut self, lit: &LiteralExpr<'_>) -> ExprInfo {
        let value = match lit.kind {
            LiteralKind::Int(v) => Value::Int(v),
            LiteralKind::Long(v) => Value::Long(v),
            LiteralKind::Double(v) => Value::Double(v),
            LiteralKind::Bool(v) => Value::Bool(v),
            LiteralKind::String(s) => Value::Str(s.to_string()),
        };
        let start = self.offset();
        self.emitter.emit_value(&value);
        ExprInfo::constant(value, start)
    }
}
