//! Method calls.
//!
//! Arguments are pushed left to right and the callee pops them. Script
//! methods are called by class and method index, library functions through
//! the module's import table. Instance methods of a keyword type take their
//! receiver as an extra first argument; instance methods of a script class
//! run on the caller's instance.

use quickc_core::{CompilationError, DataType, Span};
use quickc_parser::ast::{CallExpr, Expr, dotted};

use super::{CallTarget, ExprCompiler, Resolved, Result, fold_error};
use crate::bytecode::{OpCode, eval};
use crate::conversion;
use crate::expr_info::ExprInfo;
use crate::overload::{OverloadError, resolve_overload};

/// A compiled argument and the offset its code ends at.
struct Arg {
    info: ExprInfo,
    end: usize,
    span: Span,
}

fn operand(value: usize, what: &str, span: Span) -> Result<u16> {
    u16::try_from(value).map_err(|_| CompilationError::Unsupported {
        feature: format!("more than 65535 {what} in one module"),
        span,
    })
}

impl ExprCompiler<'_, '_, '_> {
    pub(super) fn compile_call(&mut self, call: &CallExpr<'_>) -> Result<ExprInfo> {
        let callee = call.callee.unparenthesized();
        let not_invocable = || CompilationError::NotInvocable {
            name: callee
                .as_dotted_path()
                .map(|path| dotted(&path))
                .unwrap_or_else(|| "expression".to_string()),
            span: callee.span(),
        };

        let start = self.offset();
        let resolved = match callee {
            Expr::Ident(_) | Expr::Member(_) => self.resolve(callee)?,
            _ => return Err(not_invocable()),
        };
        let Resolved::MethodGroup { target, name } = resolved else {
            return Err(not_invocable());
        };

        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args {
            let info = self.compile(arg)?;
            args.push(Arg {
                info,
                end: self.offset(),
                span: arg.span(),
            });
        }
        let types: Vec<DataType> = args.iter().map(|a| a.info.ty).collect();

        match target {
            CallTarget::Script {
                class,
                implicit_this,
            } => {
                let ctx = self.ctx;
                let symbol = ctx.class(class);
                let candidates: Vec<_> = symbol.methods_named(&name).collect();
                let chosen = resolve_overload(candidates.iter().map(|(_, m)| m.params.as_slice()), &types)
                    .map_err(|err| {
                        overload_error(err, &name, &args, call.span, |i| {
                            symbol.method_display_name(candidates[i].1)
                        })
                    })?;
                let (index, method) = candidates[chosen];
                let display = symbol.method_display_name(method);

                self.check_access(class, method.visibility, &display, call.span)?;
                if !method.is_static && (!implicit_this || self.method.is_static) {
                    return Err(CompilationError::InstanceMemberFromStatic {
                        member: display,
                        span: call.span,
                    });
                }

                self.convert_args(args, &method.params)?;
                let class = operand(class, "classes", call.span)?;
                let method_index = operand(index, "methods in a class", call.span)?;
                self.emitter.emit_call(class, method_index);
                Ok(ExprInfo::rvalue(method.return_type, start))
            }

            CallTarget::NativeStatic(class) => {
                let candidates: Vec<_> = class.functions_named(&name).collect();
                let chosen = resolve_overload(candidates.iter().map(|f| f.params.as_slice()), &types)
                    .map_err(|err| {
                        overload_error(err, &name, &args, call.span, |i| candidates[i].signature())
                    })?;
                let function = candidates[chosen];

                self.convert_args(args, &function.params)?;
                let import = self.imports.import(function, None, call.span)?;
                self.emitter.emit_call_native(import);
                Ok(ExprInfo::rvalue(function.return_type, start))
            }

            CallTarget::NativeInstance { class, receiver } => {
                let candidates: Vec<_> = class.methods_named(&name).collect();
                let chosen = resolve_overload(candidates.iter().map(|f| f.params.as_slice()), &types)
                    .map_err(|err| {
                        overload_error(err, &name, &args, call.span, |i| candidates[i].signature())
                    })?;
                let function = candidates[chosen];

                self.convert_args(args, &function.params)?;
                let import = self.imports.import(function, Some(receiver.ty), call.span)?;
                self.emitter.emit_call_native(import);
                Ok(ExprInfo::rvalue(function.return_type, receiver.start))
            }

            CallTarget::ToString(receiver) => {
                if !args.is_empty() {
                    return Err(CompilationError::NoOverload {
                        name,
                        count: args.len(),
                        span: call.span,
                    });
                }
                if receiver.ty == DataType::String {
                    return Ok(receiver);
                }
                if let Some(value) = &receiver.constant {
                    let text = eval::unary(OpCode::ToStr, value, true)
                        .map_err(|e| fold_error(e, call.span))?;
                    return Ok(self.replace_with_constant(receiver.start, text));
                }
                self.emitter.emit(OpCode::ToStr);
                Ok(ExprInfo::rvalue(DataType::String, receiver.start))
            }
        }
    }

    /// Convert each argument to its parameter type. Conversions go in last
    /// argument first, so the recorded end offsets stay valid.
    fn convert_args(&mut self, args: Vec<Arg>, params: &[DataType]) -> Result<()> {
        for (arg, &param) in args.into_iter().zip(params).rev() {
            let op = conversion::implicit(arg.info.ty, param).and_then(|c| c.op());
            self.convert_operand(arg.info, op, param, arg.end, arg.span)?;
        }
        Ok(())
    }
}

fn overload_error(
    err: OverloadError,
    name: &str,
    args: &[Arg],
    span: Span,
    display: impl Fn(usize) -> String,
) -> CompilationError {
    match err {
        OverloadError::NoArity => CompilationError::NoOverload {
            name: name.to_string(),
            count: args.len(),
            span,
        },
        OverloadError::Mismatch { index, expected } => CompilationError::ArgumentMismatch {
            index: index + 1,
            from: args[index].info.ty.name().to_string(),
            to: expected.name().to_string(),
            span: args[index].span,
        },
        OverloadError::Ambiguous(first, second) => CompilationError::AmbiguousCall {
            first: display(first),
            second: display(second),
            span,
        },
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
    fn library_calls_go_through_imports() {
        let compiled = compile_expr("Console.WriteLine(1)", &[]);
        assert_eq!(compiled.info.unwrap().ty, DataType::Void);
        assert_eq!(
            compiled.code,
            [op(OpCode::Constant), 0, 0, op(OpCode::CallNative), 0, 0]
        );
    }

    #[test]
    fn arguments_are_widened_in_place() {
        let compiled = compile_expr("Math.Max(1, 2L)", &[]);
        assert_eq!(compiled.info.unwrap().ty, DataType::Long);
        assert_eq!(
            compiled.code,
            [
                op(OpCode::Constant), 0, 0,
                op(OpCode::I32ToI64),
                op(OpCode::Constant), 0, 1,
                op(OpCode::CallNative), 0, 0,
            ]
        );
    }

    #[test]
    fn instance_methods_take_the_receiver_first() {
        let compiled = compile_expr("s.Trim().ToUpper()", &[("s", DataType::String)]);
        assert_eq!(compiled.info.unwrap().ty, DataType::String);
        assert_eq!(
            compiled.code,
            [
                op(OpCode::GetLocal), 0, 0,
                op(OpCode::CallNative), 0, 0,
                op(OpCode::CallNative), 0, 1,
            ]
        );
    }

    #[test]
    fn to_string_is_built_in() {
        let compiled = compile_expr("(12).ToString()", &[]);
        assert_eq!(compiled.info.unwrap().constant, Some(Value::from("12")));

        let compiled = compile_expr("b.ToString()", &[("b", DataType::Bool)]);
        assert_eq!(compiled.code, [op(OpCode::GetLocal), 0, 0, op(OpCode::ToStr)]);
        assert_eq!(error_code("b.ToString(1)", &[("b", DataType::Bool)]), "QC1501");
    }

    #[test]
    fn call_errors() {
        assert_eq!(error_code("Math.Abs()", &[]), "QC1501");
        assert_eq!(error_code("Math.Sqrt(\"x\")", &[]), "QC1503");
        assert_eq!(error_code("x()", &[("x", DataType::Int)]), "QC1955");
        assert_eq!(error_code("Math.PI()", &[]), "QC1955");
    }
}
