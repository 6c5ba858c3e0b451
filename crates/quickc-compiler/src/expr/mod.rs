//! Expression compiler.
//!
//! [`ExprCompiler`] type-checks an expression and emits its code in one walk.
//! Every compiled expression reports an [`ExprInfo`]: the type it leaves on
//! the stack, the offset its code starts at, and its value when that is known
//! at compile time. Constant subexpressions are folded as they are found, by
//! cutting their code back to `start` and pushing the folded value instead.
//!
//! Names are resolved lazily: an identifier or member access first becomes a
//! [`Resolved`] entity (a local, a field, a class, a method group, ...), and
//! only emits a load once the context asks for a value.

mod assignment;
mod binary;
mod calls;
mod identifiers;
mod literals;
mod ternary;
mod unary;

use quickc_core::{CompilationError, DataType, Span, Value};
use quickc_parser::ast::{Expr, UnaryOp};

use crate::bytecode::{EvalError, OpCode, eval};
use crate::context::CompilationContext;
use crate::conversion::{self, Conversion};
use crate::emit::BytecodeEmitter;
use crate::expr_info::ExprInfo;
use crate::function_compiler::MethodContext;
use crate::imports::ImportTable;
use crate::scope::LocalScope;

pub(crate) use binary::{BinaryPlan, plan_binary};
pub(crate) use identifiers::{CallTarget, FieldRef, Resolved};

type Result<T> = std::result::Result<T, CompilationError>;

/// Deepest recursion the expression walk allows before reporting the
/// expression as too complex.
pub const MAX_EXPRESSION_DEPTH: u32 = quickc_parser::MAX_NESTING;

/// Compiles expressions of one method body.
pub struct ExprCompiler<'a, 'ctx, 'pool> {
    ctx: &'a CompilationContext<'ctx>,
    emitter: &'a mut BytecodeEmitter<'pool>,
    imports: &'a mut ImportTable,
    locals: &'a LocalScope,
    method: &'a MethodContext,
    depth: u32,
}

impl<'a, 'ctx, 'pool> ExprCompiler<'a, 'ctx, 'pool> {
    pub fn new(
        ctx: &'a CompilationContext<'ctx>,
        emitter: &'a mut BytecodeEmitter<'pool>,
        imports: &'a mut ImportTable,
        locals: &'a LocalScope,
        method: &'a MethodContext,
    ) -> Self {
        Self {
            ctx,
            emitter,
            imports,
            locals,
            method,
            depth: 0,
        }
    }

    /// Compile an expression, leaving its value on the stack.
    pub fn compile(&mut self, expr: &Expr<'_>) -> Result<ExprInfo> {
        self.enter(expr.span())?;
        let result = self.compile_node(expr);
        self.depth -= 1;
        result
    }

    fn compile_node(&mut self, expr: &Expr<'_>) -> Result<ExprInfo> {
        match expr {
            Expr::Literal(lit) => Ok(self.compile_literal(lit)),
            Expr::Ident(_) | Expr::Member(_) | Expr::This(_) => {
                let resolved = self.resolve(expr)?;
                self.materialize(resolved, expr.span())
            }
            Expr::Binary(bin) => self.compile_binary(bin),
            Expr::Unary(un) => self.compile_unary(un),
            Expr::Postfix(post) => self.compile_postfix(post, false),
            Expr::Assign(assign) => self.compile_assign(assign, false),
            Expr::Ternary(ternary) => self.compile_ternary(ternary),
            Expr::Call(call) => self.compile_call(call),
            Expr::Paren(paren) => self.compile(paren.expr),
        }
    }

    /// Compile an expression and convert it to `expected`.
    pub fn check(&mut self, expr: &Expr<'_>, expected: DataType) -> Result<ExprInfo> {
        let info = self.compile(expr)?;
        self.coerce(info, expected, expr.span())
    }

    /// Compile an expression used as a statement, leaving nothing on the stack.
    ///
    /// Only assignments, calls and increments are allowed.
    pub fn compile_discarded(&mut self, expr: &Expr<'_>) -> Result<()> {
        match expr {
            Expr::Assign(assign) => self.compile_assign(assign, true).map(drop),
            Expr::Postfix(post) => self.compile_postfix(post, true).map(drop),
            Expr::Unary(un) if matches!(un.op, UnaryOp::PreInc | UnaryOp::PreDec) => {
                let increment = un.op == UnaryOp::PreInc;
                self.compile_inc_dec(un.operand, increment, true, true, un.span)
                    .map(drop)
            }
            Expr::Call(call) => {
                let info = self.compile_call(call)?;
                if !info.ty.is_void() {
                    self.emitter.emit(OpCode::Pop);
                }
                Ok(())
            }
            other => Err(CompilationError::InvalidStatement { span: other.span() }),
        }
    }

    /// Apply the implicit conversion from the value on top of the stack to `to`.
    pub fn coerce(&mut self, info: ExprInfo, to: DataType, span: Span) -> Result<ExprInfo> {
        let conversion =
            conversion::implicit(info.ty, to).ok_or_else(|| CompilationError::TypeMismatch {
                from: info.ty.name().to_string(),
                to: to.name().to_string(),
                span,
            })?;
        match conversion {
            Conversion::Identity => Ok(info),
            Conversion::Widen(op) => match info.constant.as_ref() {
                Some(value) => {
                    let converted = conversion::convert_constant(value, to).ok_or_else(|| {
                        CompilationError::TypeMismatch {
                            from: info.ty.name().to_string(),
                            to: to.name().to_string(),
                            span,
                        }
                    })?;
                    Ok(self.replace_with_constant(info.start, converted))
                }
                None => {
                    self.emitter.emit(op);
                    Ok(ExprInfo::rvalue(to, info.start))
                }
            },
        }
    }

    /// Apply a conversion instruction to an operand whose code ends at `end`,
    /// which may be earlier than the current offset.
    fn convert_operand(
        &mut self,
        info: ExprInfo,
        op: Option<OpCode>,
        to: DataType,
        end: usize,
        span: Span,
    ) -> Result<ExprInfo> {
        let Some(op) = op else {
            return Ok(info);
        };
        let constant = match &info.constant {
            Some(value) => Some(eval::unary(op, value, true).map_err(|e| fold_error(e, span))?),
            None => None,
        };
        if end == self.emitter.current_offset() {
            self.emitter.emit(op);
        } else {
            self.emitter.insert_op(end, op);
        }
        Ok(ExprInfo {
            ty: to,
            constant,
            start: info.start,
        })
    }

    /// Replace the code emitted since `start` with a push of `value`.
    fn replace_with_constant(&mut self, start: usize, value: Value) -> ExprInfo {
        self.emitter.truncate(start);
        self.emitter.emit_value(&value);
        ExprInfo::constant(value, start)
    }

    fn offset(&self) -> usize {
        self.emitter.current_offset()
    }

    /// Go one recursion level deeper, failing past [`MAX_EXPRESSION_DEPTH`].
    /// Every successful call is paired with `self.depth -= 1`.
    fn enter(&mut self, span: Span) -> Result<()> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return Err(CompilationError::ExpressionTooComplex { span });
        }
        self.depth += 1;
        Ok(())
    }
}

/// The compile-time error for a fault found while folding constants.
pub(crate) fn fold_error(err: EvalError, span: Span) -> CompilationError {
    match err {
        EvalError::Overflow => CompilationError::ConstantOverflow { span },
        EvalError::DivideByZero => CompilationError::DivisionByConstantZero { span },
        EvalError::TypeMismatch { op, operands } => CompilationError::Unsupported {
            feature: format!("folding {op} over {operands}"),
            span,
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Compile single expressions inside a throwaway class.

    use std::sync::Arc;

    use bumpalo::Bump;
    use quickc_core::{CompilationError, DataType, QualifiedName, Visibility};
    use quickc_parser::Parser;
    use quickc_parser::ast::{ClassMember, Item, MethodBody, Stmt};

    use super::ExprCompiler;
    use crate::bytecode::ConstantPool;
    use crate::context::{ClassSymbol, CompilationContext};
    use crate::emit::BytecodeEmitter;
    use crate::expr_info::ExprInfo;
    use crate::function_compiler::MethodContext;
    use crate::image::MethodKind;
    use crate::imports::ImportTable;
    use crate::options::CompilationOptions;
    use crate::scope::LocalScope;

    pub struct Compiled {
        pub info: Result<ExprInfo, CompilationError>,
        pub code: Vec<u8>,
        pub constants: ConstantPool,
    }

    /// Compile `expr` as the body of `void M()` in a class over System.Runtime,
    /// with `locals` declared as method locals.
    pub fn compile_expr(expr: &str, locals: &[(&str, DataType)]) -> Compiled {
        let arena = Bump::new();
        let source = format!("class T {{ void M() {{ {expr}; }} }}");
        let output = Parser::parse(&source, &arena).unwrap();
        assert!(output.errors.is_empty(), "{}", output.errors);
        let Item::Class(class) = output.script.items()[0] else {
            panic!("expected class");
        };
        let ClassMember::Method(method) = &class.members[0] else {
            panic!("expected method");
        };
        let MethodBody::Block(body) = method.body else {
            panic!("expected block body");
        };
        let Stmt::Expr(stmt) = body.stmts[0] else {
            panic!("expected expression statement");
        };

        let mut ctx = CompilationContext::new(
            CompilationOptions::default(),
            vec![Arc::new(quickc_modules::runtime::library())],
        );
        ctx.add_global_using("System".to_string());
        let _ = ctx.add_class(ClassSymbol {
            name: QualifiedName::global("T"),
            decl: class,
            visibility: Visibility::Internal,
            is_static: false,
            namespace: Vec::new(),
            usings: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        });

        let mut scope = LocalScope::new();
        for (name, ty) in locals {
            scope.declare(name, *ty, Default::default()).unwrap();
        }
        let method = MethodContext {
            class: 0,
            kind: MethodKind::Method,
            is_static: false,
            display_name: "T.M()".to_string(),
            return_type: DataType::Void,
        };
        let mut constants = ConstantPool::new();
        let mut imports = ImportTable::new();
        let (info, code) = {
            let mut emitter = BytecodeEmitter::new(&mut constants);
            let info = ExprCompiler::new(&ctx, &mut emitter, &mut imports, &scope, &method)
                .compile(stmt.expr);
            (info, emitter.code().to_vec())
        };
        Compiled {
            info,
            code,
            constants,
        }
    }

    pub fn error_code(expr: &str, locals: &[(&str, DataType)]) -> &'static str {
        match compile_expr(expr, locals).info {
            Ok(info) => panic!("expected an error for `{expr}`, got {info:?}"),
            Err(err) => err.code(),
        }
    }
}
