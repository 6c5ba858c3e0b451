//! Compiles one method body to bytecode.
//!
//! [`FunctionCompiler`] owns the method's emitter and locals. Parameters take
//! the first local slots. A block body must not fall off its end unless the
//! method returns void, in which case a `RETURN_VOID` is appended. Errors in
//! individual statements are collected so one bad statement does not hide
//! the rest of the method's diagnostics.

use quickc_core::{CompilationError, DataType, Diagnostics, Span};
use quickc_parser::ast::{Expr, MethodBody};

use crate::bytecode::{ConstantPool, OpCode};
use crate::context::CompilationContext;
use crate::emit::BytecodeEmitter;
use crate::expr::ExprCompiler;
use crate::image::MethodKind;
use crate::imports::ImportTable;
use crate::scope::LocalScope;
use crate::stmt::StmtCompiler;

/// The method a body belongs to, as far as name resolution cares.
#[derive(Debug, Clone)]
pub struct MethodContext {
    pub class: usize,
    pub kind: MethodKind,
    /// No `this`: instance members are out of reach.
    pub is_static: bool,
    /// `Samples.Greeter.Greet(string)`, for diagnostics.
    pub display_name: String,
    pub return_type: DataType,
}

/// Code and frame size of a compiled body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledBody {
    pub code: Vec<u8>,
    pub locals: u16,
}

pub struct FunctionCompiler<'a, 'ctx, 'pool> {
    ctx: &'a CompilationContext<'ctx>,
    emitter: BytecodeEmitter<'pool>,
    imports: &'a mut ImportTable,
    locals: LocalScope,
    diagnostics: Diagnostics,
    method: MethodContext,
}

impl<'a, 'ctx, 'pool> FunctionCompiler<'a, 'ctx, 'pool> {
    pub fn new(
        ctx: &'a CompilationContext<'ctx>,
        constants: &'pool mut ConstantPool,
        imports: &'a mut ImportTable,
        method: MethodContext,
    ) -> Self {
        Self {
            ctx,
            emitter: BytecodeEmitter::new(constants),
            imports,
            locals: LocalScope::new(),
            diagnostics: Diagnostics::new(),
            method,
        }
    }

    pub fn declare_param(&mut self, name: &str, ty: DataType, span: Span) {
        if let Err(err) = self.locals.declare(name, ty, span) {
            self.diagnostics.push(err);
        }
    }

    /// Splice in code compiled elsewhere (field initializers).
    pub fn append(&mut self, code: &[u8]) {
        self.emitter.append(code);
    }

    pub fn emit(&mut self, op: OpCode) {
        self.emitter.emit(op);
    }

    pub fn emit_u16(&mut self, op: OpCode, operand: u16) {
        self.emitter.emit_u16(op, operand);
    }

    /// Compile `expr` converted to `ty`, leaving it on the stack.
    pub fn compile_value(&mut self, expr: &Expr<'_>, ty: DataType) -> bool {
        let result = self.expr_compiler().check(expr, ty);
        match result {
            Ok(_) => true,
            Err(err) => {
                self.diagnostics.push(err);
                false
            }
        }
    }

    /// Compile a method body. `name_span` is where a missing return is reported.
    pub fn compile_body(&mut self, body: &MethodBody<'_>, name_span: Span) {
        #[cfg(feature = "profiling")]
        profiling::scope!("FunctionCompiler::compile_body");

        let return_type = self.method.return_type;
        match body {
            MethodBody::Block(block) => {
                let completes = self.stmt_compiler().compile_block(block, true);
                if completes {
                    if return_type.is_void() {
                        self.emitter.emit(OpCode::ReturnVoid);
                    } else {
                        self.diagnostics.push(CompilationError::NotAllPathsReturn {
                            method: self.method.display_name.clone(),
                            span: name_span,
                        });
                    }
                }
            }
            MethodBody::Expr(expr) if return_type.is_void() => {
                let result = self.expr_compiler().compile_discarded(expr);
                match result {
                    Ok(()) => self.emitter.emit(OpCode::ReturnVoid),
                    Err(err) => self.diagnostics.push(err),
                }
            }
            MethodBody::Expr(expr) => {
                if self.compile_value(expr, return_type) {
                    self.emitter.emit(OpCode::Return);
                }
            }
        }
    }

    pub fn finish(mut self, span: Span) -> (CompiledBody, Diagnostics) {
        let locals = self.locals.frame_size();
        let code = match self.emitter.finish() {
            Ok(chunk) => chunk.into_code(),
            Err(err) => {
                self.diagnostics.push(CompilationError::Unsupported {
                    feature: format!("'{}': {err}", self.method.display_name),
                    span,
                });
                Vec::new()
            }
        };
        (CompiledBody { code, locals }, self.diagnostics)
    }

    fn expr_compiler(&mut self) -> ExprCompiler<'_, 'ctx, 'pool> {
        ExprCompiler::new(
            self.ctx,
            &mut self.emitter,
            self.imports,
            &self.locals,
            &self.method,
        )
    }

    fn stmt_compiler(&mut self) -> StmtCompiler<'_, 'ctx, 'pool> {
        StmtCompiler::new(
            self.ctx,
            &mut self.emitter,
            self.imports,
            &mut self.locals,
            &mut self.diagnostics,
            &self.method,
        )
    }
}
