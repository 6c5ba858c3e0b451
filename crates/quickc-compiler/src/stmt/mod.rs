//! Statement compiler.
//!
//! [`StmtCompiler`] emits the code of a method body statement by statement
//! and tracks reachability as it goes. Every `compile_*` method is told
//! whether its statement can be reached and answers whether control can
//! reach the statement's end point. The answers drive the unreachable-code
//! warning and the missing-return check, and let release builds drop code
//! that can never run.
//!
//! Errors inside a statement are recorded and compilation moves on to the
//! next statement.

mod block;
mod do_while_stmt;
mod for_stmt;
mod if_stmt;
mod return_stmt;
mod var_decl;
mod while_stmt;

use quickc_core::{CompilationError, DataType, Diagnostic, Diagnostics, Span, Value};
use quickc_parser::ast::{Expr, Stmt};

use crate::context::CompilationContext;
use crate::emit::BytecodeEmitter;
use crate::expr::ExprCompiler;
use crate::function_compiler::MethodContext;
use crate::imports::ImportTable;
use crate::scope::LocalScope;

/// Code of the unreachable-code warning.
pub const UNREACHABLE_CODE: &str = "QC0162";

pub struct StmtCompiler<'a, 'ctx, 'pool> {
    ctx: &'a CompilationContext<'ctx>,
    emitter: &'a mut BytecodeEmitter<'pool>,
    imports: &'a mut ImportTable,
    locals: &'a mut LocalScope,
    diagnostics: &'a mut Diagnostics,
    method: &'a MethodContext,
}

impl<'a, 'ctx, 'pool> StmtCompiler<'a, 'ctx, 'pool> {
    pub fn new(
        ctx: &'a CompilationContext<'ctx>,
        emitter: &'a mut BytecodeEmitter<'pool>,
        imports: &'a mut ImportTable,
        locals: &'a mut LocalScope,
        diagnostics: &'a mut Diagnostics,
        method: &'a MethodContext,
    ) -> Self {
        Self {
            ctx,
            emitter,
            imports,
            locals,
            diagnostics,
            method,
        }
    }

    /// Compile one statement. Returns whether its end point is reachable.
    pub fn compile_stmt(&mut self, stmt: &Stmt<'_>, reachable: bool) -> bool {
        match stmt {
            Stmt::Block(block) => self.compile_block(block, reachable),
            Stmt::VarDecl(decl) => {
                self.compile_var_decl(decl);
                reachable
            }
            Stmt::Expr(expr) => {
                let result = self.expr_compiler().compile_discarded(expr.expr);
                self.report(result);
                reachable
            }
            Stmt::If(if_stmt) => self.compile_if(if_stmt, reachable),
            Stmt::While(while_stmt) => self.compile_while(while_stmt, reachable),
            Stmt::DoWhile(do_while) => self.compile_do_while(do_while, reachable),
            Stmt::For(for_stmt) => self.compile_for(for_stmt, reachable),
            Stmt::Return(ret) => {
                self.compile_return(ret);
                false
            }
            Stmt::Break(span) => {
                let result = self.emitter.emit_break(reachable);
                self.report(result.map_err(|_| CompilationError::NoEnclosingLoop { span: *span }));
                false
            }
            Stmt::Continue(span) => {
                let result = self.emitter.emit_continue(reachable);
                self.report(result.map_err(|_| CompilationError::NoEnclosingLoop { span: *span }));
                false
            }
            Stmt::Empty(_) => reachable,
        }
    }

    /// Compile a statement nested in one whose reachability is `parent`.
    ///
    /// The unreachable-code warning goes to the first statement that turns
    /// unreachable while its parent was still reachable. Release builds drop
    /// the code of unreachable statements.
    pub(crate) fn compile_nested(&mut self, stmt: &Stmt<'_>, reachable: bool, parent: bool) -> bool {
        if parent && !reachable {
            if let Some(span) = first_statement(stmt) {
                self.diagnostics.push(Diagnostic::warning(
                    UNREACHABLE_CODE,
                    "unreachable code detected",
                    span,
                ));
            }
        }
        let start = self.emitter.current_offset();
        let end = self.compile_stmt(stmt, reachable);
        if !reachable && self.ctx.options().is_release() {
            self.emitter.truncate(start);
        }
        end
    }

    /// Compile a loop or `if` condition. Returns its value when it is a
    /// constant, along with the offset its code starts at.
    fn condition(&mut self, expr: &Expr<'_>) -> (Option<bool>, usize) {
        let start = self.emitter.current_offset();
        let result = self.expr_compiler().check(expr, DataType::Bool);
        let constant = match result {
            Ok(info) => info.constant.as_ref().and_then(Value::as_bool),
            Err(err) => {
                self.diagnostics.push(err);
                None
            }
        };
        (constant, start)
    }

    fn report(&mut self, result: Result<(), CompilationError>) {
        if let Err(err) = result {
            self.diagnostics.push(err);
        }
    }

    fn expr_compiler(&mut self) -> ExprCompiler<'_, 'ctx, 'pool> {
        ExprCompiler::new(self.ctx, self.emitter, self.imports, self.locals, self.method)
    }
}

/// Where the unreachable-code warning for `stmt` goes: the statement itself,
/// or the first statement inside it for blocks. Empty statements never warn.
fn first_statement(stmt: &Stmt<'_>) -> Option<Span> {
    match stmt {
        Stmt::Empty(_) => None,
        Stmt::Block(block) => block.stmts.iter().find_map(first_statement),
        other => Some(other.span()),
    }
}
