//! Local variable declarations.
//!
//! Each declarator's initializer is compiled before its name comes into
//! scope. A declarator without an initializer starts at the default value of
//! its type. `var` takes the type of its initializer.

use quickc_core::{CompilationError, DataType};
use quickc_parser::ast::{VarDeclStmt, VarDeclarator};

use super::StmtCompiler;

impl StmtCompiler<'_, '_, '_> {
    pub fn compile_var_decl(&mut self, decl: &VarDeclStmt<'_>) {
        let declared = if decl.ty.is_var() {
            if decl.vars.len() > 1 {
                self.diagnostics.push(CompilationError::Unsupported {
                    feature: "implicitly-typed variables with multiple declarators".to_string(),
                    span: decl.span,
                });
                return;
            }
            None
        } else {
            match self.ctx.resolve_type(self.method.class, &decl.ty) {
                Ok(DataType::Void) => {
                    self.diagnostics.push(CompilationError::Unsupported {
                        feature: "a local variable of type 'void'".to_string(),
                        span: decl.ty.span,
                    });
                    return;
                }
                Ok(ty) => Some(ty),
                Err(err) => {
                    self.diagnostics.push(err);
                    return;
                }
            }
        };

        for var in decl.vars {
            let result = self.compile_declarator(var, declared);
            self.report(result);
        }
    }

    fn compile_declarator(
        &mut self,
        var: &VarDeclarator<'_>,
        declared: Option<DataType>,
    ) -> Result<(), CompilationError> {
        let ty = match (declared, var.init) {
            (Some(ty), Some(init)) => {
                self.expr_compiler().check(init, ty)?;
                ty
            }
            (Some(ty), None) => {
                self.emitter.emit_value(&ty.default_value());
                ty
            }
            (None, Some(init)) => {
                let info = self.expr_compiler().compile(init)?;
                if info.ty.is_void() {
                    return Err(CompilationError::VoidImplicitLocal { span: var.span });
                }
                info.ty
            }
            (None, None) => {
                return Err(CompilationError::UninitializedImplicitLocal { span: var.span });
            }
        };
        let slot = self.locals.declare(var.name.name, ty, var.name.span)?;
        self.emitter.emit_set_local(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::DataType;

    use super::super::test_support::{codes, compile_body};
    use crate::bytecode::OpCode;
    use crate::options::CompilationOptions;

    fn op(op: OpCode) -> u8 {
        op as u8
    }

    #[test]
    fn uninitialized_locals_get_defaults() {
        let (body, diagnostics) = compile_body(DataType::Void, "bool b; string s;", CompilationOptions::default());
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(
            body.code,
            [
                op(OpCode::PushFalse),
                op(OpCode::SetLocal), 0, 0,
                op(OpCode::Constant), 0, 0,
                op(OpCode::SetLocal), 0, 1,
                op(OpCode::ReturnVoid),
            ]
        );
    }

    #[test]
    fn var_takes_the_initializer_type() {
        let (_, diagnostics) = compile_body(
            DataType::Long,
            "var x = 1L; return x;",
            CompilationOptions::default(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics}");

        let (_, diagnostics) = compile_body(DataType::Void, "var x;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0818"]);

        let (_, diagnostics) = compile_body(
            DataType::Void,
            "var x = Console.WriteLine(1);",
            CompilationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), ["QC0815"]);
    }

    #[test]
    fn redeclaration_and_self_reference() {
        let (_, diagnostics) = compile_body(DataType::Void, "int a = 1; int a = 2;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0128"]);

        let (_, diagnostics) = compile_body(DataType::Void, "int a = a;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0103"]);

        let (_, diagnostics) = compile_body(DataType::Void, "Missing m;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0246"]);
    }
}
