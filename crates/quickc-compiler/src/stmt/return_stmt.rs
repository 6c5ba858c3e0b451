//! Return statements.

use quickc_core::CompilationError;
use quickc_parser::ast::ReturnStmt;

use super::StmtCompiler;
use crate::bytecode::OpCode;

impl StmtCompiler<'_, '_, '_> {
    pub fn compile_return(&mut self, ret: &ReturnStmt<'_>) {
        let return_type = self.method.return_type;
        match ret.value {
            Some(_) if return_type.is_void() => {
                self.diagnostics.push(CompilationError::VoidReturnsValue {
                    method: self.method.display_name.clone(),
                    span: ret.span,
                });
            }
            Some(value) => {
                let result = self.expr_compiler().check(value, return_type);
                match result {
                    Ok(_) => self.emitter.emit(OpCode::Return),
                    Err(err) => self.diagnostics.push(err),
                }
            }
            None if return_type.is_void() => self.emitter.emit(OpCode::ReturnVoid),
            None => self.diagnostics.push(CompilationError::MissingReturnValue {
                expected: return_type.name().to_string(),
                span: ret.span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::DataType;

    use super::super::test_support::{codes, compile_body};
    use crate::bytecode::OpCode;
    use crate::options::CompilationOptions;

    #[test]
    fn return_values_convert_to_the_return_type() {
        let (body, diagnostics) = compile_body(DataType::Double, "return 2;", CompilationOptions::default());
        assert!(diagnostics.is_empty(), "{diagnostics}");
        assert_eq!(body.code, [OpCode::Constant as u8, 0, 1, OpCode::Return as u8]);
    }

    #[test]
    fn return_shape_must_match_the_method() {
        let (_, diagnostics) = compile_body(DataType::Void, "return 1;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0127"]);

        let (_, diagnostics) = compile_body(DataType::Int, "return;", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0126"]);

        let (_, diagnostics) = compile_body(DataType::Int, "return \"x\";", CompilationOptions::default());
        assert_eq!(codes(&diagnostics), ["QC0029"]);
    }
}
