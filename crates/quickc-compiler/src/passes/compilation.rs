//! Compilation Pass (Pass 2) - type check member bodies and generate bytecode.
//!
//! Every method the registration pass declared gets its code here. Field
//! initializers are compiled once per class: the instance ones run at the
//! start of every constructor, the static ones form the type initializer.
//! All methods of the module share one constant pool and one import table.

use quickc_core::{Diagnostics, Span};

use crate::bytecode::{Constant, ConstantPool, OpCode};
use crate::context::{ClassSymbol, CompilationContext, MethodSource, MethodSymbol};
use crate::function_compiler::{CompiledBody, FunctionCompiler, MethodContext};
use crate::image::{ClassImage, FieldImage, MethodImage, MethodKind, NativeImport};
use crate::imports::ImportTable;

/// Output of the compilation pass.
#[derive(Debug, Default)]
pub struct CompilationOutput {
    pub classes: Vec<ClassImage>,
    pub constants: Vec<Constant>,
    pub imports: Vec<NativeImport>,
    pub diagnostics: Diagnostics,
}

/// Pass 2: compile every member body of the module.
pub struct CompilationPass<'a, 'ast> {
    ctx: &'a CompilationContext<'ast>,
    constants: ConstantPool,
    imports: ImportTable,
    diagnostics: Diagnostics,
}

impl<'a, 'ast> CompilationPass<'a, 'ast> {
    pub fn new(ctx: &'a CompilationContext<'ast>) -> Self {
        Self {
            ctx,
            constants: ConstantPool::new(),
            imports: ImportTable::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn run(mut self) -> CompilationOutput {
        #[cfg(feature = "profiling")]
        profiling::scope!("CompilationPass::run");

        let ctx = self.ctx;
        let classes = ctx
            .classes()
            .iter()
            .enumerate()
            .map(|(index, class)| self.compile_class(index, class))
            .collect();

        CompilationOutput {
            classes,
            constants: self.constants.into_vec(),
            imports: self.imports.into_vec(),
            diagnostics: self.diagnostics,
        }
    }

    fn compile_class(&mut self, index: usize, class: &ClassSymbol<'ast>) -> ClassImage {
        tracing::trace!(class = %class.name, "compiling class");

        let instance_init = self.field_initializers(index, class, false);
        let static_init = self.field_initializers(index, class, true);

        let methods = class
            .methods
            .iter()
            .map(|method| {
                let prologue = match method.kind {
                    MethodKind::Constructor => instance_init.as_slice(),
                    MethodKind::TypeInitializer => static_init.as_slice(),
                    MethodKind::Method => &[],
                };
                let body = self.compile_method(index, class, method, prologue);
                MethodImage {
                    name: method.name.clone(),
                    kind: method.kind,
                    visibility: method.visibility,
                    is_static: method.is_static,
                    params: method.params.clone(),
                    return_type: method.return_type,
                    locals: body.locals,
                    code: body.code,
                }
            })
            .collect();

        let fields = class
            .fields
            .iter()
            .map(|field| FieldImage {
                name: field.name.clone(),
                ty: field.ty,
                visibility: field.visibility,
                is_static: field.is_static,
                is_readonly: field.is_readonly,
                slot: field.slot,
            })
            .collect();

        ClassImage {
            name: class.name.to_string(),
            visibility: class.visibility,
            fields,
            methods,
        }
    }

    /// Code storing the initializer of every instance (or static) field that
    /// has one, in declaration order.
    ///
    /// Initializers see no `this`, as they run before the constructor body.
    fn field_initializers(&mut self, index: usize, class: &ClassSymbol<'ast>, statics: bool) -> Vec<u8> {
        let (kind, store) = if statics {
            (MethodKind::TypeInitializer, OpCode::SetStatic)
        } else {
            (MethodKind::Constructor, OpCode::SetField)
        };
        let method = MethodContext {
            class: index,
            kind,
            is_static: true,
            display_name: format!("{}.{}()", class.name, class.simple_name()),
            return_type: quickc_core::DataType::Void,
        };

        let mut compiler = FunctionCompiler::new(self.ctx, &mut self.constants, &mut self.imports, method);
        for field in class.fields.iter().filter(|f| f.is_static == statics) {
            if let Some(init) = field.init {
                if compiler.compile_value(init, field.ty) {
                    compiler.emit_u16(store, field.slot);
                }
            }
        }
        let (body, diagnostics) = compiler.finish(class.decl.name.span);
        self.diagnostics.extend(diagnostics);
        body.code
    }

    fn compile_method(
        &mut self,
        index: usize,
        class: &ClassSymbol<'ast>,
        method: &MethodSymbol<'ast>,
        prologue: &[u8],
    ) -> CompiledBody {
        let context = MethodContext {
            class: index,
            kind: method.kind,
            is_static: method.is_static,
            display_name: class.method_display_name(method),
            return_type: method.return_type,
        };
        let mut compiler = FunctionCompiler::new(self.ctx, &mut self.constants, &mut self.imports, context);

        let span: Span = match method.source {
            MethodSource::Method(decl) => {
                for (param, &ty) in decl.params.iter().zip(&method.params) {
                    compiler.declare_param(param.name.name, ty, param.name.span);
                }
                compiler.compile_body(&decl.body, decl.name.span);
                decl.span
            }
            MethodSource::Constructor(decl) => {
                for (param, &ty) in decl.params.iter().zip(&method.params) {
                    compiler.declare_param(param.name.name, ty, param.name.span);
                }
                compiler.append(prologue);
                compiler.compile_body(&decl.body, decl.name.span);
                decl.span
            }
            MethodSource::ImplicitConstructor | MethodSource::TypeInitializer => {
                compiler.append(prologue);
                compiler.emit(OpCode::ReturnVoid);
                method.span
            }
        };

        let (body, diagnostics) = compiler.finish(span);
        self.diagnostics.extend(diagnostics);
        body
    }
}
