//! Registration Pass (Pass 1) - declare everything a member body can name.
//!
//! This pass walks the script and fills the [`CompilationContext`] with the
//! module's namespaces, classes and member signatures. It compiles no code,
//! so member bodies may refer to classes and members declared after them.
//!
//! ## Responsibilities
//!
//! - Declare the namespaces the script introduces
//! - Validate source `using` directives and apply the option usings
//! - Register classes, rejecting duplicate qualified names
//! - Register fields with their slots, and methods and constructors with
//!   resolved signatures
//! - Synthesize the implicit constructor and the type initializer

use quickc_core::{
    CompilationError, DataType, Diagnostic, Diagnostics, QualifiedName, Span, Visibility,
};
use quickc_parser::ast::{
    ClassMember, ConstructorDecl, FieldDecl, Item, MethodDecl, Param, Script, UsingDirective,
};

use crate::context::{
    ClassSymbol, CompilationContext, FieldSymbol, MethodSource, MethodSymbol, using_names,
};
use crate::image::MethodKind;

/// Code of the warning for an option using that names no known namespace.
pub const UNKNOWN_GLOBAL_USING: &str = "QC8019";

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput {
    pub classes_registered: usize,
    pub fields_registered: usize,
    /// Includes constructors and type initializers.
    pub methods_registered: usize,
    /// Collected diagnostics (registration continues past errors).
    pub diagnostics: Diagnostics,
}

/// Members of the class being registered.
struct ClassMembers<'ast> {
    index: usize,
    simple_name: String,
    display_name: String,
    is_static: bool,
    fields: Vec<FieldSymbol<'ast>>,
    methods: Vec<MethodSymbol<'ast>>,
    instance_slots: u16,
}

impl ClassMembers<'_> {
    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m.kind == MethodKind::Method && m.name == name)
    }

    fn has_signature(&self, kind: MethodKind, name: &str, params: &[DataType]) -> bool {
        self.methods
            .iter()
            .any(|m| m.kind == kind && m.name == name && m.params == params)
    }
}

/// Pass 1: register namespaces, classes and member signatures.
pub struct RegistrationPass<'a, 'ast> {
    ctx: &'a mut CompilationContext<'ast>,
    output: RegistrationOutput,
}

impl<'a, 'ast> RegistrationPass<'a, 'ast> {
    pub fn new(ctx: &'a mut CompilationContext<'ast>) -> Self {
        Self {
            ctx,
            output: RegistrationOutput::default(),
        }
    }

    pub fn run(mut self, script: &Script<'ast>) -> RegistrationOutput {
        #[cfg(feature = "profiling")]
        profiling::scope!("RegistrationPass::run");

        self.declare_namespaces(script.items(), &mut Vec::new());
        self.apply_global_usings();
        self.check_usings(script.usings());
        self.check_nested_usings(script.items());

        let first = self.ctx.classes().len();
        self.register_classes(script);
        for index in first..self.ctx.classes().len() {
            self.register_members(index);
        }

        tracing::trace!(
            classes = self.output.classes_registered,
            fields = self.output.fields_registered,
            methods = self.output.methods_registered,
            "registration finished"
        );
        self.output
    }

    // =========================================================================
    // Namespaces and usings
    // =========================================================================

    fn declare_namespaces(&mut self, items: &[Item<'_>], path: &mut Vec<String>) {
        for item in items {
            if let Item::Namespace(ns) = item {
                let depth = path.len();
                path.extend(ns.path.iter().map(|ident| ident.name.to_string()));
                self.ctx.add_namespace(path);
                self.declare_namespaces(ns.items, path);
                path.truncate(depth);
            }
        }
    }

    fn apply_global_usings(&mut self) {
        let usings = self.ctx.options().usings.clone();
        for using in usings {
            if self.ctx.is_namespace(&using) {
                self.ctx.add_global_using(using);
            } else {
                self.output.diagnostics.push(Diagnostic::warning(
                    UNKNOWN_GLOBAL_USING,
                    format!("the global using '{using}' names no known namespace and is ignored"),
                    Span::default(),
                ));
            }
        }
    }

    fn check_usings(&mut self, usings: &[UsingDirective<'_>]) {
        for using in usings {
            let name = using.dotted();
            if !self.ctx.is_namespace(&name) {
                self.output
                    .diagnostics
                    .push(CompilationError::UnknownType { name, span: using.span });
            }
        }
    }

    fn check_nested_usings(&mut self, items: &[Item<'_>]) {
        for item in items {
            if let Item::Namespace(ns) = item {
                self.check_usings(ns.usings);
                self.check_nested_usings(ns.items);
            }
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn register_classes(&mut self, script: &Script<'ast>) {
        let mut found = Vec::new();
        script.for_each_class(|namespace, usings, decl| {
            let namespace: Vec<String> = namespace.iter().map(|i| i.name.to_string()).collect();
            found.push((namespace, using_names(usings), *decl));
        });

        for (namespace, usings, decl) in found {
            let namespace_display = if namespace.is_empty() {
                "<global namespace>".to_string()
            } else {
                namespace.join(".")
            };
            let symbol = ClassSymbol {
                name: QualifiedName::new(decl.name.name, namespace.clone()),
                decl,
                visibility: decl.modifiers.visibility_or(Visibility::Internal),
                is_static: decl.modifiers.is_static,
                namespace,
                usings,
                fields: Vec::new(),
                methods: Vec::new(),
            };
            match self.ctx.add_class(symbol) {
                Ok(_) => self.output.classes_registered += 1,
                Err(_) => self.output.diagnostics.push(CompilationError::DuplicateType {
                    namespace: namespace_display,
                    name: decl.name.name.to_string(),
                    span: decl.name.span,
                }),
            }
        }
    }

    fn register_members(&mut self, index: usize) {
        let symbol = self.ctx.class(index);
        let decl = symbol.decl;
        let mut members = ClassMembers {
            index,
            simple_name: symbol.simple_name().to_string(),
            display_name: symbol.name.to_string(),
            is_static: symbol.is_static,
            fields: Vec::new(),
            methods: Vec::new(),
            instance_slots: 0,
        };

        for member in decl.members {
            match member {
                ClassMember::Field(field) => self.register_field(&mut members, field),
                ClassMember::Method(method) => self.register_method(&mut members, method),
                ClassMember::Constructor(ctor) => self.register_constructor(&mut members, ctor),
            }
        }

        let has_constructor = members
            .methods
            .iter()
            .any(|m| m.kind == MethodKind::Constructor);
        if !has_constructor && !members.is_static {
            members.methods.push(MethodSymbol {
                name: ".ctor".to_string(),
                kind: MethodKind::Constructor,
                visibility: Visibility::Public,
                is_static: false,
                params: Vec::new(),
                return_type: DataType::Void,
                source: MethodSource::ImplicitConstructor,
                span: decl.name.span,
            });
        }
        if members.fields.iter().any(|f| f.is_static && f.init.is_some()) {
            members.methods.push(MethodSymbol {
                name: ".cctor".to_string(),
                kind: MethodKind::TypeInitializer,
                visibility: Visibility::Private,
                is_static: true,
                params: Vec::new(),
                return_type: DataType::Void,
                source: MethodSource::TypeInitializer,
                span: decl.name.span,
            });
        }

        self.output.fields_registered += members.fields.len();
        self.output.methods_registered += members.methods.len();
        let class = self.ctx.class_mut(index);
        class.fields = members.fields;
        class.methods = members.methods;
    }

    fn register_field(&mut self, class: &mut ClassMembers<'ast>, field: &'ast FieldDecl<'ast>) {
        let ty = match self.ctx.resolve_type(class.index, &field.ty) {
            Ok(ty) => ty,
            Err(err) => return self.output.diagnostics.push(err),
        };
        if ty.is_void() {
            return self.output.diagnostics.push(CompilationError::VoidField {
                type_name: class.display_name.clone(),
                span: field.ty.span,
            });
        }
        let modifiers = field.modifiers;
        if class.is_static && !modifiers.is_static {
            return self.output.diagnostics.push(CompilationError::InstanceMemberInStaticClass {
                type_name: class.display_name.clone(),
                span: field.span,
            });
        }

        for var in field.vars {
            let name = var.name.name;
            if name == class.simple_name {
                self.output.diagnostics.push(CompilationError::MemberNamedLikeType {
                    name: name.to_string(),
                    span: var.name.span,
                });
                continue;
            }
            if class.has_field(name) || class.has_method(name) {
                self.output.diagnostics.push(CompilationError::DuplicateDefinition {
                    type_name: class.display_name.clone(),
                    member: name.to_string(),
                    span: var.name.span,
                });
                continue;
            }

            let slot = if modifiers.is_static {
                self.ctx.allocate_static(var.span)
            } else {
                let slot = class.instance_slots;
                match slot.checked_add(1) {
                    Some(next) => {
                        class.instance_slots = next;
                        Ok(slot)
                    }
                    None => Err(CompilationError::Unsupported {
                        feature: "more than 65535 fields in one class".to_string(),
                        span: var.span,
                    }),
                }
            };
            let slot = match slot {
                Ok(slot) => slot,
                Err(err) => {
                    self.output.diagnostics.push(err);
                    continue;
                }
            };

            class.fields.push(FieldSymbol {
                name: name.to_string(),
                ty,
                visibility: modifiers.visibility_or(Visibility::Private),
                is_static: modifiers.is_static,
                is_readonly: modifiers.is_readonly,
                slot,
                init: var.init,
                span: var.name.span,
            });
        }
    }

    fn register_method(&mut self, class: &mut ClassMembers<'ast>, method: &'ast MethodDecl<'ast>) {
        let return_type = self.ctx.resolve_type(class.index, &method.return_type);
        let params = self.param_types(class.index, method.params);
        let return_type = match return_type {
            Ok(ty) => ty,
            Err(err) => return self.output.diagnostics.push(err),
        };
        let Some(params) = params else {
            return;
        };

        let modifiers = method.modifiers;
        let name = method.name.name;
        let error = if class.is_static && !modifiers.is_static {
            Some(CompilationError::InstanceMemberInStaticClass {
                type_name: class.display_name.clone(),
                span: method.name.span,
            })
        } else if name == class.simple_name {
            Some(CompilationError::MemberNamedLikeType {
                name: name.to_string(),
                span: method.name.span,
            })
        } else if class.has_field(name) {
            Some(CompilationError::DuplicateDefinition {
                type_name: class.display_name.clone(),
                member: name.to_string(),
                span: method.name.span,
            })
        } else if class.has_signature(MethodKind::Method, name, &params) {
            Some(CompilationError::DuplicateMember {
                type_name: class.display_name.clone(),
                member: name.to_string(),
                span: method.name.span,
            })
        } else {
            None
        };
        if let Some(err) = error {
            return self.output.diagnostics.push(err);
        }

        class.methods.push(MethodSymbol {
            name: name.to_string(),
            kind: MethodKind::Method,
            visibility: modifiers.visibility_or(Visibility::Private),
            is_static: modifiers.is_static,
            params,
            return_type,
            source: MethodSource::Method(method),
            span: method.name.span,
        });
    }

    fn register_constructor(
        &mut self,
        class: &mut ClassMembers<'ast>,
        ctor: &'ast ConstructorDecl<'ast>,
    ) {
        let Some(params) = self.param_types(class.index, ctor.params) else {
            return;
        };

        let error = if ctor.modifiers.is_static {
            Some(CompilationError::Unsupported {
                feature: "static constructors".to_string(),
                span: ctor.name.span,
            })
        } else if class.is_static {
            Some(CompilationError::InstanceMemberInStaticClass {
                type_name: class.display_name.clone(),
                span: ctor.name.span,
            })
        } else if class.has_signature(MethodKind::Constructor, ".ctor", &params) {
            Some(CompilationError::DuplicateMember {
                type_name: class.display_name.clone(),
                member: class.simple_name.clone(),
                span: ctor.name.span,
            })
        } else {
            None
        };
        if let Some(err) = error {
            return self.output.diagnostics.push(err);
        }

        class.methods.push(MethodSymbol {
            name: ".ctor".to_string(),
            kind: MethodKind::Constructor,
            visibility: ctor.modifiers.visibility_or(Visibility::Private),
            is_static: false,
            params,
            return_type: DataType::Void,
            source: MethodSource::Constructor(ctor),
            span: ctor.name.span,
        });
    }

    /// Resolve parameter types, reporting every bad one.
    fn param_types(&mut self, class: usize, params: &[Param<'_>]) -> Option<Vec<DataType>> {
        let mut types = Vec::with_capacity(params.len());
        let mut ok = true;
        for param in params {
            match self.ctx.resolve_type(class, &param.ty) {
                Ok(ty) if ty.is_void() => {
                    ok = false;
                    self.output.diagnostics.push(CompilationError::Unsupported {
                        feature: "a 'void' parameter".to_string(),
                        span: param.ty.span,
                    });
                }
                Ok(ty) => types.push(ty),
                Err(err) => {
                    ok = false;
                    self.output.diagnostics.push(err);
                }
            }
        }
        ok.then_some(types)
    }
}
