//! Compilation context: every class the module declares and every library
//! class it can reach, with namespace-aware name lookup.
//!
//! The registration pass fills the context; the compilation pass only reads
//! it. Script classes shadow library classes of the same qualified name.

use std::sync::Arc;

use quickc_core::{CompilationError, DataType, QualifiedName, Span, Visibility};
use quickc_modules::{Library, NativeClass};
use quickc_parser::ast::{
    ClassDecl, ConstructorDecl, Expr, Ident, MethodDecl, TypeExpr, TypeKind, UsingDirective,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::image::MethodKind;
use crate::options::CompilationOptions;

/// A class found by name.
#[derive(Debug, Clone, Copy)]
pub enum ClassRef<'a> {
    /// Index into [`CompilationContext::classes`].
    Script(usize),
    Native(&'a NativeClass),
}

#[derive(Debug, Clone)]
pub struct FieldSymbol<'ast> {
    pub name: String,
    pub ty: DataType,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    /// Module static slot for static fields, instance slot otherwise.
    pub slot: u16,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// Where a method's code comes from.
#[derive(Debug, Clone, Copy)]
pub enum MethodSource<'ast> {
    Method(&'ast MethodDecl<'ast>),
    Constructor(&'ast ConstructorDecl<'ast>),
    /// The public parameterless constructor of a class that declares none.
    ImplicitConstructor,
    /// Static field initializers.
    TypeInitializer,
}

#[derive(Debug, Clone)]
pub struct MethodSymbol<'ast> {
    /// Image name: the declared name, `.ctor` or `.cctor`.
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub params: Vec<DataType>,
    pub return_type: DataType,
    pub source: MethodSource<'ast>,
    pub span: Span,
}

impl MethodSymbol<'_> {
    pub fn is_invocable(&self) -> bool {
        self.kind == MethodKind::Method
    }
}

#[derive(Debug, Clone)]
pub struct ClassSymbol<'ast> {
    pub name: QualifiedName,
    pub decl: ClassDecl<'ast>,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Enclosing namespace, outermost first.
    pub namespace: Vec<String>,
    /// Namespaces imported by `using` directives in scope at the declaration.
    pub usings: Vec<String>,
    pub fields: Vec<FieldSymbol<'ast>>,
    pub methods: Vec<MethodSymbol<'ast>>,
}

impl<'ast> ClassSymbol<'ast> {
    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSymbol<'ast>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Invocable methods called `name`, with their positions.
    pub fn methods_named<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = (usize, &'s MethodSymbol<'ast>)> + 's {
        self.methods
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.is_invocable() && m.name == name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.field(name).is_some() || self.methods_named(name).next().is_some()
    }

    /// `Samples.Greeter.Greet(string)`; constructors as `Samples.Greeter.Greeter()`.
    pub fn method_display_name(&self, method: &MethodSymbol<'_>) -> String {
        let name = match method.kind {
            MethodKind::Method => method.name.as_str(),
            MethodKind::Constructor | MethodKind::TypeInitializer => self.simple_name(),
        };
        format!(
            "{}.{}({})",
            self.name,
            name,
            quickc_core::format_params(&method.params)
        )
    }

    pub fn instance_field_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.is_static).count()
    }
}

/// Everything the compilation pass needs to resolve names.
pub struct CompilationContext<'ast> {
    options: CompilationOptions,
    references: Vec<Arc<Library>>,
    pub(crate) classes: Vec<ClassSymbol<'ast>>,
    class_index: FxHashMap<String, usize>,
    namespaces: FxHashSet<String>,
    /// Option usings that name a known namespace.
    global_usings: Vec<String>,
    static_count: u16,
}

impl<'ast> CompilationContext<'ast> {
    pub fn new(options: CompilationOptions, references: Vec<Arc<Library>>) -> Self {
        let namespaces = references
            .iter()
            .flat_map(|lib| lib.namespaces().iter().cloned())
            .collect();
        Self {
            options,
            references,
            classes: Vec::new(),
            class_index: FxHashMap::default(),
            namespaces,
            global_usings: Vec::new(),
            static_count: 0,
        }
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn references(&self) -> &[Arc<Library>] {
        &self.references
    }

    pub fn classes(&self) -> &[ClassSymbol<'ast>] {
        &self.classes
    }

    pub fn class(&self, index: usize) -> &ClassSymbol<'ast> {
        &self.classes[index]
    }

    pub fn static_count(&self) -> u16 {
        self.static_count
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Declare a namespace and its parents.
    pub(crate) fn add_namespace(&mut self, path: &[String]) {
        for end in 1..=path.len() {
            self.namespaces.insert(path[..end].join("."));
        }
    }

    pub(crate) fn add_global_using(&mut self, namespace: String) {
        if !self.global_usings.contains(&namespace) {
            self.global_usings.push(namespace);
        }
    }

    /// Add a class, or return the index of the class already using its name.
    pub(crate) fn add_class(&mut self, class: ClassSymbol<'ast>) -> Result<usize, usize> {
        let key = class.name.to_string();
        if let Some(&existing) = self.class_index.get(&key) {
            return Err(existing);
        }
        self.classes.push(class);
        self.class_index.insert(key, self.classes.len() - 1);
        Ok(self.classes.len() - 1)
    }

    pub(crate) fn class_mut(&mut self, index: usize) -> &mut ClassSymbol<'ast> {
        &mut self.classes[index]
    }

    pub(crate) fn allocate_static(&mut self, span: Span) -> Result<u16, CompilationError> {
        let slot = self.static_count;
        self.static_count = slot.checked_add(1).ok_or_else(|| CompilationError::Unsupported {
            feature: "more than 65535 static fields in one module".to_string(),
            span,
        })?;
        Ok(slot)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    /// Find a class by fully-qualified name.
    pub fn find_class(&self, qualified: &str) -> Option<ClassRef<'_>> {
        if let Some(&index) = self.class_index.get(qualified) {
            return Some(ClassRef::Script(index));
        }
        self.references
            .iter()
            .find_map(|lib| lib.find_class(qualified))
            .map(ClassRef::Native)
    }

    /// The library class behind a keyword type (`string` is `System.String`).
    pub fn keyword_class(&self, ty: DataType) -> Option<&NativeClass> {
        self.references.iter().find_map(|lib| lib.keyword_class(ty))
    }

    /// Resolve a class name written inside `class`: first relative to each
    /// enclosing namespace, innermost first, then through the usings in
    /// scope. Usings only apply to single-segment names.
    pub fn lookup_class(&self, class: usize, path: &str) -> Option<ClassRef<'_>> {
        let symbol = &self.classes[class];
        for depth in (0..=symbol.namespace.len()).rev() {
            let candidate = qualify(&symbol.namespace[..depth], path);
            if let Some(found) = self.find_class(&candidate) {
                return Some(found);
            }
        }
        if path.contains('.') {
            return None;
        }
        symbol
            .usings
            .iter()
            .chain(&self.global_usings)
            .find_map(|using| self.find_class(&format!("{using}.{path}")))
    }

    /// Resolve a namespace name written inside `class`.
    pub fn lookup_namespace(&self, class: usize, path: &str) -> Option<String> {
        let symbol = &self.classes[class];
        (0..=symbol.namespace.len())
            .rev()
            .map(|depth| qualify(&symbol.namespace[..depth], path))
            .find(|candidate| self.is_namespace(candidate))
    }

    /// The data type named by a type expression. `var` is left to the caller.
    pub fn resolve_type(&self, class: usize, ty: &TypeExpr<'_>) -> Result<DataType, CompilationError> {
        match ty.kind {
            TypeKind::Primitive(data_type) => Ok(data_type),
            TypeKind::Var => Err(CompilationError::Unsupported {
                feature: "'var' outside a local variable declaration".to_string(),
                span: ty.span,
            }),
            TypeKind::Named(path) => {
                let name = dotted_names(path);
                let found = self.lookup_class(class, &name);
                match found {
                    Some(ClassRef::Native(NativeClass {
                        keyword: Some(keyword),
                        ..
                    })) => Ok(*keyword),
                    Some(_) => Err(CompilationError::Unsupported {
                        feature: format!("using the class '{name}' as a value type"),
                        span: ty.span,
                    }),
                    None => Err(CompilationError::UnknownType {
                        name,
                        span: ty.span,
                    }),
                }
            }
        }
    }

    /// Fully-qualified display name of a class reference.
    pub fn class_name(&self, class: ClassRef<'_>) -> String {
        match class {
            ClassRef::Script(index) => self.classes[index].name.to_string(),
            ClassRef::Native(native) => native.name.to_string(),
        }
    }
}

fn qualify(namespace: &[String], name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{name}", namespace.join("."))
    }
}

pub(crate) fn dotted_names(path: &[Ident<'_>]) -> String {
    quickc_parser::ast::dotted(path)
}

pub(crate) fn using_names(usings: &[UsingDirective<'_>]) -> Vec<String> {
    usings.iter().map(UsingDirective::dotted).collect()
}
