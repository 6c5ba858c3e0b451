//! Reference library metadata and the builder used to populate it.
//!
//! A [`Library`] is a named set of namespaces. Each namespace holds static
//! [`NativeClass`]es whose functions are implemented in Rust and called by
//! compiled code through their [`TypeHash`].
//!
//! ```
//! use quickc_core::{CallContext, DataType, NativeError};
//! use quickc_modules::Library;
//!
//! fn twice(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
//!     let x = ctx.arg_int(0)?;
//!     ctx.set_return(x.checked_mul(2).ok_or(NativeError::Overflow)?);
//!     Ok(())
//! }
//!
//! let mut lib = Library::new("Samples.Runtime");
//! lib.class("Samples", "Numbers")
//!     .function("Twice", &[DataType::Int], DataType::Int, twice)
//!     .constant("Answer", 42);
//!
//! let class = lib.find_class("Samples.Numbers").unwrap();
//! assert_eq!(class.functions_named("Twice").count(), 1);
//! assert!(lib.provides_namespace("Samples"));
//! ```

use quickc_core::{CallContext, DataType, NativeError, NativeFn, QualifiedName, TypeHash, Value};
use rustc_hash::FxHashMap;

/// A function exposed by a native class.
#[derive(Debug, Clone)]
pub struct NativeFunction {
    /// Fully-qualified name of the owning class.
    pub class: QualifiedName,
    pub name: String,
    /// Declared parameters, excluding the receiver of instance methods.
    pub params: Vec<DataType>,
    pub return_type: DataType,
    /// Instance methods receive the value they are called on as argument 0.
    pub is_instance: bool,
    pub hash: TypeHash,
    pub func: NativeFn,
}

impl NativeFunction {
    /// `System.Console.WriteLine`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }

    /// `System.Console.WriteLine(string)`
    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.qualified_name(),
            quickc_core::format_params(&self.params)
        )
    }

    /// Arguments the VM passes, receiver included.
    pub fn arity(&self) -> usize {
        self.params.len() + usize::from(self.is_instance)
    }

    /// Identity of a static function.
    pub fn static_hash(class: &QualifiedName, name: &str, params: &[DataType]) -> TypeHash {
        let params: Vec<TypeHash> = params.iter().map(|p| p.type_hash()).collect();
        TypeHash::from_function(&format!("{class}.{name}"), &params)
    }

    /// Identity of an instance method.
    pub fn instance_hash(class: &QualifiedName, name: &str, params: &[DataType]) -> TypeHash {
        let params: Vec<TypeHash> = params.iter().map(|p| p.type_hash()).collect();
        TypeHash::from_method(TypeHash::from_name(&class.to_string()), name, &params)
    }
}

/// A named compile-time constant (`System.Int32.MaxValue`).
#[derive(Debug, Clone, PartialEq)]
pub struct NativeConstant {
    pub name: String,
    pub value: Value,
}

/// A static class inside a library namespace.
#[derive(Debug, Clone)]
pub struct NativeClass {
    pub name: QualifiedName,
    /// The keyword type this class stands for (`System.Int32` is `int`).
    pub keyword: Option<DataType>,
    functions: Vec<NativeFunction>,
    constants: Vec<NativeConstant>,
}

impl NativeClass {
    fn new(name: QualifiedName) -> Self {
        Self {
            name,
            keyword: None,
            functions: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn functions(&self) -> &[NativeFunction] {
        &self.functions
    }

    /// Static overloads of `name`, in registration order.
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a NativeFunction> {
        self.functions
            .iter()
            .filter(move |f| !f.is_instance && f.name == name)
    }

    /// Instance overloads of `name`, in registration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a NativeFunction> {
        self.functions
            .iter()
            .filter(move |f| f.is_instance && f.name == name)
    }

    pub fn constant(&self, name: &str) -> Option<&NativeConstant> {
        self.constants.iter().find(|c| c.name == name)
    }

    pub fn constants(&self) -> &[NativeConstant] {
        &self.constants
    }
}

/// A named reference library.
#[derive(Debug, Clone)]
pub struct Library {
    name: String,
    namespaces: Vec<String>,
    classes: Vec<NativeClass>,
    class_index: FxHashMap<String, usize>,
    function_index: FxHashMap<TypeHash, (usize, usize)>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            classes: Vec::new(),
            class_index: FxHashMap::default(),
            function_index: FxHashMap::default(),
        }
    }

    /// Identifier used to reference this library (`System.Runtime`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a namespace, along with its parent namespaces.
    pub fn namespace(&mut self, namespace: &str) -> &mut Self {
        let mut prefix = String::new();
        for segment in namespace.split('.').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            if !self.namespaces.iter().any(|n| *n == prefix) {
                self.namespaces.push(prefix.clone());
            }
        }
        self
    }

    /// Start (or continue) registering a class in `namespace`.
    pub fn class(&mut self, namespace: &str, name: &str) -> ClassBuilder<'_> {
        self.namespace(namespace);
        let qualified = if namespace.is_empty() {
            QualifiedName::global(name)
        } else {
            QualifiedName::from_dotted(namespace).child(name)
        };
        let key = qualified.to_string();

        let index = match self.class_index.get(&key) {
            Some(&index) => index,
            None => {
                self.classes.push(NativeClass::new(qualified));
                self.class_index.insert(key, self.classes.len() - 1);
                self.classes.len() - 1
            }
        };

        ClassBuilder {
            library: self,
            index,
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn provides_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|n| n == namespace)
    }

    pub fn classes(&self) -> &[NativeClass] {
        &self.classes
    }

    pub fn find_class(&self, qualified: &str) -> Option<&NativeClass> {
        self.class_index.get(qualified).map(|&i| &self.classes[i])
    }

    /// The class standing in for a keyword type, if this library has one.
    pub fn keyword_class(&self, ty: DataType) -> Option<&NativeClass> {
        self.classes.iter().find(|c| c.keyword == Some(ty))
    }

    pub fn find_function(&self, hash: TypeHash) -> Option<&NativeFunction> {
        self.function_index
            .get(&hash)
            .map(|&(class, func)| &self.classes[class].functions[func])
    }
}

/// Fluent registration of one class's members.
pub struct ClassBuilder<'a> {
    library: &'a mut Library,
    index: usize,
}

impl ClassBuilder<'_> {
    fn push(&mut self, function: NativeFunction) {
        let class = &mut self.library.classes[self.index];
        let hash = function.hash;
        class.functions.push(function);
        let position = (self.index, class.functions.len() - 1);
        if self.library.function_index.insert(hash, position).is_some() {
            tracing::warn!(%hash, "native function registered twice; keeping the later one");
        }
    }

    /// Register a static function.
    pub fn function<F>(mut self, name: &str, params: &[DataType], return_type: DataType, f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        let class = self.library.classes[self.index].name.clone();
        let hash = NativeFunction::static_hash(&class, name, params);
        self.push(NativeFunction {
            class,
            name: name.to_string(),
            params: params.to_vec(),
            return_type,
            is_instance: false,
            hash,
            func: NativeFn::new(f),
        });
        self
    }

    /// Register an instance method on the keyword type this class stands for.
    pub fn method<F>(mut self, name: &str, params: &[DataType], return_type: DataType, f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        let class = self.library.classes[self.index].name.clone();
        let hash = NativeFunction::instance_hash(&class, name, params);
        self.push(NativeFunction {
            class,
            name: name.to_string(),
            params: params.to_vec(),
            return_type,
            is_instance: true,
            hash,
            func: NativeFn::new(f),
        });
        self
    }

    pub fn constant(self, name: &str, value: impl Into<Value>) -> Self {
        self.library.classes[self.index].constants.push(NativeConstant {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// Mark this class as the library type behind a keyword.
    pub fn keyword(self, ty: DataType) -> Self {
        self.library.classes[self.index].keyword = Some(ty);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut CallContext<'_>) -> Result<(), NativeError> {
        Ok(())
    }

    #[test]
    fn namespaces_include_parents() {
        let mut lib = Library::new("Test");
        lib.namespace("System.Text.RegularExpressions");
        assert_eq!(
            lib.namespaces(),
            ["System", "System.Text", "System.Text.RegularExpressions"]
        );
    }

    #[test]
    fn overloads_have_distinct_hashes() {
        let mut lib = Library::new("Test");
        lib.class("System", "Console")
            .function("WriteLine", &[DataType::String], DataType::Void, noop)
            .function("WriteLine", &[DataType::Int], DataType::Void, noop);

        let console = lib.find_class("System.Console").unwrap();
        let hashes: Vec<_> = console.functions_named("WriteLine").map(|f| f.hash).collect();
        assert_eq!(hashes.len(), 2);
        assert_ne!(hashes[0], hashes[1]);
        assert_eq!(
            lib.find_function(hashes[1]).unwrap().signature(),
            "System.Console.WriteLine(int)"
        );
    }

    #[test]
    fn reopening_a_class_extends_it() {
        let mut lib = Library::new("Test");
        lib.class("System", "Math").constant("PI", std::f64::consts::PI);
        lib.class("System", "Math").constant("E", std::f64::consts::E);
        assert_eq!(lib.classes().len(), 1);
        assert!(lib.find_class("System.Math").unwrap().constant("E").is_some());
    }

    #[test]
    fn instance_methods_are_kept_apart_from_statics() {
        let mut lib = Library::new("Test");
        lib.class("System", "String")
            .keyword(DataType::String)
            .method("ToUpper", &[], DataType::String, noop)
            .function("IsNullOrEmpty", &[DataType::String], DataType::Bool, noop);

        let string = lib.keyword_class(DataType::String).unwrap();
        assert_eq!(string.methods_named("ToUpper").count(), 1);
        assert_eq!(string.functions_named("ToUpper").count(), 0);
        assert_eq!(string.methods_named("ToUpper").next().unwrap().arity(), 1);
    }
}
