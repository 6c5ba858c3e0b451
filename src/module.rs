//! Loaded modules.
//!
//! A [`LoadedModule`] is what a successful emit produces: the image bytes,
//! the decoded [`ModuleImage`], and every native import bound to the library
//! function that implements it. Static fields live here, shared by all
//! instances created from the module. Type initializers run once, at load.

use std::fmt;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quickc_compiler::{ModuleImage, NativeImport, read_image};
use quickc_core::{Diagnostics, NativeFn, Value};
use quickc_modules::{Library, NativeFunction, ReferenceCatalog};

use crate::binder::DynamicInstance;
use crate::error::{BindError, LoadError};
use crate::vm::Vm;

type OutputSink = Box<dyn Write + Send>;

pub struct LoadedModule {
    image: ModuleImage,
    bytes: Vec<u8>,
    natives: Vec<NativeFn>,
    libraries: Vec<Arc<Library>>,
    statics: Mutex<Vec<Value>>,
    output: Mutex<OutputSink>,
    warnings: Diagnostics,
}

impl LoadedModule {
    /// Decode the image in `buffer`, bind its imports against `catalog` and
    /// run its type initializers.
    pub fn load(buffer: Cursor<Vec<u8>>, catalog: &ReferenceCatalog) -> Result<Self, LoadError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("LoadedModule::load");

        let mut buffer = buffer;
        let image = read_image(&mut buffer).map_err(LoadError::Image)?;

        let libraries = image
            .references
            .iter()
            .map(|name| {
                catalog
                    .get(name)
                    .cloned()
                    .ok_or_else(|| LoadError::MissingReference { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let natives = image
            .imports
            .iter()
            .map(|import| bind_import(import, &libraries))
            .collect::<Result<Vec<_>, _>>()?;

        let mut statics = vec![Value::Void; image.static_count()];
        for field in image.classes.iter().flat_map(|c| &c.fields).filter(|f| f.is_static) {
            if let Some(slot) = statics.get_mut(usize::from(field.slot)) {
                *slot = field.ty.default_value();
            }
        }

        let module = Self {
            bytes: buffer.into_inner(),
            image,
            natives,
            libraries,
            statics: Mutex::new(statics),
            output: Mutex::new(Box::new(io::stdout())),
            warnings: Diagnostics::new(),
        };
        module.run_type_initializers()?;

        tracing::debug!(
            module = %module.name(),
            classes = module.image.classes.len(),
            imports = module.natives.len(),
            "loaded module"
        );
        Ok(module)
    }

    fn run_type_initializers(&self) -> Result<(), LoadError> {
        for (index, class) in self.image.classes.iter().enumerate() {
            if let Some(cctor) = class.type_initializer() {
                tracing::trace!(class = %class.name, "running type initializer");
                Vm::new(self, None)
                    .run(index, cctor, Vec::new())
                    .map_err(LoadError::TypeInitializer)?;
            }
        }
        Ok(())
    }

    pub(crate) fn with_warnings(mut self, warnings: Diagnostics) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn name(&self) -> &str {
        &self.image.name
    }

    pub fn image(&self) -> &ModuleImage {
        &self.image
    }

    /// The encoded image this module was loaded from.
    pub fn image_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Libraries the module's imports are bound against.
    pub fn libraries(&self) -> &[Arc<Library>] {
        &self.libraries
    }

    /// Non-blocking diagnostics reported while compiling this module.
    pub fn warnings(&self) -> &Diagnostics {
        &self.warnings
    }

    /// Index of the class named `type_name`, whatever its accessibility.
    pub fn find_class(&self, type_name: &str) -> Option<usize> {
        self.image.find_class(type_name)
    }

    /// Redirect console output of every instance of this module.
    pub fn set_output(&self, sink: impl Write + Send + 'static) {
        *self.lock_output() = Box::new(sink);
    }

    pub fn with_output(self, sink: impl Write + Send + 'static) -> Self {
        self.set_output(sink);
        self
    }

    /// Create a default-constructed instance of `type_name`.
    pub fn create_instance(&self, type_name: &str) -> Result<DynamicInstance<'_>, BindError> {
        DynamicInstance::create(self, type_name)
    }

    pub(crate) fn native(&self, index: usize) -> Option<&NativeFn> {
        self.natives.get(index)
    }

    pub(crate) fn lock_statics(&self) -> MutexGuard<'_, Vec<Value>> {
        self.statics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_output(&self) -> MutexGuard<'_, OutputSink> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("name", &self.image.name)
            .field("classes", &self.image.classes.len())
            .field("imports", &self.natives.len())
            .field("warnings", &self.warnings.len())
            .finish_non_exhaustive()
    }
}

fn bind_import(import: &NativeImport, libraries: &[Arc<Library>]) -> Result<NativeFn, LoadError> {
    let function = libraries
        .iter()
        .find_map(|lib| lib.find_function(import.hash))
        .ok_or_else(|| LoadError::UnresolvedImport {
            name: import.name.clone(),
        })?;
    if !matches_import(function, import) {
        return Err(LoadError::ImportSignatureMismatch {
            name: import.name.clone(),
        });
    }
    Ok(function.func.clone())
}

fn matches_import(function: &NativeFunction, import: &NativeImport) -> bool {
    function.arity() == import.params.len()
        && import.params[usize::from(function.is_instance)..] == function.params[..]
        && function.return_type == import.return_type
}

#[cfg(test)]
mod tests {
    use quickc_compiler::{ClassImage, ImageFlags, MethodImage, MethodKind, OutputKind, write_image};
    use quickc_core::{DataType, TypeHash, Visibility};

    use super::*;

    fn encode(image: &ModuleImage) -> Cursor<Vec<u8>> {
        let mut bytes = Vec::new();
        write_image(image, &mut bytes).unwrap();
        Cursor::new(bytes)
    }

    fn empty(name: &str) -> ModuleImage {
        ModuleImage {
            name: name.to_string(),
            flags: ImageFlags {
                overflow_checks: true,
                release: true,
            },
            output_kind: OutputKind::DynamicallyLinkedLibrary,
            references: vec!["System.Runtime".to_string()],
            constants: Vec::new(),
            imports: Vec::new(),
            classes: vec![ClassImage {
                name: "A".to_string(),
                visibility: Visibility::Internal,
                fields: Vec::new(),
                methods: vec![MethodImage {
                    name: ".ctor".to_string(),
                    kind: MethodKind::Constructor,
                    visibility: Visibility::Public,
                    is_static: false,
                    params: Vec::new(),
                    return_type: DataType::Void,
                    locals: 0,
                    code: vec![quickc_compiler::bytecode::OpCode::ReturnVoid as u8],
                }],
            }],
        }
    }

    #[test]
    fn loads_and_keeps_its_bytes() {
        let image = empty("m");
        let buffer = encode(&image);
        let expected = buffer.get_ref().clone();
        let module = LoadedModule::load(buffer, ReferenceCatalog::standard()).unwrap();
        assert_eq!(module.name(), "m");
        assert_eq!(module.image(), &image);
        assert_eq!(module.image_bytes(), expected);
        assert_eq!(module.libraries().len(), 1);
        assert_eq!(module.find_class("A"), Some(0));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let result = LoadedModule::load(Cursor::new(b"nope".to_vec()), ReferenceCatalog::standard());
        assert!(matches!(result, Err(LoadError::Image(_))));
    }

    #[test]
    fn references_must_be_in_the_catalog() {
        let mut image = empty("m");
        image.references.push("System.Drawing".to_string());
        let result = LoadedModule::load(encode(&image), ReferenceCatalog::standard());
        assert!(matches!(result, Err(LoadError::MissingReference { name }) if name == "System.Drawing"));
    }

    #[test]
    fn imports_bind_by_hash_and_signature() {
        let runtime = quickc_modules::runtime::library();
        let write_line = runtime
            .find_class("System.Console")
            .and_then(|c| c.functions_named("WriteLine").find(|f| f.params == [DataType::String]))
            .unwrap();

        let mut image = empty("m");
        image.imports.push(NativeImport {
            hash: write_line.hash,
            name: write_line.qualified_name(),
            params: vec![DataType::String],
            return_type: DataType::Void,
        });
        assert!(LoadedModule::load(encode(&image), ReferenceCatalog::standard()).is_ok());

        image.imports[0].return_type = DataType::Int;
        let result = LoadedModule::load(encode(&image), ReferenceCatalog::standard());
        assert!(matches!(result, Err(LoadError::ImportSignatureMismatch { .. })));

        image.imports[0].hash = TypeHash::from_name("nothing");
        let result = LoadedModule::load(encode(&image), ReferenceCatalog::standard());
        assert!(matches!(result, Err(LoadError::UnresolvedImport { .. })));
    }
}
