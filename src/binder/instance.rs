use std::cell::RefCell;

use quickc_compiler::{ClassImage, MethodImage, MethodKind};
use quickc_core::{RuntimeError, Value, Visibility};

use super::{BoundCall, DynamicCall, MethodSignature, ScriptArgs, ScriptReturn};
use crate::error::{BindError, CallError};
use crate::module::LoadedModule;
use crate::vm::Vm;

/// One live object of a module type.
///
/// Fields are private to the instance and persist across calls.
#[derive(Debug)]
pub struct DynamicInstance<'m> {
    module: &'m LoadedModule,
    class: usize,
    fields: RefCell<Vec<Value>>,
}

impl<'m> DynamicInstance<'m> {
    /// Find `type_name` in `module` and run its public parameterless
    /// constructor.
    pub fn create(module: &'m LoadedModule, type_name: &str) -> Result<Self, BindError> {
        let class = module
            .find_class(type_name)
            .ok_or_else(|| BindError::TypeNotFound {
                type_name: type_name.to_string(),
                module: module.name().to_string(),
            })?;
        let image = &module.image().classes[class];
        let failure = |cause| BindError::ConstructionFailure {
            type_name: type_name.to_string(),
            signature: ".ctor()".to_string(),
            cause,
        };

        let ctor = image
            .methods
            .iter()
            .position(|m| {
                m.kind == MethodKind::Constructor && m.visibility == Visibility::Public && m.params.is_empty()
            })
            .ok_or_else(|| failure(None))?;

        let instance = Self {
            module,
            class,
            fields: RefCell::new(default_fields(image)),
        };
        instance.run(ctor, Vec::new()).map_err(|err| failure(Some(err)))?;
        tracing::debug!(type_name, "created instance");
        Ok(instance)
    }

    pub fn module(&self) -> &'m LoadedModule {
        self.module
    }

    pub fn class(&self) -> &'m ClassImage {
        &self.module.image().classes[self.class]
    }

    pub fn type_name(&self) -> &'m str {
        &self.class().name
    }

    /// Current value of the instance field `name`.
    pub fn field_value(&self, name: &str) -> Option<Value> {
        let field = self.class().instance_fields().find(|f| f.name == name)?;
        self.fields.borrow().get(usize::from(field.slot)).cloned()
    }

    /// Bind `name` with the signature given by `Args` and `Ret`.
    pub fn bind<Args: ScriptArgs, Ret: ScriptReturn>(
        &self,
        name: &str,
    ) -> Result<BoundCall<'_, Args, Ret>, BindError> {
        let method = self.resolve(name, &MethodSignature::of::<Args, Ret>())?;
        Ok(BoundCall::new(self, method))
    }

    /// Bind `name` by a runtime signature descriptor.
    pub fn bind_dynamic(&self, name: &str, signature: MethodSignature) -> Result<DynamicCall<'_>, BindError> {
        let method = self.resolve(name, &signature)?;
        Ok(DynamicCall::new(self, method, signature))
    }

    /// Bind and invoke a method that returns nothing.
    pub fn action<Args: ScriptArgs>(&self, name: &str, args: Args) -> Result<(), CallError> {
        Ok(self.bind::<Args, ()>(name)?.invoke(args)?)
    }

    /// Bind and invoke a method that returns a value.
    pub fn func<Args: ScriptArgs, Ret: ScriptReturn>(&self, name: &str, args: Args) -> Result<Ret, CallError> {
        Ok(self.bind::<Args, Ret>(name)?.invoke(args)?)
    }

    fn resolve(&self, name: &str, signature: &MethodSignature) -> Result<usize, BindError> {
        self.class()
            .methods
            .iter()
            .position(|m| is_bindable(m, name, signature))
            .ok_or_else(|| BindError::MethodNotFound {
                type_name: self.type_name().to_string(),
                signature: signature.describe(name),
            })
    }

    pub(crate) fn method(&self, index: usize) -> &'m MethodImage {
        &self.class().methods[index]
    }

    pub(crate) fn run(&self, method: usize, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut fields = self.fields.borrow_mut();
        Vm::new(self.module, Some(fields.as_mut_slice())).run(self.class, method, args)
    }
}

fn is_bindable(method: &MethodImage, name: &str, signature: &MethodSignature) -> bool {
    method.kind == MethodKind::Method
        && !method.is_static
        && method.visibility == Visibility::Public
        && method.name == name
        && method.params == signature.params
        && method.return_type == signature.return_type
}

fn default_fields(class: &ClassImage) -> Vec<Value> {
    let mut fields = vec![Value::Void; class.instance_fields().count()];
    for field in class.instance_fields() {
        if let Some(slot) = fields.get_mut(usize::from(field.slot)) {
            *slot = field.ty.default_value();
        }
    }
    fields
}
