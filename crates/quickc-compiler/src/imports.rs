//! Native functions referenced by the module, numbered in first-use order.

use quickc_core::{CompilationError, DataType, Span, TypeHash};
use quickc_modules::NativeFunction;
use rustc_hash::FxHashMap;

use crate::image::NativeImport;

#[derive(Debug, Default)]
pub struct ImportTable {
    imports: Vec<NativeImport>,
    index: FxHashMap<TypeHash, u16>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The import index for `function`, adding it on first use. `receiver`
    /// is the keyword type an instance method is called on.
    pub fn import(
        &mut self,
        function: &NativeFunction,
        receiver: Option<DataType>,
        span: Span,
    ) -> Result<u16, CompilationError> {
        if let Some(&index) = self.index.get(&function.hash) {
            return Ok(index);
        }
        let index = u16::try_from(self.imports.len()).map_err(|_| CompilationError::Unsupported {
            feature: "more than 65535 native functions in one module".to_string(),
            span,
        })?;
        let params = receiver
            .into_iter()
            .chain(function.params.iter().copied())
            .collect();
        self.imports.push(NativeImport {
            hash: function.hash,
            name: function.qualified_name(),
            params,
            return_type: function.return_type,
        });
        self.index.insert(function.hash, index);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn into_vec(self) -> Vec<NativeImport> {
        self.imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_are_deduplicated_by_hash() {
        let lib = quickc_modules::runtime::library();
        let console = lib.find_class("System.Console").unwrap();
        let string = lib.keyword_class(DataType::String).unwrap();
        let write_line = console.functions_named("WriteLine").next().unwrap();
        let to_upper = string.methods_named("ToUpper").next().unwrap();

        let mut table = ImportTable::new();
        assert_eq!(table.import(write_line, None, Span::default()), Ok(0));
        assert_eq!(table.import(to_upper, Some(DataType::String), Span::default()), Ok(1));
        assert_eq!(table.import(write_line, None, Span::default()), Ok(0));

        let imports = table.into_vec();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[1].params, [DataType::String]);
        assert_eq!(imports[1].name, "System.String.ToUpper");
    }
}
