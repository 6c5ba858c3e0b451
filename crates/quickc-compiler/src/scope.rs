//! Local variables of the method being compiled.
//!
//! Locals live in numbered frame slots. Parameters take the first slots.
//! Slots are never reused, so the frame size is the number of declarations.
//! A name may not be redeclared while an earlier declaration is in scope,
//! even from an inner block.

use quickc_core::{CompilationError, DataType, Span};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub data_type: DataType,
    pub slot: u16,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct LocalScope {
    variables: FxHashMap<String, LocalVar>,
    /// Names declared at each open block, innermost last.
    blocks: Vec<Vec<String>>,
    next_slot: u16,
}

impl LocalScope {
    pub fn new() -> Self {
        Self {
            blocks: vec![Vec::new()],
            ..Self::default()
        }
    }

    pub fn push_scope(&mut self) {
        self.blocks.push(Vec::new());
    }

    pub fn pop_scope(&mut self) {
        if let Some(names) = self.blocks.pop() {
            for name in names {
                self.variables.remove(&name);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Declare a local in the innermost block and allocate its slot.
    pub fn declare(
        &mut self,
        name: &str,
        data_type: DataType,
        span: Span,
    ) -> Result<u16, CompilationError> {
        if self.variables.contains_key(name) {
            return Err(CompilationError::DuplicateLocal {
                name: name.to_string(),
                span,
            });
        }
        let slot = self.next_slot;
        self.next_slot = self.next_slot.checked_add(1).ok_or_else(|| {
            CompilationError::Unsupported {
                feature: "more than 65535 locals in one method".to_string(),
                span,
            }
        })?;
        self.variables.insert(
            name.to_string(),
            LocalVar {
                name: name.to_string(),
                data_type,
                slot,
                span,
            },
        );
        if let Some(block) = self.blocks.last_mut() {
            block.push(name.to_string());
        }
        Ok(slot)
    }

    pub fn lookup(&self, name: &str) -> Option<&LocalVar> {
        self.variables.get(name)
    }

    /// Frame size needed by the method.
    pub fn frame_size(&self) -> u16 {
        self.next_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_allocated_in_order() {
        let mut scope = LocalScope::new();
        assert_eq!(scope.declare("a", DataType::Int, Span::default()), Ok(0));
        assert_eq!(scope.declare("b", DataType::String, Span::default()), Ok(1));
        assert_eq!(scope.lookup("b").unwrap().data_type, DataType::String);
    }

    #[test]
    fn names_leave_scope_but_slots_are_not_reused() {
        let mut scope = LocalScope::new();
        scope.push_scope();
        scope.declare("i", DataType::Int, Span::default()).unwrap();
        scope.pop_scope();
        assert!(scope.lookup("i").is_none());
        assert_eq!(scope.declare("i", DataType::Long, Span::default()), Ok(1));
        assert_eq!(scope.frame_size(), 2);
    }

    #[test]
    fn redeclaring_an_outer_name_is_an_error() {
        let mut scope = LocalScope::new();
        scope.declare("x", DataType::Int, Span::default()).unwrap();
        scope.push_scope();
        let err = scope.declare("x", DataType::Int, Span::new(3, 5, 1)).unwrap_err();
        assert_eq!(err.code(), "QC0128");
    }
}
