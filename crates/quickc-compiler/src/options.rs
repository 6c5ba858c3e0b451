//! Options that shape one compilation.

/// Kind of artifact the compiler produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum OutputKind {
    /// A library of classes with no entry point.
    #[default]
    DynamicallyLinkedLibrary,
}

impl OutputKind {
    pub const fn tag(self) -> u8 {
        match self {
            OutputKind::DynamicallyLinkedLibrary => 0,
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(OutputKind::DynamicallyLinkedLibrary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptimizationLevel {
    /// Keep every statement's code, reachable or not.
    Debug,
    /// Drop code that can never run.
    #[default]
    Release,
}

/// Compiler configuration.
///
/// The defaults are what the pipeline compiles with: a library, checked
/// arithmetic and release optimization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationOptions {
    pub output_kind: OutputKind,
    /// Integer overflow faults at runtime instead of wrapping.
    pub overflow_checks: bool,
    pub optimization_level: OptimizationLevel,
    /// Namespaces imported into every class, as if by `using`.
    pub usings: Vec<String>,
    /// Report warnings as blocking errors.
    pub warnings_as_errors: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            output_kind: OutputKind::default(),
            overflow_checks: true,
            optimization_level: OptimizationLevel::default(),
            usings: Vec::new(),
            warnings_as_errors: false,
        }
    }
}

impl CompilationOptions {
    pub fn new(output_kind: OutputKind) -> Self {
        Self {
            output_kind,
            ..Self::default()
        }
    }

    pub fn with_overflow_checks(mut self, enabled: bool) -> Self {
        self.overflow_checks = enabled;
        self
    }

    pub fn with_optimization_level(mut self, level: OptimizationLevel) -> Self {
        self.optimization_level = level;
        self
    }

    pub fn with_usings<I, S>(mut self, usings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usings = usings.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }

    #[inline]
    pub fn is_release(&self) -> bool {
        self.optimization_level == OptimizationLevel::Release
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_checked_release_libraries() {
        let options = CompilationOptions::default();
        assert_eq!(options.output_kind, OutputKind::DynamicallyLinkedLibrary);
        assert!(options.overflow_checks);
        assert!(options.is_release());
        assert!(!options.warnings_as_errors);
    }

    #[test]
    fn builders_replace_fields() {
        let options = CompilationOptions::new(OutputKind::DynamicallyLinkedLibrary)
            .with_usings(["System", "System.IO"])
            .with_optimization_level(OptimizationLevel::Debug)
            .with_overflow_checks(false);
        assert_eq!(options.usings, ["System", "System.IO"]);
        assert!(!options.is_release());
        assert!(!options.overflow_checks);
    }
}
