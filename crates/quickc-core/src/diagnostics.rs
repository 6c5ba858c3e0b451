//! Structured diagnostics reported by parsing and code generation.

use std::fmt;

use crate::{CompilationError, ParseError, Span};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    /// Set when a warning was promoted to an error by policy.
    pub is_warning_as_error: bool,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
            is_warning_as_error: false,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, span)
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::error(code, message, span)
        }
    }

    /// Whether this diagnostic prevents a module from being produced.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error || self.is_warning_as_error
    }

    /// Promote a warning to a blocking error, keeping its code.
    pub fn promote(mut self) -> Self {
        if self.severity == Severity::Warning {
            self.severity = Severity::Error;
            self.is_warning_as_error = true;
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.span, self.severity, self.code, self.message
        )
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        Diagnostic::error(error.kind.code(), error.message, error.span)
    }
}

impl From<CompilationError> for Diagnostic {
    fn from(error: CompilationError) -> Self {
        Diagnostic::error(error.code(), error.to_string(), error.span())
    }
}

/// An ordered list of diagnostics, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: impl Into<Diagnostic>) {
        self.items.push(diagnostic.into());
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn has_blocking(&self) -> bool {
        self.items.iter().any(Diagnostic::is_blocking)
    }

    /// Blocking diagnostics only, in their original order.
    pub fn blocking(&self) -> Diagnostics {
        self.items
            .iter()
            .filter(|d| d.is_blocking())
            .cloned()
            .collect()
    }

    /// Non-blocking diagnostics only, in their original order.
    pub fn non_blocking(&self) -> Diagnostics {
        self.items
            .iter()
            .filter(|d| !d.is_blocking())
            .cloned()
            .collect()
    }

    /// Promote every warning to an error.
    pub fn promote_warnings(self) -> Diagnostics {
        self.items.into_iter().map(Diagnostic::promote).collect()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
