use std::fmt;

/// A dotted name such as `System.Console` or `Samples.Greeter`.
///
/// ```
/// use quickc_core::QualifiedName;
///
/// let name = QualifiedName::from_dotted("RoslynCompileSample.Writer");
/// assert_eq!(name.simple_name(), "Writer");
/// assert_eq!(name.namespace_string(), "RoslynCompileSample");
/// assert_eq!(name.to_string(), "RoslynCompileSample.Writer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Simple name (e.g., "Writer").
    pub name: String,
    /// Enclosing namespace path, empty for the global namespace.
    pub namespace: Vec<String>,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Split on `.`; the last segment is the name. Empty segments are dropped.
    pub fn from_dotted(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split('.')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        let name = parts.pop().unwrap_or_default();
        Self {
            name,
            namespace: parts,
        }
    }

    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    pub fn namespace_string(&self) -> String {
        self.namespace.join(".")
    }

    /// A name nested one level below this one (`System` + `Console`).
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut namespace = self.namespace.clone();
        namespace.push(self.name.clone());
        Self::new(name, namespace)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{segment}.")?;
        }
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_name_has_no_namespace() {
        let name = QualifiedName::from_dotted("Greeter");
        assert!(name.is_global());
        assert_eq!(name.to_string(), "Greeter");
    }

    #[test]
    fn child_appends_segment() {
        let system = QualifiedName::global("System");
        assert_eq!(system.child("Console").to_string(), "System.Console");
    }

    #[test]
    fn stray_dots_are_ignored() {
        assert_eq!(
            QualifiedName::from_dotted(".A..B."),
            QualifiedName::new("B", vec!["A".into()])
        );
    }
}
