//! Module names.
//!
//! A module name must be usable as an identifier in the image format:
//! `[A-Za-z_][A-Za-z0-9_]*`.

use uuid::Uuid;

use super::Provider;
use crate::error::ProviderError;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHANUMERICS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub fn is_valid_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A fresh random name on every call, like `k3j2lq0a_x1z`.
///
/// This is the one provider that is not repeatable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomModuleNameProvider;

impl Provider<String> for RandomModuleNameProvider {
    fn provide(&self) -> String {
        let bytes = Uuid::new_v4().into_bytes();
        let mut name = String::with_capacity(12);
        for (i, &byte) in bytes.iter().take(11).enumerate() {
            if i == 8 {
                name.push('_');
            }
            // A leading digit would not be an identifier.
            let alphabet = if i == 0 { LETTERS } else { ALPHANUMERICS };
            name.push(char::from(alphabet[usize::from(byte) % alphabet.len()]));
        }
        name
    }
}

/// Always the same, validated, name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedModuleNameProvider {
    name: String,
}

impl FixedModuleNameProvider {
    pub fn new(name: impl Into<String>) -> Result<Self, ProviderError> {
        let name = name.into();
        if !is_valid_module_name(&name) {
            return Err(ProviderError::InvalidModuleName { name });
        }
        Ok(Self { name })
    }
}

impl Provider<String> for FixedModuleNameProvider {
    fn provide(&self) -> String {
        self.name.clone()
    }
}
