//! Deterministic identities for types, methods and native functions.
//!
//! A [`TypeHash`] is computed from a qualified name (types) or a name plus
//! parameter list (functions and methods), so the compiler and the loader
//! agree on an identity without sharing a registration order. Native imports
//! in a module image are matched against their library by this hash.
//!
//! ```
//! use quickc_core::TypeHash;
//!
//! let int = TypeHash::from_name("int");
//! let long = TypeHash::from_name("long");
//! assert_ne!(
//!     TypeHash::from_function("System.Math.Abs", &[int]),
//!     TypeHash::from_function("System.Math.Abs", &[long]),
//! );
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain constants mixed into each kind of hash.
pub mod hash_constants {
    /// Separator multiplier between parameter positions.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;
    /// Domain marker for static and native function hashes.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;
    /// Domain marker for instance method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Per-position parameter markers; order of parameters changes the hash.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A 64-bit hash identifying a type, function, or method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a fully-qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a free (static or native) function by qualified name and parameters.
    #[inline]
    pub fn from_function(name: &str, params: &[TypeHash]) -> Self {
        TypeHash(mix_params(
            hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0),
            params,
        ))
    }

    /// Hash of an instance method on `owner`.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        TypeHash(mix_params(
            hash_constants::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0),
            params,
        ))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params(seed: u64, params: &[TypeHash]) -> u64 {
    params.iter().enumerate().fold(seed, |hash, (i, param)| {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        hash.wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param.0)
    })
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_hash() {
        assert_eq!(TypeHash::from_name("int"), TypeHash::from_name("int"));
        assert_ne!(TypeHash::from_name("int"), TypeHash::from_name("long"));
    }

    #[test]
    fn parameter_order_matters() {
        let int = TypeHash::from_name("int");
        let string = TypeHash::from_name("string");
        assert_ne!(
            TypeHash::from_function("f", &[int, string]),
            TypeHash::from_function("f", &[string, int])
        );
    }

    #[test]
    fn methods_and_functions_do_not_collide() {
        let owner = TypeHash::from_name("Greeter");
        assert_ne!(
            TypeHash::from_method(owner, "Greet", &[]),
            TypeHash::from_function("Greet", &[])
        );
    }
}
