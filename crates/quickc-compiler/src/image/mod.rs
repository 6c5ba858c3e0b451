//! The `QCIL` module image: the binary form of a compiled module.
//!
//! Layout (integers little-endian, strings as `u32` length + UTF-8):
//!
//! ```text
//! magic "QCIL" | version u16 | flags u8 | output kind u8
//! name | references: u32 count, names
//! constants: u32 count, tagged values
//! imports:   u32 count, { hash u64, name, params u8 + tags, return tag }
//! classes:   u32 count, { name, visibility,
//!                         fields u16 + { name, type, visibility, flags, slot u16 },
//!                         methods u16 + { name, kind, visibility, static,
//!                                         params u8 + tags, return, locals u16,
//!                                         code u32 + bytes } }
//! ```
//!
//! Bytecode operands inside method code stay big-endian.

mod reader;
mod writer;

use quickc_core::{DataType, TypeHash, Visibility};
use thiserror::Error;

use crate::bytecode::Constant;
use crate::options::OutputKind;

pub use reader::read_image;
pub use writer::write_image;

pub const MAGIC: [u8; 4] = *b"QCIL";
pub const FORMAT_VERSION: u16 = 1;

const FLAG_OVERFLOW_CHECKS: u8 = 0b01;
const FLAG_RELEASE: u8 = 0b10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageFlags {
    pub overflow_checks: bool,
    pub release: bool,
}

impl ImageFlags {
    pub fn bits(self) -> u8 {
        let mut bits = 0;
        if self.overflow_checks {
            bits |= FLAG_OVERFLOW_CHECKS;
        }
        if self.release {
            bits |= FLAG_RELEASE;
        }
        bits
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !(FLAG_OVERFLOW_CHECKS | FLAG_RELEASE) != 0 {
            return None;
        }
        Some(Self {
            overflow_checks: bits & FLAG_OVERFLOW_CHECKS != 0,
            release: bits & FLAG_RELEASE != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MethodKind {
    Method = 0,
    Constructor = 1,
    /// Runs static field initializers once, when the module is loaded.
    TypeInitializer = 2,
}

impl MethodKind {
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MethodKind::Method),
            1 => Some(MethodKind::Constructor),
            2 => Some(MethodKind::TypeInitializer),
            _ => None,
        }
    }
}

/// A native function the module calls, bound by hash at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeImport {
    pub hash: TypeHash,
    /// `System.Console.WriteLine`, for diagnostics.
    pub name: String,
    /// Arguments as passed, receiver first for instance methods.
    pub params: Vec<DataType>,
    pub return_type: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldImage {
    pub name: String,
    pub ty: DataType,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    /// Instance field slot, or module static slot for static fields.
    pub slot: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodImage {
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub params: Vec<DataType>,
    pub return_type: DataType,
    /// Frame size, parameters included.
    pub locals: u16,
    pub code: Vec<u8>,
}

impl MethodImage {
    /// `Greet(string)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, quickc_core::format_params(&self.params))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassImage {
    /// Fully-qualified name.
    pub name: String,
    pub visibility: Visibility,
    pub fields: Vec<FieldImage>,
    pub methods: Vec<MethodImage>,
}

impl ClassImage {
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldImage> {
        self.fields.iter().filter(|f| !f.is_static)
    }

    pub fn type_initializer(&self) -> Option<usize> {
        self.methods
            .iter()
            .position(|m| m.kind == MethodKind::TypeInitializer)
    }
}

/// A compiled module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleImage {
    pub name: String,
    pub flags: ImageFlags,
    pub output_kind: OutputKind,
    /// Identifiers of the libraries native imports are bound against.
    pub references: Vec<String>,
    pub constants: Vec<Constant>,
    pub imports: Vec<NativeImport>,
    pub classes: Vec<ClassImage>,
}

impl ModuleImage {
    pub fn find_class(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    /// Number of module static slots.
    pub fn static_count(&self) -> usize {
        self.classes
            .iter()
            .flat_map(|c| &c.fields)
            .filter(|f| f.is_static)
            .count()
    }
}

/// Faults found while decoding an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a module image (bad magic)")]
    BadMagic,

    #[error("unsupported image format version {0}")]
    UnsupportedVersion(u16),

    #[error("image truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("invalid {what} tag {tag} at offset {offset}")]
    InvalidTag {
        what: &'static str,
        tag: u8,
        offset: usize,
    },

    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidString { offset: usize },

    #[error("{count} trailing bytes after image")]
    TrailingBytes { count: usize },

    #[error("invalid code in {method} at offset {offset}: {detail}")]
    InvalidCode {
        method: String,
        offset: usize,
        detail: String,
    },
}
