//! Image encoder.

use std::io::{self, Write};

use quickc_core::DataType;

use super::{ClassImage, FORMAT_VERSION, MAGIC, MethodImage, ModuleImage, NativeImport};
use crate::bytecode::Constant;

struct Writer<'w, W: Write> {
    out: &'w mut W,
}

fn too_many(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("too many {what} to encode"))
}

impl<W: Write> Writer<'_, W> {
    fn u8(&mut self, v: u8) -> io::Result<()> {
        self.out.write_all(&[v])
    }

    fn u16(&mut self, v: u16) -> io::Result<()> {
        self.out.write_all(&v.to_le_bytes())
    }

    fn u32(&mut self, v: u32) -> io::Result<()> {
        self.out.write_all(&v.to_le_bytes())
    }

    fn u64(&mut self, v: u64) -> io::Result<()> {
        self.out.write_all(&v.to_le_bytes())
    }

    fn len_u32(&mut self, len: usize, what: &str) -> io::Result<()> {
        self.u32(u32::try_from(len).map_err(|_| too_many(what))?)
    }

    fn len_u16(&mut self, len: usize, what: &str) -> io::Result<()> {
        self.u16(u16::try_from(len).map_err(|_| too_many(what))?)
    }

    fn bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.len_u32(bytes.len(), "bytes")?;
        self.out.write_all(bytes)
    }

    fn str(&mut self, s: &str) -> io::Result<()> {
        self.bytes(s.as_bytes())
    }

    fn types(&mut self, types: &[DataType]) -> io::Result<()> {
        self.u8(u8::try_from(types.len()).map_err(|_| too_many("parameters"))?)?;
        for ty in types {
            self.u8(ty.tag())?;
        }
        Ok(())
    }

    fn constant(&mut self, constant: &Constant) -> io::Result<()> {
        match constant {
            Constant::Int(v) => {
                self.u8(1)?;
                self.out.write_all(&v.to_le_bytes())
            }
            Constant::Long(v) => {
                self.u8(2)?;
                self.out.write_all(&v.to_le_bytes())
            }
            Constant::Double(v) => {
                self.u8(3)?;
                self.u64(v.to_bits())
            }
            Constant::Str(s) => {
                self.u8(4)?;
                self.str(s)
            }
        }
    }

    fn import(&mut self, import: &NativeImport) -> io::Result<()> {
        self.u64(import.hash.0)?;
        self.str(&import.name)?;
        self.types(&import.params)?;
        self.u8(import.return_type.tag())
    }

    fn method(&mut self, method: &MethodImage) -> io::Result<()> {
        self.str(&method.name)?;
        self.u8(method.kind.tag())?;
        self.u8(method.visibility.tag())?;
        self.u8(u8::from(method.is_static))?;
        self.types(&method.params)?;
        self.u8(method.return_type.tag())?;
        self.u16(method.locals)?;
        self.bytes(&method.code)
    }

    fn class(&mut self, class: &ClassImage) -> io::Result<()> {
        self.str(&class.name)?;
        self.u8(class.visibility.tag())?;
        self.len_u16(class.fields.len(), "fields")?;
        for field in &class.fields {
            self.str(&field.name)?;
            self.u8(field.ty.tag())?;
            self.u8(field.visibility.tag())?;
            self.u8(u8::from(field.is_static) | (u8::from(field.is_readonly) << 1))?;
            self.u16(field.slot)?;
        }
        self.len_u16(class.methods.len(), "methods")?;
        for method in &class.methods {
            self.method(method)?;
        }
        Ok(())
    }
}

/// Encode `image` into `out`.
pub fn write_image<W: Write>(image: &ModuleImage, out: &mut W) -> io::Result<()> {
    #[cfg(feature = "profiling")]
    profiling::scope!("write_image");

    let mut w = Writer { out };
    w.out.write_all(&MAGIC)?;
    w.u16(FORMAT_VERSION)?;
    w.u8(image.flags.bits())?;
    w.u8(image.output_kind.tag())?;
    w.str(&image.name)?;

    w.len_u32(image.references.len(), "references")?;
    for reference in &image.references {
        w.str(reference)?;
    }

    w.len_u32(image.constants.len(), "constants")?;
    for constant in &image.constants {
        w.constant(constant)?;
    }

    w.len_u32(image.imports.len(), "imports")?;
    for import in &image.imports {
        w.import(import)?;
    }

    w.len_u32(image.classes.len(), "classes")?;
    for class in &image.classes {
        w.class(class)?;
    }
    w.out.flush()
}
