//! Image decoder.
//!
//! Every read is bounds-checked, and method code is verified before the
//! image is handed out: opcodes are known, operands index things that exist,
//! and jumps land on instruction boundaries inside the method.

use std::io::Read;

use quickc_core::{DataType, TypeHash, Visibility};

use super::{
    ClassImage, FORMAT_VERSION, FieldImage, ImageError, ImageFlags, MAGIC, MethodImage, MethodKind,
    ModuleImage, NativeImport,
};
use crate::bytecode::{Constant, OpCode};
use crate::options::OutputKind;

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ImageError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(ImageError::Truncated { offset: self.pos })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ImageError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, ImageError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ImageError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, ImageError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, ImageError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// A count of items each at least `min_size` bytes long; rejected early
    /// when the rest of the image could not hold them.
    fn count(&mut self, min_size: usize) -> Result<usize, ImageError> {
        let offset = self.pos;
        let count = self.u32()? as usize;
        if count.saturating_mul(min_size) > self.data.len() - self.pos {
            return Err(ImageError::Truncated { offset });
        }
        Ok(count)
    }

    fn bytes(&mut self) -> Result<&'a [u8], ImageError> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    fn string(&mut self) -> Result<String, ImageError> {
        let offset = self.pos;
        let bytes = self.bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ImageError::InvalidString { offset })
    }

    fn tag<T>(&mut self, what: &'static str, decode: impl Fn(u8) -> Option<T>) -> Result<T, ImageError> {
        let offset = self.pos;
        let tag = self.u8()?;
        decode(tag).ok_or(ImageError::InvalidTag { what, tag, offset })
    }

    fn data_type(&mut self) -> Result<DataType, ImageError> {
        self.tag("type", DataType::from_tag)
    }

    fn visibility(&mut self) -> Result<Visibility, ImageError> {
        self.tag("visibility", Visibility::from_tag)
    }

    fn types(&mut self) -> Result<Vec<DataType>, ImageError> {
        let count = self.u8()?;
        (0..count).map(|_| self.data_type()).collect()
    }

    fn constant(&mut self) -> Result<Constant, ImageError> {
        let offset = self.pos;
        Ok(match self.u8()? {
            1 => Constant::Int(i32::from_le_bytes(self.array()?)),
            2 => Constant::Long(i64::from_le_bytes(self.array()?)),
            3 => Constant::Double(f64::from_bits(self.u64()?)),
            4 => Constant::Str(self.string()?),
            tag => {
                return Err(ImageError::InvalidTag {
                    what: "constant",
                    tag,
                    offset,
                });
            }
        })
    }

    fn import(&mut self) -> Result<NativeImport, ImageError> {
        Ok(NativeImport {
            hash: TypeHash(self.u64()?),
            name: self.string()?,
            params: self.types()?,
            return_type: self.data_type()?,
        })
    }

    fn field(&mut self) -> Result<FieldImage, ImageError> {
        let name = self.string()?;
        let ty = self.data_type()?;
        let visibility = self.visibility()?;
        let flags = self.tag("field flags", |b| (b & !0b11 == 0).then_some(b))?;
        Ok(FieldImage {
            name,
            ty,
            visibility,
            is_static: flags & 0b01 != 0,
            is_readonly: flags & 0b10 != 0,
            slot: self.u16()?,
        })
    }

    fn method(&mut self) -> Result<MethodImage, ImageError> {
        Ok(MethodImage {
            name: self.string()?,
            kind: self.tag("method kind", MethodKind::from_tag)?,
            visibility: self.visibility()?,
            is_static: self.tag("static flag", |b| match b {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            })?,
            params: self.types()?,
            return_type: self.data_type()?,
            locals: self.u16()?,
            code: self.bytes()?.to_vec(),
        })
    }

    fn class(&mut self) -> Result<ClassImage, ImageError> {
        let name = self.string()?;
        let visibility = self.visibility()?;
        let field_count = self.u16()?;
        let fields = (0..field_count)
            .map(|_| self.field())
            .collect::<Result<_, _>>()?;
        let method_count = self.u16()?;
        let methods = (0..method_count)
            .map(|_| self.method())
            .collect::<Result<_, _>>()?;
        Ok(ClassImage {
            name,
            visibility,
            fields,
            methods,
        })
    }
}

/// Decode and verify an image.
pub fn read_image<R: Read>(input: &mut R) -> Result<ModuleImage, ImageError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("read_image");

    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    let mut r = ByteReader { data: &data, pos: 0 };

    if r.take(4).map_err(|_| ImageError::BadMagic)? != MAGIC {
        return Err(ImageError::BadMagic);
    }
    let version = r.u16()?;
    if version != FORMAT_VERSION {
        return Err(ImageError::UnsupportedVersion(version));
    }
    let flags = r.tag("flags", ImageFlags::from_bits)?;
    let output_kind = r.tag("output kind", OutputKind::from_tag)?;
    let name = r.string()?;

    let count = r.count(4)?;
    let references = (0..count).map(|_| r.string()).collect::<Result<_, _>>()?;
    let count = r.count(5)?;
    let constants = (0..count).map(|_| r.constant()).collect::<Result<_, _>>()?;
    let count = r.count(14)?;
    let imports = (0..count).map(|_| r.import()).collect::<Result<_, _>>()?;
    let count = r.count(9)?;
    let classes = (0..count).map(|_| r.class()).collect::<Result<_, _>>()?;

    if r.pos != data.len() {
        return Err(ImageError::TrailingBytes {
            count: data.len() - r.pos,
        });
    }

    let image = ModuleImage {
        name,
        flags,
        output_kind,
        references,
        constants,
        imports,
        classes,
    };
    verify(&image)?;
    Ok(image)
}

fn verify(image: &ModuleImage) -> Result<(), ImageError> {
    let statics = image.static_count();
    for class in &image.classes {
        let instance_fields = class.instance_fields().count();
        for method in &class.methods {
            verify_method(image, class, method, instance_fields, statics)?;
        }
    }
    Ok(())
}

fn verify_method(
    image: &ModuleImage,
    class: &ClassImage,
    method: &MethodImage,
    instance_fields: usize,
    statics: usize,
) -> Result<(), ImageError> {
    let code = &method.code;
    let fail = |offset: usize, detail: String| ImageError::InvalidCode {
        method: format!("{}.{}", class.name, method.signature()),
        offset,
        detail,
    };

    if usize::from(method.locals) < method.params.len() {
        return Err(fail(0, "frame smaller than its parameters".into()));
    }

    let mut boundaries = vec![false; code.len() + 1];
    let mut targets = Vec::new();
    let mut offset = 0;
    while offset < code.len() {
        boundaries[offset] = true;
        let op = OpCode::from_u8(code[offset])
            .ok_or_else(|| fail(offset, format!("unknown opcode {:#04x}", code[offset])))?;
        let end = offset + op.width();
        if end > code.len() {
            return Err(fail(offset, format!("{op} operands truncated")));
        }
        let operand = |i: usize| {
            let at = offset + 1 + 2 * i;
            usize::from(u16::from_be_bytes([code[at], code[at + 1]]))
        };
        let in_range = |value: usize, limit: usize, what: &str| {
            if value < limit {
                Ok(())
            } else {
                Err(fail(offset, format!("{op} {what} {value} out of range")))
            }
        };

        match op {
            OpCode::Constant => in_range(operand(0), image.constants.len(), "constant")?,
            OpCode::GetLocal | OpCode::SetLocal => {
                in_range(operand(0), usize::from(method.locals), "local")?
            }
            OpCode::GetField | OpCode::SetField => {
                if method.is_static {
                    return Err(fail(offset, format!("{op} in a static method")));
                }
                in_range(operand(0), instance_fields, "field")?
            }
            OpCode::GetStatic | OpCode::SetStatic => in_range(operand(0), statics, "static")?,
            OpCode::Jump | OpCode::JumpIfFalse | OpCode::JumpIfTrue => {
                targets.push((offset, end + operand(0)));
            }
            OpCode::Loop => match end.checked_sub(operand(0)) {
                Some(target) => targets.push((offset, target)),
                None => return Err(fail(offset, "loop before method start".into())),
            },
            OpCode::Call => {
                in_range(operand(0), image.classes.len(), "class")?;
                in_range(operand(1), image.classes[operand(0)].methods.len(), "method")?;
            }
            OpCode::CallNative => in_range(operand(0), image.imports.len(), "import")?,
            _ => {}
        }
        offset = end;
    }
    boundaries[code.len()] = true;

    for (at, target) in targets {
        if target > code.len() || !boundaries[target] {
            return Err(fail(at, format!("jump to {target} is not an instruction")));
        }
    }
    Ok(())
}
