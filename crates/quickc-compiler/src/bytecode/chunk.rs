//! Bytecode for one method.

use super::OpCode;

/// The code of a single method.
///
/// Constants live in the module-level [`ConstantPool`](super::ConstantPool).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeChunk {
    code: Vec<u8>,
}

impl BytecodeChunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_code(code: Vec<u8>) -> Self {
        Self { code }
    }

    pub fn write_op(&mut self, op: OpCode) {
        self.code.push(op as u8);
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16) {
        self.code.extend_from_slice(&value.to_be_bytes());
    }

    /// Overwrite a previously written operand.
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        self.code[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.code.get(offset..offset + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Discard everything written from `offset` on.
    pub fn truncate(&mut self, offset: usize) {
        self.code.truncate(offset);
    }

    /// Insert a single operand-less instruction at `offset`.
    pub fn insert_op(&mut self, offset: usize, op: OpCode) {
        self.code.insert(offset, op as u8);
    }

    /// Remove and return the code written from `offset` on.
    pub fn split_off(&mut self, offset: usize) -> Vec<u8> {
        self.code.split_off(offset)
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn into_code(self) -> Vec<u8> {
        self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Disassemble into one line per instruction, for debugging.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut offset = 0;
        while offset < self.code.len() {
            let Some(op) = OpCode::from_u8(self.code[offset]) else {
                out.push_str(&format!("{offset:04} <invalid {:#04x}>\n", self.code[offset]));
                offset += 1;
                continue;
            };
            out.push_str(&format!("{offset:04} {}", op.name()));
            for i in 0..op.operand_count() {
                match self.read_u16(offset + 1 + 2 * i) {
                    Some(operand) => out.push_str(&format!(" {operand}")),
                    None => out.push_str(" <truncated>"),
                }
            }
            out.push('\n');
            offset += op.width();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_are_big_endian() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::GetLocal);
        chunk.write_u16(0x0102);
        assert_eq!(chunk.code(), [OpCode::GetLocal as u8, 0x01, 0x02]);
        chunk.patch_u16(1, 7);
        assert_eq!(chunk.read_u16(1), Some(7));
    }

    #[test]
    fn insert_and_split() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::PushTrue);
        chunk.write_op(OpCode::Pop);
        chunk.insert_op(1, OpCode::Not);
        assert_eq!(chunk.split_off(1), [OpCode::Not as u8, OpCode::Pop as u8]);
        assert_eq!(chunk.len(), 1);
    }

    #[test]
    fn disassembly_lists_instructions() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant);
        chunk.write_u16(3);
        chunk.write_op(OpCode::Return);
        assert_eq!(chunk.disassemble(), "0000 CONSTANT 3\n0003 RETURN\n");
    }
}
