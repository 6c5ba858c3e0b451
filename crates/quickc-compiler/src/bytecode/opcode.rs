//! Bytecode operation codes.
//!
//! Each opcode is one byte. Operands follow inline as big-endian `u16`s.

macro_rules! opcodes {
    ($( $(#[$doc:meta])* $name:ident = $text:literal, $operands:literal; )*) => {
        /// Instruction set of the stack machine.
        ///
        /// Binary operations pop the right operand, then the left, and push
        /// the result.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum OpCode {
            $( $(#[$doc])* $name, )*
        }

        const ALL: &[OpCode] = &[$( OpCode::$name, )*];

        impl OpCode {
            pub fn from_u8(byte: u8) -> Option<Self> {
                ALL.get(usize::from(byte)).copied()
            }

            /// Number of `u16` operands that follow the opcode byte.
            pub const fn operand_count(self) -> usize {
                match self {
                    $( OpCode::$name => $operands, )*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $( OpCode::$name => $text, )*
                }
            }
        }
    };
}

opcodes! {
    /// Push a constant. Operand: pool index.
    Constant = "CONSTANT", 1;
    PushTrue = "PUSH_TRUE", 0;
    PushFalse = "PUSH_FALSE", 0;
    Pop = "POP", 0;
    Dup = "DUP", 0;

    /// Operand: local slot.
    GetLocal = "GET_LOCAL", 1;
    /// Pops the stored value. Operand: local slot.
    SetLocal = "SET_LOCAL", 1;
    /// Operand: instance field slot.
    GetField = "GET_FIELD", 1;
    SetField = "SET_FIELD", 1;
    /// Operand: module static slot.
    GetStatic = "GET_STATIC", 1;
    SetStatic = "SET_STATIC", 1;

    AddI32 = "ADD_I32", 0;
    SubI32 = "SUB_I32", 0;
    MulI32 = "MUL_I32", 0;
    DivI32 = "DIV_I32", 0;
    ModI32 = "MOD_I32", 0;
    NegI32 = "NEG_I32", 0;

    AddI64 = "ADD_I64", 0;
    SubI64 = "SUB_I64", 0;
    MulI64 = "MUL_I64", 0;
    DivI64 = "DIV_I64", 0;
    ModI64 = "MOD_I64", 0;
    NegI64 = "NEG_I64", 0;

    AddF64 = "ADD_F64", 0;
    SubF64 = "SUB_F64", 0;
    MulF64 = "MUL_F64", 0;
    DivF64 = "DIV_F64", 0;
    ModF64 = "MOD_F64", 0;
    NegF64 = "NEG_F64", 0;

    /// Concatenate two strings.
    Concat = "CONCAT", 0;
    /// Replace the top value with its string form.
    ToStr = "TO_STR", 0;
    /// Replace a string with its length in characters.
    StrLen = "STR_LEN", 0;

    I32ToI64 = "I32_TO_I64", 0;
    I32ToF64 = "I32_TO_F64", 0;
    I64ToF64 = "I64_TO_F64", 0;

    /// Equality of two values of the same type.
    Eq = "EQ", 0;
    Ne = "NE", 0;
    LtI32 = "LT_I32", 0;
    LeI32 = "LE_I32", 0;
    GtI32 = "GT_I32", 0;
    GeI32 = "GE_I32", 0;
    LtI64 = "LT_I64", 0;
    LeI64 = "LE_I64", 0;
    GtI64 = "GT_I64", 0;
    GeI64 = "GE_I64", 0;
    LtF64 = "LT_F64", 0;
    LeF64 = "LE_F64", 0;
    GtF64 = "GT_F64", 0;
    GeF64 = "GE_F64", 0;
    Not = "NOT", 0;

    /// Forward jump. Operand: distance from the end of the instruction.
    Jump = "JUMP", 1;
    /// Pops the condition.
    JumpIfFalse = "JUMP_IF_FALSE", 1;
    /// Pops the condition.
    JumpIfTrue = "JUMP_IF_TRUE", 1;
    /// Backward jump. Operand: distance back from the end of the instruction.
    Loop = "LOOP", 1;

    /// Call a script method. Operands: class index, method index.
    Call = "CALL", 2;
    /// Call a bound native import. Operand: import index.
    CallNative = "CALL_NATIVE", 1;
    Return = "RETURN", 0;
    ReturnVoid = "RETURN_VOID", 0;
}

impl OpCode {
    /// Encoded size of the instruction, opcode byte included.
    pub const fn width(self) -> usize {
        1 + 2 * self.operand_count()
    }

    pub const fn is_jump(self) -> bool {
        matches!(
            self,
            OpCode::Jump | OpCode::JumpIfFalse | OpCode::JumpIfTrue | OpCode::Loop
        )
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
