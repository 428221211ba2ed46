//! The static opcode table.
//!
//! Every defined instruction byte maps to an [`Opcode`] variant carrying its
//! mnemonic and declared stack arity. Bytes that do not name an instruction
//! decode to [`Opcode::Invalid`].

use num_enum::{IntoPrimitive, TryFromPrimitive};
use once_cell::sync::Lazy;
use strum_macros::{EnumCount, IntoStaticStr};

macro_rules! define_opcodes {
    ($($variant:ident = $byte:literal => ($stack_in:literal, $stack_out:literal),)*) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            EnumCount,
            IntoStaticStr,
            TryFromPrimitive,
            IntoPrimitive,
        )]
        #[repr(u8)]
        #[strum(serialize_all = "UPPERCASE")]
        pub enum Opcode {
            $($variant = $byte,)*
        }

        impl Opcode {
            /// Returns the number of stack items consumed and produced.
            pub const fn stack_io(self) -> (usize, usize) {
                match self {
                    $(Opcode::$variant => ($stack_in, $stack_out),)*
                }
            }
        }
    };
}

define_opcodes! {
    // Stop and arithmetic
    Stop = 0x00 => (0, 0),
    Add = 0x01 => (2, 1),
    Mul = 0x02 => (2, 1),
    Sub = 0x03 => (2, 1),
    Div = 0x04 => (2, 1),
    SDiv = 0x05 => (2, 1),
    Mod = 0x06 => (2, 1),
    SMod = 0x07 => (2, 1),
    AddMod = 0x08 => (3, 1),
    MulMod = 0x09 => (3, 1),
    Exp = 0x0a => (2, 1),
    SignExtend = 0x0b => (2, 1),

    // Comparison and bitwise logic
    Lt = 0x10 => (2, 1),
    Gt = 0x11 => (2, 1),
    Slt = 0x12 => (2, 1),
    Sgt = 0x13 => (2, 1),
    Eq = 0x14 => (2, 1),
    IsZero = 0x15 => (1, 1),
    And = 0x16 => (2, 1),
    Or = 0x17 => (2, 1),
    Xor = 0x18 => (2, 1),
    Not = 0x19 => (1, 1),
    Byte = 0x1a => (2, 1),
    Shl = 0x1b => (2, 1),
    Shr = 0x1c => (2, 1),
    Sar = 0x1d => (2, 1),

    Sha3 = 0x20 => (2, 1),

    // Environment
    Address = 0x30 => (0, 1),
    Balance = 0x31 => (1, 1),
    Origin = 0x32 => (0, 1),
    Caller = 0x33 => (0, 1),
    CallValue = 0x34 => (0, 1),
    CallDataLoad = 0x35 => (1, 1),
    CallDataSize = 0x36 => (0, 1),
    CallDataCopy = 0x37 => (3, 0),
    CodeSize = 0x38 => (0, 1),
    CodeCopy = 0x39 => (3, 0),
    GasPrice = 0x3a => (0, 1),
    ExtCodeSize = 0x3b => (1, 1),
    ExtCodeCopy = 0x3c => (4, 0),
    ReturnDataSize = 0x3d => (0, 1),
    ReturnDataCopy = 0x3e => (3, 0),
    ExtCodeHash = 0x3f => (1, 1),

    // Block information
    BlockHash = 0x40 => (1, 1),
    Coinbase = 0x41 => (0, 1),
    Timestamp = 0x42 => (0, 1),
    Number = 0x43 => (0, 1),
    Difficulty = 0x44 => (0, 1),
    GasLimit = 0x45 => (0, 1),

    // Stack, memory, storage and flow
    Pop = 0x50 => (1, 0),
    MLoad = 0x51 => (1, 1),
    MStore = 0x52 => (2, 0),
    MStore8 = 0x53 => (2, 0),
    SLoad = 0x54 => (1, 1),
    SStore = 0x55 => (2, 0),
    Jump = 0x56 => (1, 0),
    JumpI = 0x57 => (2, 0),
    Pc = 0x58 => (0, 1),
    MSize = 0x59 => (0, 1),
    Gas = 0x5a => (0, 1),
    JumpDest = 0x5b => (0, 0),

    Push1 = 0x60 => (0, 1),
    Push2 = 0x61 => (0, 1),
    Push3 = 0x62 => (0, 1),
    Push4 = 0x63 => (0, 1),
    Push5 = 0x64 => (0, 1),
    Push6 = 0x65 => (0, 1),
    Push7 = 0x66 => (0, 1),
    Push8 = 0x67 => (0, 1),
    Push9 = 0x68 => (0, 1),
    Push10 = 0x69 => (0, 1),
    Push11 = 0x6a => (0, 1),
    Push12 = 0x6b => (0, 1),
    Push13 = 0x6c => (0, 1),
    Push14 = 0x6d => (0, 1),
    Push15 = 0x6e => (0, 1),
    Push16 = 0x6f => (0, 1),
    Push17 = 0x70 => (0, 1),
    Push18 = 0x71 => (0, 1),
    Push19 = 0x72 => (0, 1),
    Push20 = 0x73 => (0, 1),
    Push21 = 0x74 => (0, 1),
    Push22 = 0x75 => (0, 1),
    Push23 = 0x76 => (0, 1),
    Push24 = 0x77 => (0, 1),
    Push25 = 0x78 => (0, 1),
    Push26 = 0x79 => (0, 1),
    Push27 = 0x7a => (0, 1),
    Push28 = 0x7b => (0, 1),
    Push29 = 0x7c => (0, 1),
    Push30 = 0x7d => (0, 1),
    Push31 = 0x7e => (0, 1),
    Push32 = 0x7f => (0, 1),

    Dup1 = 0x80 => (1, 2),
    Dup2 = 0x81 => (2, 3),
    Dup3 = 0x82 => (3, 4),
    Dup4 = 0x83 => (4, 5),
    Dup5 = 0x84 => (5, 6),
    Dup6 = 0x85 => (6, 7),
    Dup7 = 0x86 => (7, 8),
    Dup8 = 0x87 => (8, 9),
    Dup9 = 0x88 => (9, 10),
    Dup10 = 0x89 => (10, 11),
    Dup11 = 0x8a => (11, 12),
    Dup12 = 0x8b => (12, 13),
    Dup13 = 0x8c => (13, 14),
    Dup14 = 0x8d => (14, 15),
    Dup15 = 0x8e => (15, 16),
    Dup16 = 0x8f => (16, 17),

    Swap1 = 0x90 => (2, 2),
    Swap2 = 0x91 => (3, 3),
    Swap3 = 0x92 => (4, 4),
    Swap4 = 0x93 => (5, 5),
    Swap5 = 0x94 => (6, 6),
    Swap6 = 0x95 => (7, 7),
    Swap7 = 0x96 => (8, 8),
    Swap8 = 0x97 => (9, 9),
    Swap9 = 0x98 => (10, 10),
    Swap10 = 0x99 => (11, 11),
    Swap11 = 0x9a => (12, 12),
    Swap12 = 0x9b => (13, 13),
    Swap13 = 0x9c => (14, 14),
    Swap14 = 0x9d => (15, 15),
    Swap15 = 0x9e => (16, 16),
    Swap16 = 0x9f => (17, 17),

    Log0 = 0xa0 => (2, 0),
    Log1 = 0xa1 => (3, 0),
    Log2 = 0xa2 => (4, 0),
    Log3 = 0xa3 => (5, 0),
    Log4 = 0xa4 => (6, 0),

    // System
    Create = 0xf0 => (3, 1),
    Call = 0xf1 => (7, 1),
    CallCode = 0xf2 => (7, 1),
    Return = 0xf3 => (2, 0),
    DelegateCall = 0xf4 => (6, 1),
    Create2 = 0xf5 => (4, 1),
    StaticCall = 0xfa => (6, 1),
    Revert = 0xfd => (2, 0),
    Invalid = 0xfe => (0, 0),
    SelfDestruct = 0xff => (1, 0),
}

/// Static description of one instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub opcode: Opcode,
    pub name: &'static str,
    pub stack_in: usize,
    pub stack_out: usize,
}

static OPCODE_TABLE: Lazy<[OpInfo; 256]> =
    Lazy::new(|| std::array::from_fn(|byte| Opcode::decode(byte as u8).info()));

impl Opcode {
    /// Decodes an instruction byte, mapping undefined bytes to `INVALID`.
    pub fn decode(byte: u8) -> Self {
        Self::try_from(byte).unwrap_or(Opcode::Invalid)
    }

    /// Returns the table entry for an instruction byte.
    pub fn lookup(byte: u8) -> &'static OpInfo {
        &OPCODE_TABLE[byte as usize]
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn info(self) -> OpInfo {
        let (stack_in, stack_out) = self.stack_io();
        OpInfo {
            opcode: self,
            name: self.name(),
            stack_in,
            stack_out,
        }
    }

    /// Number of immediate bytes following a `PUSHn`.
    pub fn push_size(self) -> Option<usize> {
        let byte = u8::from(self);
        (0x60..=0x7f)
            .contains(&byte)
            .then(|| (byte - 0x5f) as usize)
    }

    /// Depth addressed by a `DUPn`.
    pub fn dup_depth(self) -> Option<usize> {
        let byte = u8::from(self);
        (0x80..=0x8f)
            .contains(&byte)
            .then(|| (byte - 0x7f) as usize)
    }

    /// Depth addressed by a `SWAPn`.
    pub fn swap_depth(self) -> Option<usize> {
        let byte = u8::from(self);
        (0x90..=0x9f)
            .contains(&byte)
            .then(|| (byte - 0x8f) as usize)
    }

    /// Number of topics of a `LOGn`.
    pub fn log_topics(self) -> Option<usize> {
        let byte = u8::from(self);
        (0xa0..=0xa4)
            .contains(&byte)
            .then(|| (byte - 0xa0) as usize)
    }

    /// Whether executing this opcode ends the run without an error.
    pub fn is_halting(self) -> bool {
        matches!(self, Opcode::Stop | Opcode::Return)
    }
}
