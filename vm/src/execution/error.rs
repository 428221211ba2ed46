use thiserror::Error;

use crate::host::HostError;

/// Exceptions raised while executing a single instruction.
///
/// Each variant carries the error number written into traces and state
/// hashes; zero is reserved for a successful step.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
pub enum VmError {
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("invalid opcode")]
    InvalidOpcode,
    #[error("invalid JUMP")]
    InvalidJump,
    #[error("instruction not supported")]
    InstructionNotSupported,
    #[error("revert")]
    Revert,
    #[error("static state change")]
    StaticStateChange,
    #[error("out of gas")]
    OutOfGas,
    #[error("internal error")]
    InternalError,
}

impl VmError {
    pub const fn errno(self) -> u8 {
        match self {
            VmError::StackOverflow => 0x01,
            VmError::StackUnderflow => 0x02,
            VmError::InvalidOpcode => 0x04,
            VmError::InvalidJump => 0x05,
            VmError::InstructionNotSupported => 0x06,
            VmError::Revert => 0x07,
            VmError::StaticStateChange => 0x0b,
            VmError::OutOfGas => 0x0d,
            VmError::InternalError => 0xff,
        }
    }

    /// Maps a non-zero error number back to its variant. Unknown numbers
    /// collapse into [`VmError::InternalError`].
    pub const fn from_errno(errno: u8) -> Option<Self> {
        Some(match errno {
            0x00 => return None,
            0x01 => VmError::StackOverflow,
            0x02 => VmError::StackUnderflow,
            0x04 => VmError::InvalidOpcode,
            0x05 => VmError::InvalidJump,
            0x06 => VmError::InstructionNotSupported,
            0x07 => VmError::Revert,
            0x0b => VmError::StaticStateChange,
            0x0d => VmError::OutOfGas,
            _ => VmError::InternalError,
        })
    }
}

impl From<HostError> for VmError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Unsupported => VmError::InstructionNotSupported,
            HostError::Failed(_) => VmError::InternalError,
        }
    }
}
