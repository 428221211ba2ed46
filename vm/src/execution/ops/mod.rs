//! Instruction handlers, grouped by family.

#[macro_use]
mod macros;

mod arithmetic;
mod bitwise;
mod environment;
mod flow;
mod memory;
mod system;

use tracing::instrument;

use super::{context, ExecutionContext, VmError};
use crate::opcodes::Opcode;

impl Opcode {
    /// Executes this instruction against the context. The program counter
    /// already points past the opcode byte.
    #[instrument(level = "trace", skip(ctx), fields(pc = ctx.pc - 1, depth = ctx.stack.len()))]
    pub(crate) fn execute(self, ctx: &mut ExecutionContext) -> Result<(), VmError> {
        match self {
            Opcode::Stop => flow::stop(ctx),
            Opcode::Add => arithmetic::add(ctx),
            Opcode::Mul => arithmetic::mul(ctx),
            Opcode::Sub => arithmetic::sub(ctx),
            Opcode::Div => arithmetic::div(ctx),
            Opcode::SDiv => arithmetic::sdiv(ctx),
            Opcode::Mod => arithmetic::modulo(ctx),
            Opcode::SMod => arithmetic::smod(ctx),
            Opcode::AddMod => arithmetic::addmod(ctx),
            Opcode::MulMod => arithmetic::mulmod(ctx),
            Opcode::Exp => arithmetic::exp(ctx),
            Opcode::SignExtend => arithmetic::signextend(ctx),

            Opcode::Lt => bitwise::lt(ctx),
            Opcode::Gt => bitwise::gt(ctx),
            Opcode::Slt => bitwise::slt(ctx),
            Opcode::Sgt => bitwise::sgt(ctx),
            Opcode::Eq => bitwise::eq(ctx),
            Opcode::IsZero => bitwise::iszero(ctx),
            Opcode::And => bitwise::and(ctx),
            Opcode::Or => bitwise::or(ctx),
            Opcode::Xor => bitwise::xor(ctx),
            Opcode::Not => bitwise::not(ctx),
            Opcode::Byte => bitwise::byte(ctx),
            Opcode::Shl => bitwise::shl(ctx),
            Opcode::Shr => bitwise::shr(ctx),
            Opcode::Sar => bitwise::sar(ctx),

            Opcode::Sha3 => memory::sha3(ctx),

            Opcode::Address => environment::address(ctx),
            Opcode::Origin => environment::origin(ctx),
            Opcode::Caller => environment::caller(ctx),
            Opcode::CallValue => environment::callvalue(ctx),
            Opcode::CallDataLoad => environment::calldataload(ctx),
            Opcode::CallDataSize => environment::calldatasize(ctx),
            Opcode::CallDataCopy => environment::calldatacopy(ctx),
            Opcode::CodeSize => environment::codesize(ctx),
            Opcode::CodeCopy => environment::codecopy(ctx),
            Opcode::ReturnDataSize => environment::returndatasize(ctx),
            Opcode::ReturnDataCopy => environment::returndatacopy(ctx),

            Opcode::Pop => flow::pop(ctx),
            Opcode::MLoad => memory::mload(ctx),
            Opcode::MStore => memory::mstore(ctx),
            Opcode::MStore8 => memory::mstore8(ctx),
            Opcode::SLoad => system::sload(ctx),
            Opcode::SStore => system::sstore(ctx),
            Opcode::Jump => flow::jump(ctx),
            Opcode::JumpI => flow::jumpi(ctx),
            Opcode::Pc => flow::pc(ctx),
            Opcode::MSize => memory::msize(ctx),
            Opcode::Gas => environment::gas(ctx),
            Opcode::JumpDest => flow::jumpdest(ctx),

            op if op.push_size().is_some() => flow::push(ctx, op),
            op if op.dup_depth().is_some() => flow::dup(ctx, op),
            op if op.swap_depth().is_some() => flow::swap(ctx, op),
            op if op.log_topics().is_some() => system::log(ctx, op),

            Opcode::Call => system::call(ctx),
            Opcode::StaticCall => system::staticcall(ctx),
            Opcode::Return => system::return_(ctx),
            Opcode::Revert => system::revert(ctx),
            Opcode::Invalid => system::invalid(ctx),

            // Account, chain and contract creation instructions.
            Opcode::Balance
            | Opcode::GasPrice
            | Opcode::ExtCodeSize
            | Opcode::ExtCodeCopy
            | Opcode::ExtCodeHash
            | Opcode::BlockHash
            | Opcode::Coinbase
            | Opcode::Timestamp
            | Opcode::Number
            | Opcode::Difficulty
            | Opcode::GasLimit
            | Opcode::Create
            | Opcode::CallCode
            | Opcode::DelegateCall
            | Opcode::Create2
            | Opcode::SelfDestruct => system::unsupported(ctx),

            _ => system::invalid(ctx),
        }
    }
}
