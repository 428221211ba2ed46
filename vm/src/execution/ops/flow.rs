use super::{ExecutionContext, VmError};
use crate::{integer_ops::Word, opcodes::Opcode};

pub(crate) fn stop(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    ctx.stopped = true;
    Ok(())
}

pub(crate) fn pop(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    ctx.pop().map(drop)
}

pub(crate) fn jumpdest(_ctx: &mut ExecutionContext) -> Result<(), VmError> {
    Ok(())
}

fn jump_to(ctx: &mut ExecutionContext, dest: Word) -> Result<(), VmError> {
    if dest >= Word::from(ctx.code.len()) {
        return Err(VmError::InvalidJump);
    }
    let dest = dest.low_u64() as usize;
    if !ctx.valid_jumps.contains(&dest) {
        return Err(VmError::InvalidJump);
    }
    ctx.pc = dest;
    Ok(())
}

pub(crate) fn jump(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let dest = ctx.pop()?;
    jump_to(ctx, dest)
}

pub(crate) fn jumpi(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let dest = ctx.pop()?;
    let condition = ctx.pop()?;
    if condition.is_zero() {
        return Ok(());
    }
    jump_to(ctx, dest)
}

// The counter was already advanced past this instruction.
push_op!(pc, |ctx| Word::from(ctx.pc - 1));

/// `PUSHn`: reads `n` immediate bytes, zero padding a truncated tail.
pub(crate) fn push(ctx: &mut ExecutionContext, opcode: Opcode) -> Result<(), VmError> {
    let size = opcode.push_size().ok_or(VmError::InternalError)?;
    let start = ctx.pc.min(ctx.code.len());
    let end = (ctx.pc + size).min(ctx.code.len());

    let mut immediate = [0u8; 32];
    immediate[..end - start].copy_from_slice(&ctx.code[start..end]);
    let value = Word::from_big_endian(&immediate[..size]);

    ctx.pc += size;
    ctx.push(value)
}

pub(crate) fn dup(ctx: &mut ExecutionContext, opcode: Opcode) -> Result<(), VmError> {
    let depth = opcode.dup_depth().ok_or(VmError::InternalError)?;
    let value = ctx.peek(depth - 1)?;
    ctx.push(value)
}

pub(crate) fn swap(ctx: &mut ExecutionContext, opcode: Opcode) -> Result<(), VmError> {
    let depth = opcode.swap_depth().ok_or(VmError::InternalError)?;
    let top = ctx.stack.len().checked_sub(1).ok_or(VmError::StackUnderflow)?;
    let other = top.checked_sub(depth).ok_or(VmError::StackUnderflow)?;
    ctx.stack.swap(top, other);
    Ok(())
}
