use sha3::{Digest, Keccak256};

use super::{ExecutionContext, VmError};
use crate::{
    integer_ops::Word,
    memory::WORD_SIZE,
};

pub(crate) fn sha3(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let (offset, len) = ctx.pop_region()?;
    let data = ctx.memory.load(offset, len);
    let digest = Keccak256::digest(&data);
    ctx.push(Word::from_big_endian(&digest))
}

pub(crate) fn mload(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let offset = ctx.pop()?;
    let (offset, _) = ctx.region(offset, Word::from(WORD_SIZE))?;
    let value = ctx.memory.load_word(offset);
    ctx.push(value)
}

pub(crate) fn mstore(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let offset = ctx.pop()?;
    let value = ctx.pop()?;
    let (offset, _) = ctx.region(offset, Word::from(WORD_SIZE))?;
    ctx.memory.store_word(offset, value);
    Ok(())
}

pub(crate) fn mstore8(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let offset = ctx.pop()?;
    let value = ctx.pop()?;
    let (offset, _) = ctx.region(offset, Word::one())?;
    ctx.memory.store(offset, 1, &[value.byte(0)], 0);
    Ok(())
}

push_op!(msize, |ctx| Word::from(ctx.memory.len()));
