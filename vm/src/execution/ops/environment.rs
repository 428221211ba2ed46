use super::{
    context::{address_to_word, source_offset},
    ExecutionContext, VmError,
};
use crate::integer_ops::Word;

push_op!(address, |ctx| address_to_word(ctx.address));
push_op!(origin, |ctx| address_to_word(ctx.origin));
push_op!(caller, |ctx| address_to_word(ctx.caller));
// Value transfers and gas accounting do not exist in this machine.
push_op!(callvalue, |ctx| Word::zero());
push_op!(gas, |ctx| Word::zero());
push_op!(codesize, |ctx| Word::from(ctx.code.len()));
push_op!(calldatasize, |ctx| Word::from(ctx.call_data.size()));
push_op!(returndatasize, |ctx| Word::from(ctx.return_value.len()));

pub(crate) fn calldataload(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let position = ctx.pop()?;
    let value = if position > Word::from(ctx.call_data.len()) {
        Word::zero()
    } else {
        ctx.call_data.load_word(position.low_u64() as usize)
    };
    ctx.push(value)
}

pub(crate) fn calldatacopy(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let mem_offset = ctx.pop()?;
    let data_offset = source_offset(ctx.pop()?);
    let len = ctx.pop()?;
    let (mem_offset, len) = ctx.region(mem_offset, len)?;
    if len == 0 {
        return Ok(());
    }
    let bytes = ctx.call_data.read(data_offset, len);
    ctx.memory.store(mem_offset, len, &bytes, 0);
    Ok(())
}

pub(crate) fn codecopy(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let mem_offset = ctx.pop()?;
    let code_offset = source_offset(ctx.pop()?);
    let len = ctx.pop()?;
    let (mem_offset, len) = ctx.region(mem_offset, len)?;
    let state = &mut *ctx.state;
    state.memory.store(mem_offset, len, &state.code, code_offset);
    Ok(())
}

/// Copies from the last return data. Bytes past its end are written as zero.
pub(crate) fn returndatacopy(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let mem_offset = ctx.pop()?;
    let data_offset = source_offset(ctx.pop()?);
    let len = ctx.pop()?;
    let (mem_offset, len) = ctx.region(mem_offset, len)?;
    let state = &mut *ctx.state;
    state
        .memory
        .store(mem_offset, len, &state.return_value, data_offset);
    Ok(())
}
