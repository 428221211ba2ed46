use tracing::debug;

use super::{ExecutionContext, VmError};
use crate::{
    execution::{context::word_to_address, LogEntry},
    integer_ops::{bool_word, Word},
    opcodes::Opcode,
    precompiles::is_builtin,
};

pub(crate) fn sload(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let key = ctx.pop_h256()?;
    let value = ctx.host.storage_load(ctx.state.address, key)?;
    ctx.push(Word::from_big_endian(value.as_bytes()))
}

pub(crate) fn sstore(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    if ctx.is_static {
        return Err(VmError::StaticStateChange);
    }
    let key = ctx.pop_h256()?;
    let value = ctx.pop_h256()?;
    ctx.host.storage_store(ctx.state.address, key, value)?;
    Ok(())
}

/// `LOGn`: the payload is read from memory as is, without growing it.
pub(crate) fn log(ctx: &mut ExecutionContext, opcode: Opcode) -> Result<(), VmError> {
    if ctx.is_static {
        return Err(VmError::StaticStateChange);
    }
    let topic_count = opcode.log_topics().ok_or(VmError::InternalError)?;
    let (offset, len) = ctx.pop_region()?;
    let topics = (0..topic_count)
        .map(|_| ctx.pop_h256())
        .collect::<Result<Vec<_>, _>>()?;

    let entry = LogEntry {
        address: ctx.address,
        topics,
        data: ctx.memory.peek(offset, len),
    };
    ctx.logs.push(entry);
    Ok(())
}

struct CallFrame {
    target: Word,
    input: (usize, usize),
    output: (usize, usize),
}

/// Target word of a pending call, still on the stack below the gas.
fn call_target(ctx: &ExecutionContext) -> Result<Word, VmError> {
    ctx.peek(1)
}

fn is_reachable(ctx: &ExecutionContext, target: Word) -> bool {
    is_builtin(target) || ctx.host.supports_calls()
}

/// An unreachable target fails before any operand is consumed.
pub(crate) fn call(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    if !is_reachable(ctx, call_target(ctx)?) {
        return Err(VmError::InstructionNotSupported);
    }
    let _gas = ctx.pop()?;
    let target = ctx.pop()?;
    let _value = ctx.pop()?;
    let input = ctx.pop_region()?;
    let output = ctx.pop_region()?;
    dispatch_call(
        ctx,
        CallFrame {
            target,
            input,
            output,
        },
    )
}

/// An unreachable target consumes the six operands, pushes a failed status
/// and clears the return data without touching memory.
pub(crate) fn staticcall(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    if !is_reachable(ctx, call_target(ctx)?) {
        let depth = ctx.stack.len().saturating_sub(6);
        ctx.stack.truncate(depth);
        ctx.return_value.clear();
        ctx.push(Word::zero())?;
        return Err(VmError::InstructionNotSupported);
    }
    let _gas = ctx.pop()?;
    let target = ctx.pop()?;
    let input = ctx.pop_region()?;
    let output = ctx.pop_region()?;
    dispatch_call(
        ctx,
        CallFrame {
            target,
            input,
            output,
        },
    )
}

/// Routes a call to a precompile when the target is a reserved address and
/// to the host otherwise. A non-empty output is written to the output region
/// with the rest of that region zeroed, and becomes the current return data.
fn dispatch_call(ctx: &mut ExecutionContext, frame: CallFrame) -> Result<(), VmError> {
    let (in_offset, in_len) = frame.input;
    let data = ctx.memory.load(in_offset, in_len);
    let to = word_to_address(frame.target);

    let precompile = if is_builtin(frame.target) {
        ctx.host.precompile(to)
    } else {
        None
    };
    let (success, return_data) = match precompile {
        Some(precompile) => {
            let output = precompile.call(&data);
            debug!(
                precompile = precompile.name(),
                success = output.success,
                "precompile call"
            );
            (output.success, output.return_value)
        }
        None => {
            let outcome = ctx.host.handle_call(ctx.state.address, to, &data)?;
            ctx.state.logs.extend(outcome.logs);
            match outcome.return_data {
                Some(return_data) => (true, return_data),
                None => (false, Vec::new()),
            }
        }
    };

    let (out_offset, out_len) = frame.output;
    ctx.memory.expand(out_offset, out_len);
    if !return_data.is_empty() {
        ctx.memory.store(out_offset, out_len, &return_data, 0);
    }
    ctx.return_value = return_data;
    ctx.push(bool_word(success))
}

pub(crate) fn return_(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let (offset, len) = ctx.pop_region()?;
    ctx.return_value = ctx.memory.load(offset, len);
    ctx.stopped = true;
    Ok(())
}

/// Keeps the reverted payload as return data and fails the step.
pub(crate) fn revert(ctx: &mut ExecutionContext) -> Result<(), VmError> {
    let (offset, len) = ctx.pop_region()?;
    ctx.return_value = ctx.memory.load(offset, len);
    Err(VmError::Revert)
}

pub(crate) fn invalid(_ctx: &mut ExecutionContext) -> Result<(), VmError> {
    Err(VmError::InvalidOpcode)
}

pub(crate) fn unsupported(_ctx: &mut ExecutionContext) -> Result<(), VmError> {
    Err(VmError::InstructionNotSupported)
}
