use std::ops::{Deref, DerefMut};

use ethereum_types::{H160, H256};

use super::{RunState, VmError};
use crate::{
    config::VmConfig,
    host::HostEnvironment,
    integer_ops::{word_to_be, Word},
    memory::to_region,
};

/// Everything an instruction handler may touch while executing.
pub(crate) struct ExecutionContext<'a> {
    pub state: &'a mut RunState,
    pub host: &'a mut dyn HostEnvironment,
    pub config: &'a VmConfig,
}

impl Deref for ExecutionContext<'_> {
    type Target = RunState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for ExecutionContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        state: &'a mut RunState,
        host: &'a mut dyn HostEnvironment,
        config: &'a VmConfig,
    ) -> Self {
        Self {
            state,
            host,
            config,
        }
    }

    /// Pops an `(offset, length)` pair, offset on top.
    pub fn pop_region(&mut self) -> Result<(usize, usize), VmError> {
        let offset = self.pop()?;
        let len = self.pop()?;
        self.region(offset, len)
    }

    pub fn region(&self, offset: Word, len: Word) -> Result<(usize, usize), VmError> {
        to_region(offset, len, self.config.max_memory_bytes)
    }

    pub fn pop_h256(&mut self) -> Result<H256, VmError> {
        self.pop().map(|value| H256(word_to_be(value)))
    }
}

pub(crate) fn word_to_address(value: Word) -> H160 {
    H160::from_slice(&word_to_be(value)[12..])
}

pub(crate) fn address_to_word(address: H160) -> Word {
    Word::from_big_endian(address.as_bytes())
}

/// Source offsets past the addressable range saturate; every byte read
/// from there is zero.
pub(crate) fn source_offset(value: Word) -> usize {
    if value > Word::from(usize::MAX) {
        usize::MAX
    } else {
        value.low_u64() as usize
    }
}
