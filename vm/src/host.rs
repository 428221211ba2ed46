//! The ledger seam of the interpreter.
//!
//! Storage access and calls to other contracts are delegated to a
//! [`HostEnvironment`]. The interpreter itself never owns account state.

use ahash::AHashMap;
use ethereum_types::{H160, H256};
use thiserror::Error;

use crate::{
    execution::LogEntry,
    precompiles::{self, Precompile},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("operation is not supported by this host")]
    Unsupported,
    #[error("host failure: {0}")]
    Failed(String),
}

/// Result of a call handled by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOutcome {
    /// `None` when the call failed; the caller then sees status 0 and empty
    /// return data.
    pub return_data: Option<Vec<u8>>,
    pub logs: Vec<LogEntry>,
}

impl CallOutcome {
    pub fn success(return_data: Vec<u8>) -> Self {
        Self {
            return_data: Some(return_data),
            logs: Vec::new(),
        }
    }

    pub fn failure() -> Self {
        Self::default()
    }

    pub fn with_logs(mut self, logs: Vec<LogEntry>) -> Self {
        self.logs = logs;
        self
    }
}

/// External environment of a run.
///
/// Every method defaults to [`HostError::Unsupported`], so a host only
/// implements what it provides.
pub trait HostEnvironment: Send {
    fn storage_load(&self, _address: H160, _key: H256) -> Result<H256, HostError> {
        Err(HostError::Unsupported)
    }

    fn storage_store(&mut self, _address: H160, _key: H256, _value: H256) -> Result<(), HostError> {
        Err(HostError::Unsupported)
    }

    /// Whether [`HostEnvironment::handle_call`] serves calls to non-precompile
    /// targets. When it does not, such calls fail before touching memory.
    fn supports_calls(&self) -> bool {
        false
    }

    /// Executes a call from `sender` to `to` with `data` as input.
    fn handle_call(&mut self, _sender: H160, _to: H160, _data: &[u8]) -> Result<CallOutcome, HostError> {
        Err(HostError::Unsupported)
    }

    fn precompile(&self, address: H160) -> Option<&dyn Precompile> {
        precompiles::builtin(address)
    }
}

/// Host without storage or external calls. Only the built-in precompiles
/// are reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseHost;

impl HostEnvironment for BaseHost {}

pub type CallHandler = Box<dyn FnMut(H160, &[u8]) -> CallOutcome + Send>;

/// In-memory ledger: a storage map per address and a call handler per
/// target address. Calls to addresses without a handler fail.
#[derive(Default)]
pub struct MemoryHost {
    storage: AHashMap<(H160, H256), H256>,
    handlers: AHashMap<H160, CallHandler>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, address: H160, key: H256, value: H256) -> Self {
        self.storage.insert((address, key), value);
        self
    }

    pub fn register(
        &mut self,
        target: H160,
        handler: impl FnMut(H160, &[u8]) -> CallOutcome + Send + 'static,
    ) {
        self.handlers.insert(target, Box::new(handler));
    }

    /// Current value of a slot; unset slots read as zero.
    pub fn storage(&self, address: H160, key: H256) -> H256 {
        self.storage
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("storage", &self.storage)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HostEnvironment for MemoryHost {
    fn storage_load(&self, address: H160, key: H256) -> Result<H256, HostError> {
        Ok(self.storage(address, key))
    }

    fn storage_store(&mut self, address: H160, key: H256, value: H256) -> Result<(), HostError> {
        self.storage.insert((address, key), value);
        Ok(())
    }

    fn supports_calls(&self) -> bool {
        true
    }

    fn handle_call(&mut self, sender: H160, to: H160, data: &[u8]) -> Result<CallOutcome, HostError> {
        Ok(match self.handlers.get_mut(&to) {
            Some(handler) => handler(sender, data),
            None => CallOutcome::failure(),
        })
    }
}
