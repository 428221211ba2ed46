use std::fmt;

use crate::{execution::VmError, opcodes::Opcode};

/// Per-opcode execution counters.
#[derive(Debug, Clone)]
pub struct ExecutionStats {
    counts: [u64; 256],
    steps: u64,
    errors: u64,
}

impl Default for ExecutionStats {
    fn default() -> Self {
        Self {
            counts: [0; 256],
            steps: 0,
            errors: 0,
        }
    }
}

impl ExecutionStats {
    pub(crate) fn record(&mut self, opcode: Opcode, error: Option<VmError>) {
        self.counts[u8::from(opcode) as usize] += 1;
        self.steps += 1;
        if error.is_some() {
            self.errors += 1;
        }
    }

    pub fn count(&self, opcode: Opcode) -> u64 {
        self.counts[u8::from(opcode) as usize]
    }

    pub const fn total_steps(&self) -> u64 {
        self.steps
    }

    pub const fn failed_steps(&self) -> u64 {
        self.errors
    }

    /// Executed opcodes, most frequent first.
    pub fn most_frequent(&self) -> Vec<(Opcode, u64)> {
        let mut executed = (0..=255u8)
            .filter_map(|byte| {
                let opcode = Opcode::try_from(byte).ok()?;
                let count = self.count(opcode);
                (count > 0).then_some((opcode, count))
            })
            .collect::<Vec<_>>();
        executed.sort_by(|a, b| b.1.cmp(&a.1).then(u8::from(a.0).cmp(&u8::from(b.0))));
        executed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for ExecutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "steps: {}, failed: {}", self.steps, self.errors)?;
        for (opcode, count) in self.most_frequent() {
            writeln!(f, "  {:<14} {count}", opcode.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_ordering() {
        let mut stats = ExecutionStats::default();
        stats.record(Opcode::Push1, None);
        stats.record(Opcode::Push1, None);
        stats.record(Opcode::Add, None);
        stats.record(Opcode::Jump, Some(VmError::InvalidJump));

        assert_eq!(stats.total_steps(), 4);
        assert_eq!(stats.failed_steps(), 1);
        assert_eq!(stats.count(Opcode::Push1), 2);
        assert_eq!(
            stats.most_frequent(),
            vec![(Opcode::Push1, 2), (Opcode::Add, 1), (Opcode::Jump, 1)]
        );
        assert!(stats.to_string().contains("PUSH1"));

        stats.reset();
        assert_eq!(stats.total_steps(), 0);
    }
}
