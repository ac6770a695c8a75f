//! Memory budget the caches are carved out of.

use sysinfo::System;

/// Used when the platform reports no available memory.
const FALLBACK_BUDGET_BYTES: u64 = 512 * 1024 * 1024;

/// Total bytes the process is willing to devote to in-memory caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    total_bytes: u64,
}

impl MemoryBudget {
    #[must_use]
    pub const fn from_bytes(total_bytes: u64) -> Self {
        Self { total_bytes }
    }

    #[must_use]
    pub const fn from_megabytes(megabytes: u64) -> Self {
        Self { total_bytes: megabytes.saturating_mul(1024 * 1024) }
    }

    /// Budget equal to the memory currently available on this machine.
    #[must_use]
    pub fn detect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let available = system.available_memory();
        if available == 0 {
            tracing::warn!(
                fallback_bytes = FALLBACK_BUDGET_BYTES,
                "could not determine available memory, using fallback budget"
            );
            return Self::from_bytes(FALLBACK_BUDGET_BYTES);
        }
        tracing::debug!(available_bytes = available, "detected available memory");
        Self::from_bytes(available)
    }

    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes corresponding to `fraction` of the budget, clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn share(&self, fraction: f64) -> usize {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let bytes = (self.total_bytes as f64 * fraction).floor();
        usize::try_from(bytes as u64).unwrap_or(usize::MAX)
    }
}
