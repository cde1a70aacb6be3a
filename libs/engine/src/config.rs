use std::time::Duration;

pub const DEFAULT_EMIT_DELAY_SECS: u64 = 5;
pub const DEFAULT_FAILURE_THRESHOLD: u8 = 90;

/// Fault injection: запись портится, если бросок 1..=100 больше `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultConfig {
    pub enabled: bool,
    pub threshold: u8,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl FaultConfig {
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    /// Every draw exceeds a zero threshold.
    pub fn always() -> Self {
        Self { enabled: true, threshold: 0 }
    }
}

/// Immutable settings of a [`crate::BatchRunner`], fixed at construction.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Пауза между записями (не после последней).
    pub emit_delay: Duration,
    pub faults: FaultConfig,
    /// `None`: RNG из entropy на каждый run. `Some`: воспроизводимая
    /// последовательность batch'ей одного runner'а.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            emit_delay: Duration::from_secs(DEFAULT_EMIT_DELAY_SECS),
            faults: FaultConfig::default(),
            seed: None,
        }
    }
}
