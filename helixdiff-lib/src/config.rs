use crate::error::{CompareError, Result};
use std::thread;

/// Tunables for the sequence differencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    /// Bases compared per fast-path window.
    pub window_len: usize,
    /// Bases on each side a realignment may consume before giving up.
    pub realign_len: usize,
    /// Maximum distance from the diagonal explored by the realignment.
    pub band: usize,
    /// Identical bases required after a divergence to call the sequences resynchronized.
    pub anchor_len: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            window_len: 4096,
            realign_len: 256,
            band: 32,
            anchor_len: 16,
        }
    }
}

impl DiffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_len == 0 || self.realign_len == 0 || self.band == 0 || self.anchor_len == 0 {
            return Err(CompareError::invalid_input(
                "window, realignment, band and anchor lengths must all be positive",
            ));
        }
        if self.band > self.realign_len {
            return Err(CompareError::invalid_input(format!(
                "band ({}) cannot exceed the realignment length ({})",
                self.band, self.realign_len
            )));
        }
        Ok(())
    }
}

/// Reference chromosome-23 lengths, in bases, used to infer genetic sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SexBands {
    pub x_len: usize,
    pub y_len: usize,
}

impl Default for SexBands {
    fn default() -> Self {
        SexBands {
            x_len: 156_000_000,
            y_len: 57_000_000,
        }
    }
}

impl SexBands {
    pub fn validate(&self) -> Result<()> {
        if self.x_len == 0 || self.y_len == 0 {
            return Err(CompareError::invalid_input("reference chromosome lengths must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareConfig {
    pub diff: DiffConfig,
    pub sex: SexBands,
    /// Worker threads used by `compare_parallel`.
    pub threads: usize,
}

pub fn default_threads() -> usize {
    let n_threads: usize = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    n_threads.min(crate::compare::NUM_CHROMOSOMES)
}

impl Default for CompareConfig {
    fn default() -> Self {
        CompareConfig {
            diff: DiffConfig::default(),
            sex: SexBands::default(),
            threads: default_threads(),
        }
    }
}

impl CompareConfig {
    pub fn validate(&self) -> Result<()> {
        self.diff.validate()?;
        self.sex.validate()?;
        if self.threads == 0 {
            return Err(CompareError::invalid_input("at least one worker thread is required"));
        }
        Ok(())
    }
}
