use crate::error::Chip8Error;
use std::time::Duration;

/// roughly the 1.43ms per instruction the machine is usually paced at
pub const DEFAULT_CYCLE_HZ: u32 = 700;

/// how the owner runs the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// instructions per second of wall-clock time
    pub cycle_hz: u32,
    /// stop after this many cycles; run until told otherwise if unset
    pub max_cycles: Option<u64>,
    /// fixed seed for RND; fresh entropy if unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle_hz: DEFAULT_CYCLE_HZ,
            max_cycles: None,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Chip8Error> {
        if self.cycle_hz == 0 {
            return Err(Chip8Error::InvalidConfig(
                "cycle rate must be at least 1Hz".to_string(),
            ));
        }
        Ok(())
    }

    /// wall-clock budget for one cycle
    pub fn cycle_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.cycle_hz.max(1) as u64)
    }
}
