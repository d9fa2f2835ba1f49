use std::io;
use thiserror::Error;

/// everything that can stop the interpreter
#[derive(Debug, Error)]
pub enum Chip8Error {
    /// unrecognised sub-opcode within a known instruction group
    #[error("invalid instruction: {word:#06X}")]
    InvalidInstruction { word: u16 },

    /// RET with nothing on the call stack
    #[error("stack underflow: return with empty call stack")]
    StackUnderflow,

    #[error("program is too large ({size} bytes), capacity is {capacity} bytes")]
    ProgramTooLarge { size: usize, capacity: usize },

    #[error("memory access out of bounds: {len} byte(s) at {address:#06X}")]
    MemoryOutOfBounds { address: u16, len: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("sound error: {0}")]
    Sound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
