//! # chip8-vm
//!
//! An interpreter for CHIP-8 programs: 4K of memory, sixteen 8 bit
//! registers, two 60Hz-style timers and a 64x32 monochrome screen.
//!
//! ## Design
//!
//! * one owned `State` passed to every instruction; no globals
//! * decoding is a pure mapping from instruction word to `Opcode`, and each
//!   opcode names a plain handler function
//! * one call to `step` / `Chip8Interpreter::cycle` is one instruction;
//!   pacing against wall-clock time belongs to the owner (`main_loop`)
//! * failures (bad instruction, RET on an empty stack, memory overrun) come
//!   back as `Chip8Error`; the state is left exactly as the failure found it
//! * waiting for a key is done by winding the PC back, so the machine never
//!   blocks inside a cycle
//! * display, input and audio sit behind traits so the interpreter doesn't
//!   need to know how the screen, keyboard or speaker work
//!
//! Model
//!
//! Chip8Interpreter
//!  |-- State: memory (font at 0x000, program at 0x200), V0-VF, I, PC,
//!  |          timers, call stack, frame buffer, keypad, rng
//!  |-- Display   <- frame buffer, when dirty
//!  |-- Input     -> keypad snapshot, once per cycle
//!  `-- Sound     <- sound timer > 0
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod input;
pub mod instructions;
pub mod interpreter;
pub mod memory;
pub mod sound;
pub mod state;

pub use config::Config;
pub use error::Chip8Error;
pub use interpreter::{execute, step, Chip8Interpreter};
pub use state::State;
