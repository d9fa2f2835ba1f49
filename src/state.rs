use crate::display::FrameBuffer;
use crate::input::Keypad;
use crate::memory::Chip8MemoryMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry / borrow / collision flag
pub const FLAG: usize = 0xf;

/// Everything a CHIP-8 program can see or touch. One instance lives for the
/// whole run and is handed to every instruction.
///
/// Between cycles the owner may write `keypad` and read `display` and
/// `sound_timer`; nothing else is meant to be poked from outside.
#[derive(Clone)]
pub struct State {
    pub memory: Chip8MemoryMap,
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: Vec<u16>,
    pub display: FrameBuffer,
    pub keypad: Keypad,
    rng: StdRng,
}

impl State {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// deterministic random source, for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let memory = Chip8MemoryMap::new();
        let pc = memory.program_addr;
        State {
            memory,
            v: [0; REGISTER_COUNT],
            i: 0,
            pc,
            delay_timer: 0,
            sound_timer: 0,
            stack: Vec::new(),
            display: FrameBuffer::new(),
            keypad: Keypad::new(),
            rng,
        }
    }

    pub fn random_byte(&mut self) -> u8 {
        self.rng.gen()
    }

    /// count both timers down by one, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
