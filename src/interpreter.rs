//! # interpreter
//!
//! one cycle is:
//!
//!   fetch    read the big-endian word at PC, PC += 2
//!   decode   word -> opcode
//!   execute  the opcode's handler (may move PC again)
//!   tick     delay and sound timers count down towards zero
//!   flush    if the frame changed, hand it to the display
//!
//! `step` does the first four on a bare `State` (`execute` stops short of the
//! tick); `Chip8Interpreter` wraps them with the collaborators (display,
//! input, sound) and wall-clock pacing. the sound cue is read between execute
//! and tick, so a timer set to 1 still sounds for its one tick.
//! nothing here spawns threads: one call, one cycle.

use crate::config::Config;
use crate::decoder::{decode, Opcode};
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Input;
use crate::memory::MemoryMap;
use crate::sound::Sound;
use crate::state::State;
use log::{debug, error, info, trace};
use std::io;
use std::time::Instant;

/// read the word at PC and move past it
pub fn fetch(state: &mut State) -> Result<u16, Chip8Error> {
    let word = state.memory.get_word(state.pc)?;
    state.pc = state.pc.wrapping_add(2);
    Ok(word)
}

/// fetch, decode and execute one instruction; the timers are left alone
pub fn execute(state: &mut State) -> Result<Opcode, Chip8Error> {
    let pc = state.pc;
    let word = fetch(state)?;
    let op = decode(word)?;
    trace!("{:#06x}: {:04x}  {}", pc, word, op);
    (op.handler())(state, word)?;
    Ok(op)
}

/// run one fetch-decode-execute-tick cycle on `state`
///
/// on error the state is left as the failing instruction left it; nothing
/// is rolled back and the timers do not tick.
pub fn step(state: &mut State) -> Result<Opcode, Chip8Error> {
    let op = execute(state)?;
    state.tick_timers();
    Ok(op)
}

pub struct Chip8Interpreter<'a> {
    state: State,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    cycles: u64,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Result<Chip8Interpreter<'a>, Chip8Error> {
        config.validate()?;
        let state = match config.seed {
            Some(seed) => State::with_seed(seed),
            None => State::new(),
        };
        Ok(Chip8Interpreter {
            state,
            display,
            input,
            sound,
            config,
            cycles: 0,
        })
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.state.memory.load_program(reader)
    }

    pub fn load_bytes(&mut self, program: &[u8]) -> Result<usize, Chip8Error> {
        self.state.memory.load_bytes(program)
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// cycles completed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// one full cycle including the collaborators
    pub fn cycle(&mut self) -> Result<Opcode, Chip8Error> {
        self.state.keypad = self.input.snapshot()?;
        let op = execute(&mut self.state)?;
        // the tone sounds for every tick that finds the sound timer running
        let tone = self.state.sound_timer > 0;
        self.state.tick_timers();
        self.cycles += 1;
        self.update_sound(tone)?;
        if self.state.display.take_dirty() {
            debug!("flushing frame after cycle {}", self.cycles);
            self.display.draw(&self.state.display)?;
        }
        Ok(op)
    }

    fn update_sound(&mut self, want: bool) -> Result<(), Chip8Error> {
        if want != self.sound.is_beeping() {
            let res = if want {
                self.sound.beep()
            } else {
                self.sound.stop()
            };
            res.map_err(|e| Chip8Error::Sound(e.to_string()))?;
        }
        Ok(())
    }

    /// run cycles paced to the configured rate until the cycle limit is hit,
    /// input asks to quit, or an instruction fails. returns the number of
    /// cycles run by this call.
    pub fn main_loop(&mut self) -> Result<u64, Chip8Error> {
        let period = self.config.cycle_period();
        let start = self.cycles;
        info!(
            "running at {}Hz, limit {:?} cycles",
            self.config.cycle_hz, self.config.max_cycles
        );
        loop {
            if matches!(self.config.max_cycles, Some(max) if self.cycles - start >= max) {
                info!("cycle limit reached");
                break;
            }
            if self.input.quit_requested() {
                info!("quit requested");
                break;
            }
            let began = Instant::now();
            if let Err(e) = self.cycle() {
                error!(
                    "stopped at pc {:#06x} after {} cycles: {}",
                    self.state.pc, self.cycles, e
                );
                return Err(e);
            }
            if let Some(rest) = period.checked_sub(began.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
        if self.sound.is_beeping() {
            self.sound
                .stop()
                .map_err(|e| Chip8Error::Sound(e.to_string()))?;
        }
        Ok(self.cycles - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::{DummyInput, Keypad};
    use crate::sound::Mute;

    fn state_with(program: &[u8]) -> Result<State, Chip8Error> {
        let mut s = State::with_seed(1);
        s.memory.load_bytes(program)?;
        Ok(s)
    }

    fn fast() -> Config {
        Config {
            cycle_hz: 1_000_000,
            max_cycles: None,
            seed: Some(1),
        }
    }

    #[test]
    fn test_fetch_advances_pc() -> Result<(), Chip8Error> {
        let mut s = state_with(&[0x12, 0x34, 0xab, 0xcd])?;
        assert_eq!(fetch(&mut s)?, 0x1234);
        assert_eq!(s.pc, 0x202);
        assert_eq!(fetch(&mut s)?, 0xabcd);
        assert_eq!(s.pc, 0x204);
        Ok(())
    }

    #[test]
    fn test_fetch_off_the_end() {
        let mut s = State::new();
        s.pc = 0xfff;
        assert!(matches!(
            fetch(&mut s),
            Err(Chip8Error::MemoryOutOfBounds { address: 0xfff, .. })
        ));
    }

    #[test]
    fn test_end_to_end_program() -> Result<(), Chip8Error> {
        // LD V0,5; ADD V0,5; SE V0,5; JP 0x204; LD V1,5
        let program = [0x60, 0x05, 0x70, 0x05, 0x30, 0x05, 0x12, 0x04, 0x61, 0x05];
        let mut s = state_with(&program)?;
        assert_eq!(step(&mut s)?, Opcode::LdByte);
        assert_eq!(step(&mut s)?, Opcode::AddByte);
        assert_eq!(s.v[0], 10);
        assert_eq!(step(&mut s)?, Opcode::SeByte);
        // 10 != 5, no skip
        assert_eq!(s.pc, 0x206);
        assert_eq!(step(&mut s)?, Opcode::Jp);
        assert_eq!(s.pc, 0x204);
        assert_eq!(s.v[0], 10);
        assert_eq!(s.v[1], 0);
        Ok(())
    }

    #[test]
    fn test_invalid_instruction_stops_without_tick() -> Result<(), Chip8Error> {
        let mut s = state_with(&[0x80, 0x08])?;
        s.delay_timer = 5;
        match step(&mut s) {
            Err(Chip8Error::InvalidInstruction { word }) => assert_eq!(word, 0x8008),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.pc, 0x202);
        assert_eq!(s.delay_timer, 5);
        Ok(())
    }

    #[test]
    fn test_ret_on_empty_stack() -> Result<(), Chip8Error> {
        let mut s = state_with(&[0x00, 0xee])?;
        assert!(matches!(step(&mut s), Err(Chip8Error::StackUnderflow)));
        Ok(())
    }

    #[test]
    fn test_call_and_return() -> Result<(), Chip8Error> {
        // 0x200 CALL 0x300; 0x202 LD V2,1 ... 0x300 LD V1,7; 0x302 RET
        let mut s = state_with(&[0x23, 0x00, 0x62, 0x01])?;
        s.memory.write(&[0x61, 0x07, 0x00, 0xee], 0x300)?;
        step(&mut s)?;
        assert_eq!((s.pc, s.stack.len()), (0x300, 1));
        step(&mut s)?;
        step(&mut s)?;
        assert_eq!(s.pc, 0x202);
        assert!(s.stack.is_empty());
        step(&mut s)?;
        assert_eq!((s.v[1], s.v[2]), (7, 1));
        Ok(())
    }

    #[test]
    fn test_timers_tick_each_cycle() -> Result<(), Chip8Error> {
        // LD V0,3; LD DT,V0; LD ST,V0; JP 0x206
        let mut s = state_with(&[0x60, 0x03, 0xf0, 0x15, 0xf0, 0x18, 0x12, 0x06])?;
        step(&mut s)?;
        step(&mut s)?;
        // set, then ticked in the same cycle
        assert_eq!(s.delay_timer, 2);
        step(&mut s)?;
        assert_eq!((s.delay_timer, s.sound_timer), (1, 2));
        for _ in 0..5 {
            step(&mut s)?;
        }
        assert_eq!((s.delay_timer, s.sound_timer), (0, 0));
        Ok(())
    }

    #[test]
    fn test_wait_for_key_across_cycles() -> Result<(), Chip8Error> {
        // LD V4,K; LD V5,1
        let mut s = state_with(&[0xf4, 0x0a, 0x65, 0x01])?;
        for _ in 0..10 {
            assert_eq!(step(&mut s)?, Opcode::LdVxK);
            assert_eq!(s.pc, 0x200);
        }
        s.keypad = Keypad::from(&[0xbu8, 0x6][..]);
        step(&mut s)?;
        assert_eq!(s.v[4], 0x6);
        assert_eq!(s.pc, 0x202);
        assert_eq!(step(&mut s)?, Opcode::LdByte);
        assert_eq!(s.v[5], 1);
        Ok(())
    }

    #[test]
    fn test_interpreter_waits_on_input() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::scripted([
            Keypad::new(),
            Keypad::new(),
            Keypad::new(),
            Keypad::from(&[0x2u8][..]),
        ]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, fast())?;
        i.load_bytes(&[0xf1, 0x0a, 0x12, 0x02])?;
        for _ in 0..3 {
            i.cycle()?;
            assert_eq!(i.state().pc, 0x200);
        }
        i.cycle()?;
        assert_eq!(i.state().pc, 0x202);
        assert_eq!(i.state().v[1], 0x2);
        assert_eq!(i.cycles(), 4);
        Ok(())
    }

    #[test]
    fn test_interpreter_flushes_dirty_frames_once() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, fast())?;
            // CLS; LD I,0 (glyph 0); DRW V0,V0,5; JP 0x206
            i.load_bytes(&[0x00, 0xe0, 0xa0, 0x00, 0xd0, 0x05, 0x12, 0x06])?;
            for _ in 0..6 {
                i.cycle()?;
            }
            assert!(!i.state().display.is_dirty());
        }
        // CLS and DRW; the loop does not redraw
        assert_eq!(display.frames_drawn, 2);
        let frame = display.last_frame.take().expect("a frame was drawn");
        assert!(frame.pixel(0, 0));
        Ok(())
    }

    #[test]
    fn test_interpreter_drives_sound() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, fast())?;
            // LD V0,2; LD ST,V0; JP 0x204
            i.load_bytes(&[0x60, 0x02, 0xf0, 0x18, 0x12, 0x04])?;
            i.cycle()?;
            i.cycle()?;
            assert_eq!(i.state().sound_timer, 1);
            i.cycle()?;
            assert_eq!(i.state().sound_timer, 0);
            // two sounding ticks, then quiet
            assert!(i.sound.is_beeping());
            i.cycle()?;
        }
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
        Ok(())
    }

    #[test]
    fn test_shortest_tone_still_sounds() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, fast())?;
            // LD V0,1; LD ST,V0; JP 0x204
            i.load_bytes(&[0x60, 0x01, 0xf0, 0x18, 0x12, 0x04])?;
            i.cycle()?;
            i.cycle()?;
            assert_eq!(i.state().sound_timer, 0);
            // the tick that took ST from 1 to 0 was a sounding one
            assert!(i.sound.is_beeping());
            i.cycle()?;
            assert!(!i.sound.is_beeping());
        }
        assert_eq!(sound.beeps, 1);
        Ok(())
    }

    #[test]
    fn test_execute_leaves_timers() -> Result<(), Chip8Error> {
        let mut s = state_with(&[0x60, 0x01])?;
        s.delay_timer = 4;
        s.sound_timer = 1;
        assert_eq!(execute(&mut s)?, Opcode::LdByte);
        assert_eq!((s.delay_timer, s.sound_timer), (4, 1));
        Ok(())
    }

    #[test]
    fn test_main_loop_cycle_limit() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let config = Config {
            max_cycles: Some(25),
            ..fast()
        };
        let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, config)?;
        // JP 0x200
        i.load_bytes(&[0x12, 0x00])?;
        assert_eq!(i.main_loop()?, 25);
        assert_eq!(i.cycles(), 25);
        Ok(())
    }

    #[test]
    fn test_main_loop_stops_on_error() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, fast())?;
        // LD V3,9; RET
        i.load_bytes(&[0x63, 0x09, 0x00, 0xee])?;
        assert!(matches!(i.main_loop(), Err(Chip8Error::StackUnderflow)));
        assert_eq!(i.cycles(), 1);
        assert_eq!(i.state().v[3], 9);
        Ok(())
    }

    #[test]
    fn test_bad_config_rejected() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let config = Config {
            cycle_hz: 0,
            ..Config::default()
        };
        assert!(Chip8Interpreter::new(&mut display, &mut input, &mut sound, config).is_err());
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut i = Chip8Interpreter::new(&mut display, &mut input, &mut sound, fast())?;
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(i.load_program(&mut prog)?, 2);
        assert!(matches!(
            i.load_bytes(&[0; 0xe01]),
            Err(Chip8Error::ProgramTooLarge { .. })
        ));
        Ok(())
    }
}
