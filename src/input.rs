use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::warn;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

pub const KEY_COUNT: usize = 16;

/// The 16 virtual keys, 0x0 to 0xF, as pressed or not for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// out-of-range keys are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// lowest-numbered key that is down
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }

    pub fn press(&mut self, key: u8) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = true;
        }
    }
}

impl From<&[u8]> for Keypad {
    fn from(pressed: &[u8]) -> Self {
        let mut keypad = Keypad::new();
        for &key in pressed {
            keypad.press(key);
        }
        keypad
    }
}

/// map of characters read from the terminal to the virtual key, using the
/// left-hand side of a qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report key presses (and auto-repeat), so a key counts as
/// held for this long after its last press
const KEY_HOLD: Duration = Duration::from_millis(150);

/// produces the keypad snapshot once per cycle
pub trait Input {
    fn snapshot(&mut self) -> Result<Keypad, io::Error>;

    /// the user asked to stop the machine
    fn quit_requested(&self) -> bool {
        false
    }
}

/// terminal implementation of Input, using crossterm events
pub struct TermInput {
    keymap: HashMap<char, u8>,
    last_pressed: [Option<Instant>; KEY_COUNT],
    quit: bool,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_pressed: [None; KEY_COUNT],
            quit: false,
        })
    }

    fn read_events(&mut self, now: Instant) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char(c) => match self.keymap.get(&c.to_ascii_lowercase()) {
                        Some(&key) => self.last_pressed[key as usize] = Some(now),
                        None => warn!("can't map {:?} to a virtual key", c),
                    },
                    KeyCode::Esc => self.quit = true,
                    other => warn!("ignoring key event {:?}", other),
                }
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("could not leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn snapshot(&mut self) -> Result<Keypad, io::Error> {
        let now = Instant::now();
        self.read_events(now)?;
        let mut keypad = Keypad::new();
        for (key, pressed) in self.last_pressed.iter().enumerate() {
            if matches!(pressed, Some(at) if now.duration_since(*at) < KEY_HOLD) {
                keypad.press(key as u8);
            }
        }
        Ok(keypad)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing; hands out the queued snapshots in
/// order, then keeps repeating the last one
pub struct DummyInput {
    queue: VecDeque<Keypad>,
    current: Keypad,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            queue: VecDeque::new(),
            current: Keypad::from(keys),
        }
    }

    pub fn scripted(snapshots: impl IntoIterator<Item = Keypad>) -> Self {
        DummyInput {
            queue: snapshots.into_iter().collect(),
            current: Keypad::new(),
        }
    }
}

impl Input for DummyInput {
    fn snapshot(&mut self) -> Result<Keypad, io::Error> {
        if let Some(next) = self.queue.pop_front() {
            self.current = next;
        }
        Ok(self.current)
    }
}
