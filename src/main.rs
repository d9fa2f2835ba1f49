use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use chip8_vm::config::{Config, DEFAULT_CYCLE_HZ};
use chip8_vm::display::MonoTermDisplay;
use chip8_vm::input::TermInput;
use chip8_vm::interpreter::Chip8Interpreter;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};

#[derive(Parser, Debug)]
#[command(name = "chip8-vm", about = "Run a CHIP-8 program in the terminal")]
struct Args {
    /// program image to load at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_CYCLE_HZ)]
    hz: u32,

    /// stop after this many instructions
    #[arg(long)]
    cycles: Option<u64>,

    /// seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// don't beep
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = Config {
        cycle_hz: args.hz,
        max_cycles: args.cycles,
        seed: args.seed,
    };

    // open the program before touching the terminal, so errors stay readable
    let mut f = File::open(&args.rom)?;

    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new()?;
    let mut beeper = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beeper };
    let mut interpreter = Chip8Interpreter::new(&mut display, &mut input, sound, config)?;

    let len = interpreter.load_program(&mut f)?;
    info!("loaded {} ({} bytes)", args.rom.display(), len);
    let result = interpreter.main_loop();
    drop(interpreter);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    let ran = result?;
    info!("ran {} cycles", ran);
    Ok(())
}
