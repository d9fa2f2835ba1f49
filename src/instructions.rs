//! # instruction set
//!
//! one function per operation, all with the same shape so the decoder can
//! hand back a plain function pointer. each one only touches the state it is
//! given. by the time a handler runs the PC already points past the word.

use crate::decoder::{kk, n, nnn, x, y};
use crate::display::{HEIGHT, WIDTH};
use crate::error::Chip8Error;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::state::{State, FLAG};

pub type Handler = fn(&mut State, u16) -> Result<(), Chip8Error>;

/// skip the next instruction word
fn skip_if(state: &mut State, cond: bool) {
    if cond {
        state.pc = state.pc.wrapping_add(2);
    }
}

/// (0nnn) SYS machine code routine; ignored
pub fn sys(_state: &mut State, _word: u16) -> Result<(), Chip8Error> {
    Ok(())
}

/// (00E0) CLS
pub fn cls(state: &mut State, _word: u16) -> Result<(), Chip8Error> {
    state.display.clear();
    Ok(())
}

/// (00EE) RET from the current sub-routine
pub fn ret(state: &mut State, _word: u16) -> Result<(), Chip8Error> {
    state.pc = state.stack.pop().ok_or(Chip8Error::StackUnderflow)?;
    Ok(())
}

/// (1nnn) JP addr
pub fn jp(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.pc = nnn(word);
    Ok(())
}

/// (2nnn) CALL sub-routine at addr
pub fn call(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.stack.push(state.pc);
    state.pc = nnn(word);
    Ok(())
}

/// (3xkk) SE Vx, byte
pub fn se_byte(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let cond = state.v[x(word)] == kk(word);
    skip_if(state, cond);
    Ok(())
}

/// (4xkk) SNE Vx, byte
pub fn sne_byte(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let cond = state.v[x(word)] != kk(word);
    skip_if(state, cond);
    Ok(())
}

/// (5xy0) SE Vx, Vy
pub fn se_reg(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let cond = state.v[x(word)] == state.v[y(word)];
    skip_if(state, cond);
    Ok(())
}

/// (6xkk) LD Vx, byte
pub fn ld_byte(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] = kk(word);
    Ok(())
}

/// (7xkk) ADD Vx, byte; wraps and leaves VF alone
pub fn add_byte(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let vx = &mut state.v[x(word)];
    *vx = vx.wrapping_add(kk(word));
    Ok(())
}

/// (8xy0) LD Vx, Vy
pub fn ld_reg(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] = state.v[y(word)];
    Ok(())
}

/// (8xy1) OR Vx, Vy
pub fn or(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] |= state.v[y(word)];
    Ok(())
}

/// (8xy2) AND Vx, Vy
pub fn and(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] &= state.v[y(word)];
    Ok(())
}

/// (8xy3) XOR Vx, Vy
pub fn xor(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] ^= state.v[y(word)];
    Ok(())
}

// the flag is written after the result, so VF as a destination ends up
// holding the flag
fn set_with_flag(state: &mut State, reg: usize, value: u8, flag: bool) {
    state.v[reg] = value;
    state.v[FLAG] = flag as u8;
}

/// (8xy4) ADD Vx, Vy; VF = carry
pub fn add_reg(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let (sum, carry) = state.v[x(word)].overflowing_add(state.v[y(word)]);
    set_with_flag(state, x(word), sum, carry);
    Ok(())
}

/// (8xy5) SUB Vx, Vy; VF = Vx > Vy
pub fn sub(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let (vx, vy) = (state.v[x(word)], state.v[y(word)]);
    set_with_flag(state, x(word), vx.wrapping_sub(vy), vx > vy);
    Ok(())
}

/// (8xy6) SHR Vx; VF = the bit shifted out
pub fn shr(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let vx = state.v[x(word)];
    set_with_flag(state, x(word), vx >> 1, vx & 0x01 == 1);
    Ok(())
}

/// (8xy7) SUBN Vx, Vy; VF = Vy > Vx
pub fn subn(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let (vx, vy) = (state.v[x(word)], state.v[y(word)]);
    set_with_flag(state, x(word), vy.wrapping_sub(vx), vy > vx);
    Ok(())
}

/// (8xyE) SHL Vx; VF = the bit shifted out
pub fn shl(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let vx = state.v[x(word)];
    set_with_flag(state, x(word), vx << 1, (vx >> 7) & 0x01 == 1);
    Ok(())
}

/// (9xy0) SNE Vx, Vy
pub fn sne_reg(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let cond = state.v[x(word)] != state.v[y(word)];
    skip_if(state, cond);
    Ok(())
}

/// (Annn) LD I, addr
pub fn ld_i(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.i = nnn(word);
    Ok(())
}

/// (Bnnn) JP V0, addr
pub fn jp_v0(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.pc = nnn(word) + state.v[0] as u16;
    Ok(())
}

/// (Cxkk) RND Vx, byte
pub fn rnd(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] = state.random_byte() & kk(word);
    Ok(())
}

/// (Dxyn) DRW Vx, Vy, n
///
/// XORs an n-row sprite read from I onto the frame. The origin wraps onto
/// the screen; the rest of the sprite is clipped at the right and bottom
/// edges. VF is set if any lit pixel got switched off. Rows clipped off the
/// bottom are never read from memory.
pub fn drw(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let ox = state.v[x(word)] as usize % WIDTH;
    let oy = state.v[y(word)] as usize % HEIGHT;
    let rows = (n(word) as usize).min(HEIGHT - oy);
    let sprite = state.memory.get_ro_slice(state.i, rows)?;

    let mut collision = false;
    for (row, bits) in sprite.iter().enumerate() {
        let py = oy + row;
        for col in 0..8 {
            let px = ox + col;
            if px >= WIDTH {
                break;
            }
            if bits & (0x80 >> col) != 0 {
                collision |= state.display.flip(px, py);
            }
        }
    }
    state.display.mark_dirty();
    state.v[FLAG] = collision as u8;
    Ok(())
}

/// (Ex9E) SKP Vx
pub fn skp(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let cond = state.keypad.is_pressed(state.v[x(word)]);
    skip_if(state, cond);
    Ok(())
}

/// (ExA1) SKNP Vx
pub fn sknp(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let cond = !state.keypad.is_pressed(state.v[x(word)]);
    skip_if(state, cond);
    Ok(())
}

/// (Fx07) LD Vx, DT
pub fn ld_vx_dt(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.v[x(word)] = state.delay_timer;
    Ok(())
}

/// (Fx0A) LD Vx, K
///
/// With nothing pressed the PC is wound back onto this instruction, so the
/// machine sits here one cycle at a time until a key is down.
pub fn ld_vx_k(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    match state.keypad.first_pressed() {
        Some(key) => state.v[x(word)] = key,
        None => state.pc = state.pc.wrapping_sub(2),
    }
    Ok(())
}

/// (Fx15) LD DT, Vx
pub fn ld_dt_vx(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.delay_timer = state.v[x(word)];
    Ok(())
}

/// (Fx18) LD ST, Vx
pub fn ld_st_vx(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.sound_timer = state.v[x(word)];
    Ok(())
}

/// (Fx1E) ADD I, Vx; no flag
pub fn add_i(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.i = state.i.wrapping_add(state.v[x(word)] as u16);
    Ok(())
}

/// (Fx29) LD F, Vx
pub fn ld_f(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    state.i = Chip8MemoryMap::font_glyph_addr(state.v[x(word)]);
    Ok(())
}

/// (Fx33) LD B, Vx
pub fn ld_b(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let vx = state.v[x(word)];
    state.memory.write(&[vx / 100, vx / 10 % 10, vx % 10], state.i)
}

/// (Fx55) LD [I], Vx; I is left where it was
pub fn store_regs(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let last = x(word);
    state.memory.write(&state.v[..=last], state.i)
}

/// (Fx65) LD Vx, [I]; I is left where it was
pub fn load_regs(state: &mut State, word: u16) -> Result<(), Chip8Error> {
    let last = x(word);
    let bytes = state.memory.get_ro_slice(state.i, last + 1)?;
    state.v[..=last].copy_from_slice(bytes);
    Ok(())
}
