//! # decoder
//!
//! instruction words are 16 bits, big-endian in memory, laid out as one of:
//!
//!   oxyn   o = class nibble, x/y = register indices, n = 4 bit immediate
//!   oxkk   kk = 8 bit immediate
//!   onnn   nnn = 12 bit address
//!
//! the class nibble picks the group; groups 0, 8, E and F share a class
//! between several operations and dispatch again on the low byte or nibble.

use crate::error::Chip8Error;
use crate::instructions::{self, Handler};
use std::fmt;

#[inline]
pub fn class(word: u16) -> u8 {
    (word >> 12) as u8
}

#[inline]
pub fn x(word: u16) -> usize {
    ((word & 0x0f00) >> 8) as usize
}

#[inline]
pub fn y(word: u16) -> usize {
    ((word & 0x00f0) >> 4) as usize
}

#[inline]
pub fn n(word: u16) -> u8 {
    (word & 0x000f) as u8
}

#[inline]
pub fn kk(word: u16) -> u8 {
    (word & 0x00ff) as u8
}

#[inline]
pub fn nnn(word: u16) -> u16 {
    word & 0x0fff
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// 0nnn
    Sys,
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp,
    /// 2nnn
    Call,
    /// 3xkk
    SeByte,
    /// 4xkk
    SneByte,
    /// 5xy0
    SeReg,
    /// 6xkk
    LdByte,
    /// 7xkk
    AddByte,
    /// 8xy0
    LdReg,
    /// 8xy1
    Or,
    /// 8xy2
    And,
    /// 8xy3
    Xor,
    /// 8xy4
    AddReg,
    /// 8xy5
    Sub,
    /// 8xy6
    Shr,
    /// 8xy7
    Subn,
    /// 8xyE
    Shl,
    /// 9xy0
    SneReg,
    /// Annn
    LdI,
    /// Bnnn
    JpV0,
    /// Cxkk
    Rnd,
    /// Dxyn
    Drw,
    /// Ex9E
    Skp,
    /// ExA1
    Sknp,
    /// Fx07
    LdVxDt,
    /// Fx0A
    LdVxK,
    /// Fx15
    LdDtVx,
    /// Fx18
    LdStVx,
    /// Fx1E
    AddI,
    /// Fx29
    LdF,
    /// Fx33
    LdB,
    /// Fx55
    StoreRegs,
    /// Fx65
    LoadRegs,
}

impl Opcode {
    /// the function that carries out this operation
    pub fn handler(self) -> Handler {
        match self {
            Opcode::Sys => instructions::sys,
            Opcode::Cls => instructions::cls,
            Opcode::Ret => instructions::ret,
            Opcode::Jp => instructions::jp,
            Opcode::Call => instructions::call,
            Opcode::SeByte => instructions::se_byte,
            Opcode::SneByte => instructions::sne_byte,
            Opcode::SeReg => instructions::se_reg,
            Opcode::LdByte => instructions::ld_byte,
            Opcode::AddByte => instructions::add_byte,
            Opcode::LdReg => instructions::ld_reg,
            Opcode::Or => instructions::or,
            Opcode::And => instructions::and,
            Opcode::Xor => instructions::xor,
            Opcode::AddReg => instructions::add_reg,
            Opcode::Sub => instructions::sub,
            Opcode::Shr => instructions::shr,
            Opcode::Subn => instructions::subn,
            Opcode::Shl => instructions::shl,
            Opcode::SneReg => instructions::sne_reg,
            Opcode::LdI => instructions::ld_i,
            Opcode::JpV0 => instructions::jp_v0,
            Opcode::Rnd => instructions::rnd,
            Opcode::Drw => instructions::drw,
            Opcode::Skp => instructions::skp,
            Opcode::Sknp => instructions::sknp,
            Opcode::LdVxDt => instructions::ld_vx_dt,
            Opcode::LdVxK => instructions::ld_vx_k,
            Opcode::LdDtVx => instructions::ld_dt_vx,
            Opcode::LdStVx => instructions::ld_st_vx,
            Opcode::AddI => instructions::add_i,
            Opcode::LdF => instructions::ld_f,
            Opcode::LdB => instructions::ld_b,
            Opcode::StoreRegs => instructions::store_regs,
            Opcode::LoadRegs => instructions::load_regs,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Sys => "SYS addr",
            Opcode::Cls => "CLS",
            Opcode::Ret => "RET",
            Opcode::Jp => "JP addr",
            Opcode::Call => "CALL addr",
            Opcode::SeByte => "SE Vx, byte",
            Opcode::SneByte => "SNE Vx, byte",
            Opcode::SeReg => "SE Vx, Vy",
            Opcode::LdByte => "LD Vx, byte",
            Opcode::AddByte => "ADD Vx, byte",
            Opcode::LdReg => "LD Vx, Vy",
            Opcode::Or => "OR Vx, Vy",
            Opcode::And => "AND Vx, Vy",
            Opcode::Xor => "XOR Vx, Vy",
            Opcode::AddReg => "ADD Vx, Vy",
            Opcode::Sub => "SUB Vx, Vy",
            Opcode::Shr => "SHR Vx",
            Opcode::Subn => "SUBN Vx, Vy",
            Opcode::Shl => "SHL Vx",
            Opcode::SneReg => "SNE Vx, Vy",
            Opcode::LdI => "LD I, addr",
            Opcode::JpV0 => "JP V0, addr",
            Opcode::Rnd => "RND Vx, byte",
            Opcode::Drw => "DRW Vx, Vy, n",
            Opcode::Skp => "SKP Vx",
            Opcode::Sknp => "SKNP Vx",
            Opcode::LdVxDt => "LD Vx, DT",
            Opcode::LdVxK => "LD Vx, K",
            Opcode::LdDtVx => "LD DT, Vx",
            Opcode::LdStVx => "LD ST, Vx",
            Opcode::AddI => "ADD I, Vx",
            Opcode::LdF => "LD F, Vx",
            Opcode::LdB => "LD B, Vx",
            Opcode::StoreRegs => "LD [I], Vx",
            Opcode::LoadRegs => "LD Vx, [I]",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// map an instruction word to its operation
pub fn decode(word: u16) -> Result<Opcode, Chip8Error> {
    let op = match class(word) {
        0x0 => match nnn(word) {
            0x0e0 => Opcode::Cls,
            0x0ee => Opcode::Ret,
            _ => Opcode::Sys,
        },
        0x1 => Opcode::Jp,
        0x2 => Opcode::Call,
        0x3 => Opcode::SeByte,
        0x4 => Opcode::SneByte,
        0x5 => Opcode::SeReg,
        0x6 => Opcode::LdByte,
        0x7 => Opcode::AddByte,
        0x8 => match n(word) {
            0x0 => Opcode::LdReg,
            0x1 => Opcode::Or,
            0x2 => Opcode::And,
            0x3 => Opcode::Xor,
            0x4 => Opcode::AddReg,
            0x5 => Opcode::Sub,
            0x6 => Opcode::Shr,
            0x7 => Opcode::Subn,
            0xe => Opcode::Shl,
            _ => return Err(Chip8Error::InvalidInstruction { word }),
        },
        0x9 => Opcode::SneReg,
        0xa => Opcode::LdI,
        0xb => Opcode::JpV0,
        0xc => Opcode::Rnd,
        0xd => Opcode::Drw,
        0xe => match kk(word) {
            0x9e => Opcode::Skp,
            0xa1 => Opcode::Sknp,
            _ => return Err(Chip8Error::InvalidInstruction { word }),
        },
        0xf => match kk(word) {
            0x07 => Opcode::LdVxDt,
            0x0a => Opcode::LdVxK,
            0x15 => Opcode::LdDtVx,
            0x18 => Opcode::LdStVx,
            0x1e => Opcode::AddI,
            0x29 => Opcode::LdF,
            0x33 => Opcode::LdB,
            0x55 => Opcode::StoreRegs,
            0x65 => Opcode::LoadRegs,
            _ => return Err(Chip8Error::InvalidInstruction { word }),
        },
        // class() is only ever four bits wide
        _ => unreachable!("class nibble out of range in {:#06x}", word),
    };
    Ok(op)
}
