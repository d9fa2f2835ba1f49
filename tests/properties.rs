use chip8_vm::decoder::{decode, Opcode};
use chip8_vm::instructions;
use chip8_vm::memory::MemoryMap;
use chip8_vm::state::FLAG;
use chip8_vm::{step, Chip8Error, State};
use proptest::prelude::*;

fn with_xy(a: u8, b: u8) -> State {
    let mut s = State::with_seed(7);
    s.v[1] = a;
    s.v[2] = b;
    s
}

proptest! {
    #[test]
    fn add_reg_carries(a in any::<u8>(), b in any::<u8>()) {
        let mut s = with_xy(a, b);
        instructions::add_reg(&mut s, 0x8124).unwrap();
        let sum = a as u16 + b as u16;
        prop_assert_eq!(s.v[1] as u16, sum % 256);
        prop_assert_eq!(s.v[FLAG], (sum > 255) as u8);
    }

    #[test]
    fn add_byte_never_touches_flag(a in any::<u8>(), kk in any::<u8>(), flag in any::<u8>()) {
        let mut s = with_xy(a, 0);
        s.v[FLAG] = flag;
        instructions::add_byte(&mut s, 0x7100 | kk as u16).unwrap();
        prop_assert_eq!(s.v[1], a.wrapping_add(kk));
        prop_assert_eq!(s.v[FLAG], flag);
    }

    #[test]
    fn sub_borrows(a in any::<u8>(), b in any::<u8>()) {
        let mut s = with_xy(a, b);
        instructions::sub(&mut s, 0x8125).unwrap();
        prop_assert_eq!(s.v[1], a.wrapping_sub(b));
        prop_assert_eq!(s.v[FLAG], (a > b) as u8);
    }

    #[test]
    fn subn_is_sub_swapped(a in any::<u8>(), b in any::<u8>()) {
        let mut s = with_xy(a, b);
        instructions::subn(&mut s, 0x8127).unwrap();
        let mut t = with_xy(b, a);
        instructions::sub(&mut t, 0x8125).unwrap();
        prop_assert_eq!(s.v[1], t.v[1]);
        prop_assert_eq!(s.v[FLAG], t.v[FLAG]);
    }

    #[test]
    fn shifts_keep_the_lost_bit(a in any::<u8>()) {
        let mut s = with_xy(a, 0);
        instructions::shr(&mut s, 0x8106).unwrap();
        prop_assert_eq!((s.v[1], s.v[FLAG]), (a >> 1, a & 1));

        let mut s = with_xy(a, 0);
        instructions::shl(&mut s, 0x810e).unwrap();
        prop_assert_eq!((s.v[1], s.v[FLAG]), (a << 1, a >> 7));
    }

    #[test]
    fn store_then_load_restores_registers(
        regs in any::<[u8; 16]>(),
        last in 0usize..16,
        addr in 0x200u16..0xff0,
    ) {
        let mut s = State::with_seed(7);
        s.v = regs;
        s.i = addr;
        let x = (last as u16) << 8;
        instructions::store_regs(&mut s, 0xf055 | x).unwrap();
        s.v = [0; 16];
        instructions::load_regs(&mut s, 0xf065 | x).unwrap();
        prop_assert_eq!(&s.v[..=last], &regs[..=last]);
        prop_assert!(s.v[last + 1..].iter().all(|&r| r == 0));
    }

    #[test]
    fn bcd_digits_rebuild_value(v in any::<u8>()) {
        let mut s = with_xy(v, 0);
        s.i = 0x300;
        instructions::ld_b(&mut s, 0xf133).unwrap();
        let d = s.memory.get_ro_slice(0x300, 3).unwrap();
        prop_assert!(d.iter().all(|&digit| digit < 10));
        prop_assert_eq!(d[0] as u16 * 100 + d[1] as u16 * 10 + d[2] as u16, v as u16);
    }

    #[test]
    fn wait_for_key_holds_until_pressed(idle in 1usize..32, key in 0u8..16) {
        let mut s = State::with_seed(7);
        s.memory.load_bytes(&[0xf6, 0x0a]).unwrap();
        for _ in 0..idle {
            prop_assert_eq!(step(&mut s).unwrap(), Opcode::LdVxK);
            prop_assert_eq!(s.pc, 0x200);
        }
        s.keypad.press(key);
        step(&mut s).unwrap();
        prop_assert_eq!(s.v[6], key);
        prop_assert_eq!(s.pc, 0x202);
    }

    #[test]
    fn decode_errors_carry_the_word(word in any::<u16>()) {
        if let Err(e) = decode(word) {
            let is_invalid_word = matches!(e, Chip8Error::InvalidInstruction { word: w } if w == word);
            prop_assert!(is_invalid_word);
        }
    }
}
