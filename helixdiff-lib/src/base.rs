use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

/// Number of bases stored in one storage unit (one byte, 2 bits per base).
pub const PACKED_SIZE: usize = 4;

const NCHRS: usize = 1 << 8;
const NO_BASE: u8 = 0xff;
const BASES: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];
const BASE_CHARS: [u8; 4] = *b"ACGT";

const fn make_charmap() -> [u8; NCHRS] {
    let mut arr = [NO_BASE; NCHRS];
    let mut i = 0;
    while i < BASE_CHARS.len() {
        arr[BASE_CHARS[i] as usize] = i as u8;
        // lowercase
        arr[(BASE_CHARS[i] | 0x20) as usize] = i as u8;
        i += 1;
    }
    arr
}
const fn make_unpackmap() -> [[Base; PACKED_SIZE]; NCHRS] {
    let mut arr = [[Base::A; PACKED_SIZE]; NCHRS];
    let mut i = 0;
    while i < NCHRS {
        let mut j = 0;
        while j < PACKED_SIZE {
            let shift = (PACKED_SIZE - j - 1) * 2;
            arr[i][j] = BASES[(i >> shift) & 0x3];
            j += 1;
        }
        i += 1;
    }
    arr
}

/*
Precomputed mappings between ascii, bases and packed units
*/

const CHAR_TO_CODE: [u8; NCHRS] = make_charmap();
const UNIT_TO_BASES: [[Base; PACKED_SIZE]; NCHRS] = make_unpackmap();

impl Base {
    pub fn from_char(c: u8) -> Option<Base> {
        match CHAR_TO_CODE[c as usize] {
            NO_BASE => None,
            code => Some(BASES[code as usize]),
        }
    }
    pub fn to_char(self) -> u8 {
        BASE_CHARS[self as usize]
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char() as char)
    }
}

/// Packs one storage unit, first base in the high bits.
pub const fn pack(bases: [Base; PACKED_SIZE]) -> u8 {
    let mut unit = 0_u8;
    let mut i = 0;
    while i < PACKED_SIZE {
        unit = (unit << 2) | bases[i] as u8;
        i += 1;
    }
    unit
}
pub fn unpack(unit: u8) -> [Base; PACKED_SIZE] {
    UNIT_TO_BASES[unit as usize]
}
/// None unless the bases fill whole storage units.
pub fn pack_bases(bases: &[Base]) -> Option<Vec<u8>> {
    if bases.len() % PACKED_SIZE != 0 {
        return None;
    }
    Some(
        bases
            .chunks_exact(PACKED_SIZE)
            .map(|unit| pack([unit[0], unit[1], unit[2], unit[3]]))
            .collect(),
    )
}
pub fn string_to_bases(data: &[u8]) -> Option<Vec<Base>> {
    data.iter().copied().map(Base::from_char).collect()
}
pub fn bases_to_string(bases: &[Base]) -> String {
    bases.iter().map(|b| b.to_char() as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Base::{A, C, G, T};

    #[test]
    fn test_pack() {
        assert_eq!(pack([T, T, A, G]), 0xf2);
        assert_eq!(pack([A, A, A, A]), 0x00);
        assert_eq!(pack([C, C, C, C]), 0x55);
    }
    #[test]
    fn test_unpack() {
        assert_eq!(unpack(0xf2), [T, T, A, G]);
        assert_eq!(unpack(0x1b), [A, C, G, T]);
    }
    #[test]
    fn test_unpack_covers_every_unit() {
        for unit in 0..=255_u8 {
            assert_eq!(pack(unpack(unit)), unit);
        }
    }
    #[test]
    fn test_string_to_bases() {
        assert_eq!(string_to_bases(b"ACgt"), Some(vec![A, C, G, T]));
        assert_eq!(string_to_bases(b"ACNT"), None);
        assert_eq!(string_to_bases(b""), Some(vec![]));
    }
    #[test]
    fn test_pack_bases() {
        let bases = string_to_bases(b"TTAGGGCC").unwrap();
        assert_eq!(pack_bases(&bases), Some(vec![0xf2, 0xa5]));
        assert_eq!(bases_to_string(&bases), "TTAGGGCC");
    }
    #[test]
    fn test_pack_bases_partial_unit() {
        assert_eq!(pack_bases(&[A, C, G]), None);
        assert_eq!(pack_bases(&[]), Some(vec![]));
    }
}
