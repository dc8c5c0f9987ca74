//! Single-bit edits on register bytes.
//!
//! Bit 0 is the least significant bit, bit 7 the most significant, matching
//! the DS3231 datasheet numbering. Indices above 7 are reduced modulo 8.

/// Returns `byte` with bit `index` set.
pub const fn set(byte: u8, index: u8) -> u8 {
    byte | mask(index)
}

/// Returns `byte` with bit `index` cleared.
pub const fn clear(byte: u8, index: u8) -> u8 {
    byte & !mask(index)
}

/// Returns `byte` with bit `index` set when `value` is true, cleared otherwise.
pub const fn assign(byte: u8, index: u8, value: bool) -> u8 {
    if value {
        set(byte, index)
    } else {
        clear(byte, index)
    }
}

/// Reports whether bit `index` of `byte` is set.
pub const fn is_set(byte: u8, index: u8) -> bool {
    byte & mask(index) != 0
}

const fn mask(index: u8) -> u8 {
    1 << (index % 8)
}
