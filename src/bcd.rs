//! Binary-coded decimal helpers for the DS3231 time-keeping registers.
//!
//! Every time, date and alarm register stores one decimal digit per nibble:
//! the tens digit in the high nibble and the ones digit in the low nibble.
//! Callers mask off control bits (12/24-hour, AM/PM, century, alarm mask)
//! before decoding.

/// Decodes a BCD byte into its integer value.
///
/// A nibble above 9 is not rejected; the result is `high * 10 + low`
/// regardless, so malformed input decodes to a wrong but repeatable value.
pub const fn decode(byte: u8) -> u8 {
    let tens = byte >> 4;
    let ones = byte & 0x0F;
    tens.wrapping_mul(10).wrapping_add(ones)
}

/// Encodes an integer in `0..=99` as BCD.
///
/// Values above 99 do not fit two digits; they produce a deterministic
/// byte with the tens count truncated to the high nibble.
pub const fn encode(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
