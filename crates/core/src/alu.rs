//! Arithmetic kernels shared by the dispatcher.
//!
//! These are pure functions over bytes and the incoming carry; the caller
//! decides where results and flags go. Zero/Negative are always derived from
//! `value` by the caller.

/// Result of an add/subtract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum {
    pub value: u8,
    pub carry: bool,
    pub overflow: bool,
}

/// Signed overflow of `a + m = result`: both operands share a sign that the
/// result does not.
#[inline]
fn signed_overflow(a: u8, m: u8, result: u8) -> bool {
    (!(a ^ m) & (a ^ result) & 0x80) != 0
}

/// Binary ADC: 9-bit `a + m + carry`.
pub fn adc_binary(a: u8, m: u8, carry_in: bool) -> Sum {
    let sum = a as u16 + m as u16 + carry_in as u16;
    let value = sum as u8;
    Sum {
        value,
        carry: sum > 0xFF,
        overflow: signed_overflow(a, m, value),
    }
}

/// Binary SBC as `a + !m + carry`; carry clear afterwards means a borrow.
pub fn sbc_binary(a: u8, m: u8, carry_in: bool) -> Sum {
    adc_binary(a, !m, carry_in)
}

/// Digit value of a packed BCD byte (`0x46` -> 46). Nibbles above 9 are
/// taken at face value, so the result stays below 166.
#[inline]
fn bcd_digits(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

/// Packed-BCD ADC.
///
/// Each nibble is corrected by +6 once it exceeds 9; the low-nibble carry
/// feeds the high nibble and the high-nibble carry is the decimal carry out
/// (result above 99). Overflow applies the signed test to the digit values of
/// the operands and the two-digit result.
pub fn adc_decimal(a: u8, m: u8, carry_in: bool) -> Sum {
    let mut lo = (a & 0x0F) + (m & 0x0F) + carry_in as u8;
    let mut hi = (a >> 4) + (m >> 4);
    if lo > 9 {
        lo += 6;
    }
    if lo > 0x0F {
        hi += 1;
    }
    if hi > 9 {
        hi += 6;
    }
    let value = ((hi & 0x0F) << 4) | (lo & 0x0F);

    let (ad, md) = (bcd_digits(a), bcd_digits(m));
    let rd = ((ad as u16 + md as u16 + carry_in as u16) % 100) as u8;
    Sum {
        value,
        carry: hi > 0x0F,
        overflow: signed_overflow(ad, md, rd),
    }
}

/// Packed-BCD SBC.
///
/// A nibble that borrows is corrected by -6; the low-nibble borrow is taken
/// from the high nibble, and a final borrow clears carry.
pub fn sbc_decimal(a: u8, m: u8, carry_in: bool) -> Sum {
    let borrow_in = !carry_in as i16;
    let mut lo = (a & 0x0F) as i16 - (m & 0x0F) as i16 - borrow_in;
    let mut hi = (a >> 4) as i16 - (m >> 4) as i16;
    if lo < 0 {
        lo -= 6;
        hi -= 1;
    }
    let carry = hi >= 0;
    if !carry {
        hi -= 6;
    }
    let value = (((hi & 0x0F) << 4) | (lo & 0x0F)) as u8;

    let (ad, md) = (bcd_digits(a), bcd_digits(m));
    let rd = (ad as i16 - md as i16 - borrow_in).rem_euclid(100) as u8;
    Sum {
        value,
        carry,
        overflow: ((ad ^ md) & (ad ^ rd) & 0x80) != 0,
    }
}

/// CMP/CPX/CPY: `(reg - m, reg >= m)`.
#[inline]
pub fn compare(reg: u8, m: u8) -> (u8, bool) {
    (reg.wrapping_sub(m), reg >= m)
}

/// ASL: `(result, carry_out)`.
#[inline]
pub fn asl(v: u8) -> (u8, bool) {
    (v << 1, v & 0x80 != 0)
}

/// LSR: `(result, carry_out)`.
#[inline]
pub fn lsr(v: u8) -> (u8, bool) {
    (v >> 1, v & 0x01 != 0)
}

/// ROL: old carry enters bit 0.
#[inline]
pub fn rol(v: u8, carry_in: bool) -> (u8, bool) {
    ((v << 1) | carry_in as u8, v & 0x80 != 0)
}

/// ROR: old carry enters bit 7.
#[inline]
pub fn ror(v: u8, carry_in: bool) -> (u8, bool) {
    ((v >> 1) | ((carry_in as u8) << 7), v & 0x01 != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_binary_carry_and_overflow() {
        assert_eq!(
            adc_binary(0x7F, 0x01, false),
            Sum { value: 0x80, carry: false, overflow: true }
        );
        assert_eq!(
            adc_binary(0x80, 0xFF, false),
            Sum { value: 0x7F, carry: true, overflow: true }
        );
        assert_eq!(
            adc_binary(0xF2, 0x0D, true),
            Sum { value: 0x00, carry: true, overflow: false }
        );
        assert_eq!(
            adc_binary(0xE7, 0x52, false),
            Sum { value: 0x39, carry: true, overflow: false }
        );
    }

    #[test]
    fn sbc_binary_borrow_clears_carry() {
        assert_eq!(
            sbc_binary(0x0A, 0xDD, true),
            Sum { value: 0x2D, carry: false, overflow: false }
        );
        assert_eq!(
            sbc_binary(0x44, 0x2A, true),
            Sum { value: 0x1A, carry: true, overflow: false }
        );
        assert_eq!(
            sbc_binary(0x00, 0x01, true),
            Sum { value: 0xFF, carry: false, overflow: false }
        );
        assert_eq!(
            sbc_binary(0x80, 0x00, false),
            Sum { value: 0x7F, carry: true, overflow: true }
        );
    }

    #[test]
    fn adc_decimal_corrects_each_nibble() {
        assert_eq!(
            adc_decimal(0x05, 0x03, false),
            Sum { value: 0x08, carry: false, overflow: false }
        );
        assert_eq!(
            adc_decimal(0x81, 0x92, false),
            Sum { value: 0x73, carry: true, overflow: false }
        );
        assert_eq!(
            adc_decimal(0x81, 0x99, false),
            Sum { value: 0x80, carry: true, overflow: false }
        );
        assert_eq!(adc_decimal(0x09, 0x01, false).value, 0x10);
        assert_eq!(adc_decimal(0x58, 0x46, true).value, 0x05);
        assert!(adc_decimal(0x58, 0x46, true).carry);
        let wrap = adc_decimal(0x99, 0x00, true);
        assert_eq!((wrap.value, wrap.carry), (0x00, true));
    }

    #[test]
    fn sbc_decimal_borrows_across_nibbles() {
        assert_eq!(
            sbc_decimal(0x46, 0x12, false),
            Sum { value: 0x33, carry: true, overflow: false }
        );
        assert_eq!(
            sbc_decimal(0x46, 0x53, false),
            Sum { value: 0x92, carry: false, overflow: false }
        );
        assert_eq!(sbc_decimal(0x40, 0x13, true).value, 0x27);
        let under = sbc_decimal(0x00, 0x01, true);
        assert_eq!((under.value, under.carry), (0x99, false));
    }

    #[test]
    fn compare_sets_carry_when_not_less() {
        assert_eq!(compare(0x03, 0x03), (0x00, true));
        assert_eq!(compare(0x10, 0x03), (0x0D, true));
        assert_eq!(compare(0x02, 0x03), (0xFF, false));
    }

    #[test]
    fn shifts_and_rotates() {
        assert_eq!(asl(0x3C), (0x78, false));
        assert_eq!(asl(0x80), (0x00, true));
        assert_eq!(lsr(0x15), (0x0A, true));
        assert_eq!(rol(0x4B, true), (0x97, false));
        assert_eq!(rol(0xB4, true), (0x69, true));
        assert_eq!(ror(0x2C, true), (0x96, false));
        assert_eq!(ror(0x2D, true), (0x96, true));
        assert_eq!(ror(0x01, false), (0x00, true));
    }
}
