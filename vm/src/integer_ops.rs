//! Two's complement helpers over 256-bit words.

use ethereum_types::{U256, U512};

pub type Word = U256;

const SIGN_BIT: usize = 255;

pub fn is_negative(value: Word) -> bool {
    value.bit(SIGN_BIT)
}

/// Two's complement negation modulo 2^256.
pub fn negate(value: Word) -> Word {
    (!value).overflowing_add(Word::one()).0
}

/// Absolute value of a word read as a signed integer.
///
/// `-2^255` has no positive counterpart and maps to itself, which is the
/// value the signed division rules expect.
pub fn abs(value: Word) -> Word {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

pub fn bool_word(flag: bool) -> Word {
    if flag {
        Word::one()
    } else {
        Word::zero()
    }
}

pub fn signed_lt(a: Word, b: Word) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

pub fn sdiv(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let quotient = abs(a) / abs(b);
    if is_negative(a) != is_negative(b) {
        negate(quotient)
    } else {
        quotient
    }
}

pub fn smod(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let remainder = abs(a) % abs(b);
    if is_negative(a) {
        negate(remainder)
    } else {
        remainder
    }
}

pub fn addmod(a: Word, b: Word, modulus: Word) -> Word {
    if modulus.is_zero() {
        return Word::zero();
    }
    let sum = (U512::from(a) + U512::from(b)) % U512::from(modulus);
    narrow(sum)
}

pub fn mulmod(a: Word, b: Word, modulus: Word) -> Word {
    if modulus.is_zero() {
        return Word::zero();
    }
    let product = a.full_mul(b) % U512::from(modulus);
    narrow(product)
}

// The remainder of a division by a 256-bit modulus always fits.
fn narrow(value: U512) -> Word {
    let limbs = value.0;
    U256([limbs[0], limbs[1], limbs[2], limbs[3]])
}

pub fn exp(base: Word, exponent: Word) -> Word {
    if exponent.is_zero() {
        return Word::one();
    }
    if base.is_zero() {
        return Word::zero();
    }
    base.overflowing_pow(exponent).0
}

pub fn signextend(byte_index: Word, value: Word) -> Word {
    if byte_index >= Word::from(31) {
        return value;
    }
    let sign_bit = byte_index.low_u32() as usize * 8 + 7;
    let mask = (Word::one() << sign_bit) - Word::one();
    if value.bit(sign_bit) {
        value | !mask
    } else {
        value & mask
    }
}

pub fn byte(index: Word, value: Word) -> Word {
    if index >= Word::from(32) {
        return Word::zero();
    }
    Word::from(value.byte(31 - index.low_u32() as usize))
}

pub fn shl(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256) {
        return Word::zero();
    }
    value << shift.low_u32() as usize
}

pub fn shr(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256) {
        return Word::zero();
    }
    value >> shift.low_u32() as usize
}

pub fn sar(shift: Word, value: Word) -> Word {
    let negative = is_negative(value);
    if shift >= Word::from(256) {
        return if negative { Word::MAX } else { Word::zero() };
    }
    let shift = shift.low_u32() as usize;
    if negative {
        !((!value) >> shift)
    } else {
        value >> shift
    }
}

/// Left-aligned big-endian conversion of up to 32 bytes.
pub fn word_from_be(bytes: &[u8]) -> Word {
    Word::from_big_endian(bytes)
}

pub fn word_to_be(value: Word) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (chunk, limb) in out.chunks_exact_mut(8).zip(value.0.iter().rev()) {
        chunk.copy_from_slice(&limb.to_be_bytes());
    }
    out
}
