//! Constant literals: parsing in base 2, 10 and 16 and conversion to bits.
//!
//! Text is read most-significant digit first. Bit vectors produced here are
//! least-significant bit first, matching signal bit order everywhere else.

use crate::error::{Result, SwordError};
use num_bigint::BigUint;
use num_traits::Zero;

/// Parse `text` in `radix` (2, 10 or 16).
pub fn parse_radix(text: &str, radix: u32) -> Result<BigUint> {
    if !matches!(radix, 2 | 10 | 16) {
        return Err(SwordError::constant(text, format!("unsupported radix {radix}")));
    }
    if text.is_empty() {
        return Err(SwordError::constant(text, "empty literal"));
    }
    if let Some(bad) = text.chars().find(|c| !c.is_digit(radix)) {
        return Err(SwordError::constant(
            text,
            format!("'{bad}' is not a base-{radix} digit"),
        ));
    }
    BigUint::parse_bytes(text.as_bytes(), radix)
        .ok_or_else(|| SwordError::constant(text, format!("not a base-{radix} number")))
}

/// Check that `value` is representable in `width` bits.
pub fn check_fits(value: &BigUint, width: u32, original: &str) -> Result<()> {
    if width == 0 {
        return Err(SwordError::ZeroWidth);
    }
    if value.bits() > u64::from(width) {
        return Err(SwordError::constant(
            original,
            format!("needs {} bits but only {width} are available", value.bits()),
        ));
    }
    Ok(())
}

/// Bits of `value`, least significant first, padded to `width`.
#[must_use]
pub fn to_bits(value: &BigUint, width: u32) -> Vec<bool> {
    (0..u64::from(width)).map(|i| value.bit(i)).collect()
}

/// Inverse of [`to_bits`].
#[must_use]
pub fn from_bits(bits: &[bool]) -> BigUint {
    let mut value = BigUint::zero();
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            value.set_bit(i as u64, true);
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_radix() {
        assert_eq!(parse_radix("1010", 2).ok(), Some(BigUint::from(10u32)));
        assert_eq!(parse_radix("255", 10).ok(), Some(BigUint::from(255u32)));
        assert_eq!(parse_radix("fF", 16).ok(), Some(BigUint::from(255u32)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_radix("", 10).is_err());
        assert!(parse_radix("102", 2).is_err());
        assert!(parse_radix("1_0", 10).is_err());
        assert!(parse_radix("-3", 10).is_err());
        assert!(parse_radix("0xff", 16).is_err());
    }

    #[test]
    fn test_parse_rejects_other_radixes() {
        for radix in [0, 8, 40] {
            assert_eq!(
                parse_radix("1", radix),
                Err(SwordError::constant("1", format!("unsupported radix {radix}")))
            );
        }
    }

    #[test]
    fn test_fits() {
        let v = BigUint::from(18u32);
        assert!(check_fits(&v, 5, "18").is_ok());
        assert!(check_fits(&v, 4, "18").is_err());
        assert_eq!(check_fits(&v, 0, "18"), Err(SwordError::ZeroWidth));
    }

    #[test]
    fn test_bits_lsb_first() {
        let bits = to_bits(&BigUint::from(6u32), 4);
        assert_eq!(bits, vec![false, true, true, false]);
        assert_eq!(from_bits(&bits), BigUint::from(6u32));
    }
}
