//! # Bit Regrouping
//!
//! Converts a byte sequence between bit-group widths. Bech32 carries its
//! payload as 5-bit words, so key hashes are regrouped 8→5 before encoding
//! and 5→8 after decoding.

use super::errors::BitConversionError;

/// Regroup `data` from `from_bits`-wide groups into `to_bits`-wide groups.
///
/// Input is read as a big-endian bit stream. With `pad`, trailing bits are
/// left-shifted into one final zero-filled group. Without `pad`, leftover bits
/// must be fewer than `from_bits` and all zero.
pub fn convert_bits(
    data: &[u8],
    from_bits: u32,
    to_bits: u32,
    pad: bool,
) -> Result<Vec<u8>, BitConversionError> {
    if !(1..=8).contains(&from_bits) || !(1..=8).contains(&to_bits) {
        return Err(BitConversionError::InvalidWidth { from_bits, to_bits });
    }

    let max_value: u32 = (1 << to_bits) - 1;
    // Only the bits that can still be emitted need to stay in the accumulator
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;

    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity((data.len() * from_bits as usize).div_ceil(to_bits as usize));

    for &value in data {
        if u32::from(value) >> from_bits != 0 {
            return Err(BitConversionError::InvalidValue(value));
        }
        acc = ((acc << from_bits) | u32::from(value)) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits {
        return Err(BitConversionError::IncompleteGroup);
    } else if (acc << (to_bits - bits)) & max_value != 0 {
        return Err(BitConversionError::NonZeroPadding);
    }

    Ok(out)
}
