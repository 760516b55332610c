//! Variable-length integer codec
//!
//! Base-128, least-significant group first. Each byte carries 7 value bits in
//! its low bits; the high bit is set when more bytes follow.
//!
//! ```text
//!   0      -> 0x00
//!   127    -> 0x7F
//!   128    -> 0x80 0x01
//!   16384  -> 0x80 0x80 0x01
//! ```

use super::WireError;
use bytes::BufMut;

/// Number of value bits carried by each encoded byte
const VALUE_BITS: u32 = 7;

/// Low seven bits of a byte
const VALUE_MASK: u8 = 0x7F;

/// High bit of a byte, set when more bytes follow
const CONTINUATION: u8 = 0x80;

/// Longest encoding a `u64` can need (ceil(64 / 7))
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `value` occupies once encoded
#[inline]
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros();
    bits.max(1).div_ceil(VALUE_BITS) as usize
}

/// Encode `value` into `buf`, returning the number of bytes written
pub fn write<B: BufMut>(mut value: u64, buf: &mut B) -> usize {
    let mut written = 0;
    loop {
        let byte = value as u8 & VALUE_MASK;
        value >>= VALUE_BITS;
        written += 1;

        if value == 0 {
            buf.put_u8(byte);
            return written;
        }
        buf.put_u8(byte | CONTINUATION);
    }
}

/// Decode a varint from the start of `data`
///
/// # Returns
/// The decoded value and the number of bytes consumed
///
/// # Errors
/// Returns [`WireError::InvalidVarint`] if `data` ends before the terminating
/// byte or the encoding does not fit in 64 bits
pub fn read(data: &[u8]) -> Result<(u64, usize), WireError> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        let bits = u64::from(byte & VALUE_MASK);
        // The tenth byte only has room for the top bit of a u64.
        if shift == 63 && bits > 1 {
            return Err(WireError::InvalidVarint {
                reason: "value overflows 64 bits".to_string(),
            });
        }
        value |= bits << shift;

        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
        shift += VALUE_BITS;
    }

    // Ten bytes can hold any u64, so an eleventh is never needed
    let reason = if data.len() > MAX_VARINT_LEN {
        format!("more than {MAX_VARINT_LEN} bytes")
    } else {
        "truncated".to_string()
    };
    Err(WireError::InvalidVarint { reason })
}
