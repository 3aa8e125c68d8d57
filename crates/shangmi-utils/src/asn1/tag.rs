//! ASN.1 tag parsing.

use super::{Tag, TagClass};
use shangmi_types::CryptoError;

impl Tag {
    /// Parse a tag from the first bytes of `input`.
    /// Returns the tag and number of bytes consumed.
    pub fn from_bytes(input: &[u8]) -> Result<(Self, usize), CryptoError> {
        if input.is_empty() {
            return Err(CryptoError::NullInput);
        }

        let first = input[0];
        let class = match (first >> 6) & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = (first & 0x20) != 0;

        let low_bits = first & 0x1F;
        if low_bits < 0x1F {
            // Short form tag number
            return Ok((
                Tag {
                    class,
                    constructed,
                    number: low_bits as u32,
                },
                1,
            ));
        }

        // Long form tag number
        let mut number: u32 = 0;
        let mut i = 1;
        loop {
            if i >= input.len() {
                return Err(CryptoError::DecodeAsn1Fail);
            }
            let byte = input[i];
            number = number
                .checked_shl(7)
                .ok_or(CryptoError::DecodeAsn1Fail)?
                | (byte & 0x7F) as u32;
            i += 1;
            if (byte & 0x80) == 0 {
                break;
            }
        }
        Ok((
            Tag {
                class,
                constructed,
                number,
            },
            i,
        ))
    }
}
