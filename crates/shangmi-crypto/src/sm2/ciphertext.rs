//! The in-memory SM2 ciphertext and its DER codec.

use shangmi_types::CryptoError;
use shangmi_utils::asn1::{self, Decoder, Encoder};

use crate::ecc::{EcGroup, EcPoint};
use shangmi_bignum::BigNum;

use super::SM2_MAX_PLAINTEXT_SIZE;

/// An SM2 ciphertext: the ephemeral point coordinates, the SM3 integrity
/// tag, and the encrypted body.
///
/// Coordinates are stored left-zero-padded to 32 bytes even when their DER
/// INTEGER form is shorter, and the body is always exactly as long as the
/// plaintext it encrypts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sm2Ciphertext {
    /// x-coordinate of the ephemeral point, 32-byte big-endian.
    pub x: [u8; 32],
    /// y-coordinate of the ephemeral point, 32-byte big-endian.
    pub y: [u8; 32],
    /// SM3 tag over x2 || M || y2.
    pub hash: [u8; 32],
    /// Encrypted body (M xor keystream).
    pub ciphertext: Vec<u8>,
}

impl Sm2Ciphertext {
    /// Encode as `SEQUENCE { INTEGER x, INTEGER y, OCTET STRING hash,
    /// OCTET STRING cipher }`.
    pub fn to_der(&self) -> Vec<u8> {
        let mut inner = Encoder::new();
        inner
            .write_integer(&self.x)
            .write_integer(&self.y)
            .write_octet_string(&self.hash)
            .write_octet_string(&self.ciphertext);
        let inner_bytes = inner.finish();

        let mut outer = Encoder::new();
        outer.write_sequence(&inner_bytes);
        outer.finish()
    }

    /// Exact size of the `to_der` encoding, computed without encoding.
    pub fn encoded_len(&self) -> usize {
        let content = point_der_len(&self.x, &self.y)
            + asn1::octet_string_len(self.hash.len())
            + asn1::octet_string_len(self.ciphertext.len());
        asn1::sequence_len(content)
    }

    /// Decode from DER.
    ///
    /// Rejects trailing bytes (after the SEQUENCE and inside it),
    /// coordinates longer than 32 bytes, a tag OCTET STRING that is not
    /// exactly 32 bytes, an oversize body, and any point not on the SM2
    /// curve. Short coordinate INTEGERs are left-zero-padded into the
    /// 32-byte slots. An empty body is accepted here; it cannot decrypt.
    pub fn from_der(data: &[u8]) -> Result<Self, CryptoError> {
        let mut outer = Decoder::new(data);
        let mut seq = outer.read_sequence()?;
        if !outer.is_empty() {
            return Err(CryptoError::DecodeAsn1Fail);
        }

        let x = read_coordinate(&mut seq)?;
        let y = read_coordinate(&mut seq)?;

        let tag = seq.read_octet_string()?;
        if tag.len() != 32 {
            return Err(CryptoError::DecodeAsn1Fail);
        }

        let body = seq.read_octet_string()?;
        if body.len() > SM2_MAX_PLAINTEXT_SIZE {
            return Err(CryptoError::DecodeAsn1Fail);
        }

        if !seq.is_empty() {
            return Err(CryptoError::DecodeAsn1Fail);
        }

        let point = EcPoint::new(BigNum::from_bytes_be(&x), BigNum::from_bytes_be(&y));
        if !EcGroup::sm2_p256v1().is_on_curve(&point) {
            return Err(CryptoError::EccPointNotOnCurve);
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(tag);

        Ok(Self {
            x,
            y,
            hash,
            ciphertext: body.to_vec(),
        })
    }
}

/// DER size of the coordinate pair (INTEGER x, INTEGER y), without encoding.
/// This is what the fixed-length encryption retry measures.
pub(crate) fn point_der_len(x: &[u8], y: &[u8]) -> usize {
    asn1::integer_len(x) + asn1::integer_len(y)
}

fn read_coordinate(seq: &mut Decoder<'_>) -> Result<[u8; 32], CryptoError> {
    let value = seq.read_integer()?;
    if value.len() > 32 {
        return Err(CryptoError::DecodeAsn1Fail);
    }
    let mut out = [0u8; 32];
    out[32 - value.len()..].copy_from_slice(value);
    Ok(out)
}
