//! One-shot SM2 encryption, including the fixed point-size variant.

use shangmi_bignum::BigNum;
use shangmi_types::CryptoError;
use zeroize::Zeroizing;

use crate::ecc::{EcGroup, EcPoint};
use crate::sm3::Sm3;

use super::ciphertext::{point_der_len, Sm2Ciphertext};
use super::{
    sm2_kdf, PointSize, Sm2KeyPair, SM2_FIXLEN_MAX_TRIES, SM2_MAX_PLAINTEXT_SIZE,
    SM2_MIN_PLAINTEXT_SIZE,
};

impl Sm2KeyPair {
    /// Encrypt `plaintext` into an in-memory ciphertext.
    ///
    /// Draws a fresh ephemeral scalar per attempt. The standard requires
    /// rejecting an all-zero keystream, so that case discards the scalar
    /// and retries; statistically it does not occur.
    pub fn do_encrypt(&self, plaintext: &[u8]) -> Result<Sm2Ciphertext, CryptoError> {
        check_plaintext_len(plaintext.len())?;

        loop {
            let k = BigNum::random_range(self.group.order())?;
            let c1 = self.group.scalar_mul_base(&k)?;
            if let Some(out) = encrypt_with_k(&self.group, &self.public_key, &k, &c1, plaintext)? {
                return Ok(out);
            }
            // All-zero keystream: k and the derived point wipe on drop,
            // then a fresh scalar is drawn.
        }
    }

    /// Encrypt like [`do_encrypt`](Self::do_encrypt), but retry until the
    /// DER encoding of the ephemeral point's coordinate pair is exactly
    /// `point_size` bytes, so the serialized ciphertext length is
    /// deterministic for a given plaintext length.
    ///
    /// Only length mismatches consume attempts; after 200 mismatches the
    /// call fails with `Sm2FixlenRetryLimit`. An all-zero keystream still
    /// restarts with a fresh scalar without consuming an attempt.
    pub fn do_encrypt_fixlen(
        &self,
        plaintext: &[u8],
        point_size: PointSize,
    ) -> Result<Sm2Ciphertext, CryptoError> {
        check_plaintext_len(plaintext.len())?;

        let mut tries = SM2_FIXLEN_MAX_TRIES;
        loop {
            let k = BigNum::random_range(self.group.order())?;
            let c1 = self.group.scalar_mul_base(&k)?;

            let xy = c1.to_xy_bytes()?;
            if point_der_len(&xy[..32], &xy[32..]) != point_size as usize {
                tries -= 1;
                if tries == 0 {
                    return Err(CryptoError::Sm2FixlenRetryLimit);
                }
                continue;
            }

            if let Some(out) = encrypt_with_k(&self.group, &self.public_key, &k, &c1, plaintext)? {
                return Ok(out);
            }
        }
    }
}

fn check_plaintext_len(len: usize) -> Result<(), CryptoError> {
    if !(SM2_MIN_PLAINTEXT_SIZE..=SM2_MAX_PLAINTEXT_SIZE).contains(&len) {
        return Err(CryptoError::InvalidArg);
    }
    Ok(())
}

/// One encryption attempt with a caller-supplied ephemeral scalar `k` and
/// its precomputed point `c1 = k·G`.
///
/// Returns `None` when the derived keystream is all zero. All
/// secret-derived intermediates (the shared point and x2 || y2) wipe
/// themselves on every path out.
pub(crate) fn encrypt_with_k(
    group: &EcGroup,
    public_key: &EcPoint,
    k: &BigNum,
    c1: &EcPoint,
    plaintext: &[u8],
) -> Result<Option<Sm2Ciphertext>, CryptoError> {
    // (x2, y2) = k·P
    let shared = group.scalar_mul(k, public_key)?;
    let x2y2 = Zeroizing::new(shared.to_xy_bytes()?);

    // t = KDF(x2 || y2, |M|)
    let t = sm2_kdf(&x2y2[..], plaintext.len())?;
    if all_zero(&t) {
        return Ok(None);
    }

    // C2 = M xor t
    let mut body = vec![0u8; plaintext.len()];
    for (i, byte) in body.iter_mut().enumerate() {
        *byte = plaintext[i] ^ t[i];
    }

    // C3 = SM3(x2 || M || y2)
    let mut hasher = Sm3::new();
    hasher.update(&x2y2[..32])?;
    hasher.update(plaintext)?;
    hasher.update(&x2y2[32..])?;
    let hash = hasher.finish()?;

    let c1_xy = c1.to_xy_bytes()?;
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(&c1_xy[..32]);
    y.copy_from_slice(&c1_xy[32..]);

    Ok(Some(Sm2Ciphertext {
        x,
        y,
        hash,
        ciphertext: body,
    }))
}

pub(crate) fn all_zero(buf: &[u8]) -> bool {
    buf.iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    // GB/T 32918 encryption example on SM2P256V1: private key d, fixed
    // ephemeral k, plaintext "encryption standard". Expected intermediates
    // and ciphertext cross-checked against an independent implementation.
    const D_HEX: &str = "1649AB77A00637BD5E2EFE283FBF353534AA7F7CB89463F208DDBC2920BB0DA0";
    const K_HEX: &str = "4C62EEFD6ECFC2B95B92FD6C3D9575148AFA17425546D49018E5388D49DD7B4F";
    const MSG: &[u8] = b"encryption standard";

    #[test]
    fn test_standard_vector_fixed_k() {
        let key = Sm2KeyPair::from_private_key(&hex(D_HEX)).unwrap();
        let k = BigNum::from_bytes_be(&hex(K_HEX));
        let c1 = key.group.scalar_mul_base(&k).unwrap();

        let c = encrypt_with_k(&key.group, &key.public_key, &k, &c1, MSG)
            .unwrap()
            .expect("keystream must not be all zero");

        assert_eq!(
            c.x.to_vec(),
            hex("11C88AE04CEC1BA554D03D5B5970333A83585826C2A985DE5520D9E934389EFB")
        );
        assert_eq!(
            c.y.to_vec(),
            hex("84B52D344FB21AA8EA38A4940C8332692B8D4DA2393549212EAFDC0F11CA5C9C")
        );
        assert_eq!(
            c.hash.to_vec(),
            hex("0137E757931553826A245A0BAEF73E2A693A861C6E93509CDA65C2B97C0AB2ED")
        );
        assert_eq!(c.ciphertext, hex("D76B28B93A4B3765997A3BBC58F998731D0AA2"));

        // y1 has its top bit set, x1 does not: the coordinate pair takes
        // the 69-byte (typical) DER form and the envelope is 126 bytes.
        let der = c.to_der();
        assert_eq!(der.len(), 126);
        assert_eq!(c.encoded_len(), 126);
        assert_eq!(
            der,
            hex(
                "307C022011C88AE04CEC1BA554D03D5B5970333A83585826C2A985DE5520D9E9\
                 34389EFB02210084B52D344FB21AA8EA38A4940C8332692B8D4DA2393549212E\
                 AFDC0F11CA5C9C04200137E757931553826A245A0BAEF73E2A693A861C6E9350\
                 9CDA65C2B97C0AB2ED0413D76B28B93A4B3765997A3BBC58F998731D0AA2"
            )
        );

        // The standard vector decrypts back to the plaintext
        assert_eq!(key.do_decrypt(&c).unwrap(), MSG);
        assert_eq!(key.decrypt(&der).unwrap(), MSG);
    }

    #[test]
    fn test_roundtrip_lengths() {
        let key = Sm2KeyPair::generate().unwrap();
        for len in [1usize, 19, 32, 33, 200] {
            let msg: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let c = key.do_encrypt(&msg).unwrap();
            assert_eq!(c.ciphertext.len(), len);
            assert_eq!(key.do_decrypt(&c).unwrap(), msg);
        }
    }

    #[test]
    fn test_fresh_ephemeral_per_encryption() {
        let key = Sm2KeyPair::generate().unwrap();
        let a = key.do_encrypt(MSG).unwrap();
        let b = key.do_encrypt(MSG).unwrap();
        assert_ne!(a.x, b.x);
        assert_ne!(a.y, b.y);
        assert_ne!(a.hash, b.hash);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_fixlen_point_sizes() {
        let key = Sm2KeyPair::generate().unwrap();
        for point_size in [PointSize::Compact, PointSize::Typical, PointSize::Max] {
            let c = key.do_encrypt_fixlen(MSG, point_size).unwrap();
            assert_eq!(
                point_der_len(&c.x, &c.y),
                point_size as usize,
                "{point_size:?}"
            );
            assert_eq!(key.do_decrypt(&c).unwrap(), MSG);
        }
    }

    #[test]
    fn test_fixlen_der_length_deterministic() {
        // For a fixed preset and plaintext length, the DER envelope length
        // is a constant: point pair + 34-byte tag + body + SEQUENCE header.
        let key = Sm2KeyPair::generate().unwrap();
        for (point_size, expected) in [
            (PointSize::Compact, 125usize),
            (PointSize::Typical, 126),
            (PointSize::Max, 127),
        ] {
            for _ in 0..3 {
                let der = key.encrypt_fixlen(MSG, point_size).unwrap();
                assert_eq!(der.len(), expected, "{point_size:?}");
            }
        }
    }

    #[test]
    fn test_all_zero() {
        assert!(all_zero(&[]));
        assert!(all_zero(&[0, 0, 0]));
        assert!(!all_zero(&[0, 1, 0]));
    }
}
