//! One-shot SM2 decryption.

use shangmi_bignum::BigNum;
use shangmi_types::CryptoError;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::ecc::EcPoint;
use crate::sm3::Sm3;

use super::ciphertext::Sm2Ciphertext;
use super::encrypt::all_zero;
use super::{sm2_kdf, Sm2KeyPair};

impl Sm2KeyPair {
    /// Decrypt an in-memory ciphertext, returning the plaintext.
    ///
    /// The embedded point is checked to lie on the SM2 curve before any
    /// multiplication by the private scalar (invalid-curve attack guard).
    /// An all-zero keystream and a tag mismatch both surface as the same
    /// `Sm2DecryptFail`, and the tag comparison is constant-time.
    pub fn do_decrypt(&self, ciphertext: &Sm2Ciphertext) -> Result<Vec<u8>, CryptoError> {
        if self.private_key.is_zero() {
            return Err(CryptoError::EccInvalidPrivateKey);
        }

        let c1 = EcPoint::new(
            BigNum::from_bytes_be(&ciphertext.x),
            BigNum::from_bytes_be(&ciphertext.y),
        );
        if !self.group.is_on_curve(&c1) {
            return Err(CryptoError::EccPointNotOnCurve);
        }

        // (x2, y2) = d·C1
        let shared = self.group.scalar_mul(&self.private_key, &c1)?;
        let x2y2 = Zeroizing::new(shared.to_xy_bytes()?);

        // t = KDF(x2 || y2, |C2|)
        let t = sm2_kdf(&x2y2[..], ciphertext.ciphertext.len())?;
        if all_zero(&t) {
            return Err(CryptoError::Sm2DecryptFail);
        }

        // M = C2 xor t
        let mut plaintext = vec![0u8; ciphertext.ciphertext.len()];
        for (i, byte) in plaintext.iter_mut().enumerate() {
            *byte = ciphertext.ciphertext[i] ^ t[i];
        }

        // u = SM3(x2 || M || y2), compared against C3
        let mut hasher = Sm3::new();
        hasher.update(&x2y2[..32])?;
        hasher.update(&plaintext)?;
        hasher.update(&x2y2[32..])?;
        let check = hasher.finish()?;

        if bool::from(check[..].ct_eq(&ciphertext.hash[..])) {
            Ok(plaintext)
        } else {
            plaintext.zeroize();
            Err(CryptoError::Sm2DecryptFail)
        }
    }
}
