//! SM2 public-key encryption (GB/T 32918.4-2016).
//!
//! The encryption scheme of the SM2 elliptic curve cryptosystem over
//! SM2P256V1: a fresh ephemeral point C1 = k·G per message, a keystream
//! derived from k·P with the SM3-based KDF, and an SM3 integrity tag over
//! x2 || M || y2. Ciphertexts serialize to the DER structure
//! `SEQUENCE { INTEGER x, INTEGER y, OCTET STRING hash, OCTET STRING cipher }`.

use shangmi_bignum::BigNum;
use shangmi_types::CryptoError;
use zeroize::{Zeroize, Zeroizing};

use crate::ecc::{EcGroup, EcPoint};
use crate::sm3::Sm3;

mod ciphertext;
mod decrypt;
mod encrypt;
mod streaming;

pub use ciphertext::Sm2Ciphertext;
pub use streaming::{Sm2DecryptCtx, Sm2EncryptCtx};

/// Smallest plaintext accepted by encryption.
pub const SM2_MIN_PLAINTEXT_SIZE: usize = 1;

/// Largest plaintext accepted by encryption (and largest ciphertext body).
pub const SM2_MAX_PLAINTEXT_SIZE: usize = 255;

/// Largest possible DER-encoded ciphertext: a maximum-size body with both
/// coordinate INTEGERs carrying a sign byte.
pub const SM2_MAX_CIPHERTEXT_SIZE: usize = 366;

/// Attempt bound for the fixed-length retry in [`Sm2KeyPair::do_encrypt_fixlen`].
pub(crate) const SM2_FIXLEN_MAX_TRIES: u32 = 200;

/// DER-encoded sizes of the ciphertext coordinate pair (INTEGER x, INTEGER y).
///
/// A coordinate whose leading payload byte has its top bit set gains a DER
/// sign byte, so the pair encodes to one of exactly three lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSize {
    /// Neither coordinate needs a sign byte.
    Compact = 68,
    /// Exactly one coordinate needs a sign byte.
    Typical = 69,
    /// Both coordinates need a sign byte.
    Max = 70,
}

/// An SM2 key pair for encryption and decryption.
///
/// A pair imported from a public key alone can encrypt but not decrypt.
/// The private scalar is wiped on drop.
#[derive(Clone)]
pub struct Sm2KeyPair {
    group: EcGroup,
    /// The private scalar d (1 <= d < n), or zero for a public-only key.
    private_key: BigNum,
    /// The public point P = d·G.
    public_key: EcPoint,
}

impl Sm2KeyPair {
    /// Generate a new key pair on the SM2P256V1 curve.
    pub fn generate() -> Result<Self, CryptoError> {
        let group = EcGroup::sm2_p256v1();
        let d = BigNum::random_range(group.order())?;
        let p = group.scalar_mul_base(&d)?;

        Ok(Sm2KeyPair {
            group,
            private_key: d,
            public_key: p,
        })
    }

    /// Create a key pair from existing private key bytes (big-endian).
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, CryptoError> {
        let group = EcGroup::sm2_p256v1();
        let d = BigNum::from_bytes_be(private_key);

        if d.is_zero() || d >= *group.order() {
            return Err(CryptoError::EccInvalidPrivateKey);
        }

        let p = group.scalar_mul_base(&d)?;

        Ok(Sm2KeyPair {
            group,
            private_key: d,
            public_key: p,
        })
    }

    /// Create an encrypt-only key pair from a public key in uncompressed
    /// encoding (0x04 || x || y). The point is checked to lie on the curve.
    pub fn from_public_key(public_key: &[u8]) -> Result<Self, CryptoError> {
        let group = EcGroup::sm2_p256v1();
        let p = EcPoint::from_uncompressed(&group, public_key)?;

        Ok(Sm2KeyPair {
            group,
            private_key: BigNum::zero(),
            public_key: p,
        })
    }

    /// Return the public key in uncompressed encoding.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        self.public_key.to_uncompressed()
    }

    /// Return the private key as 32-byte big-endian.
    pub fn private_key_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        if self.private_key.is_zero() {
            return Err(CryptoError::EccInvalidPrivateKey);
        }
        self.private_key.to_bytes_be_padded(self.group.field_size())
    }

    /// Encrypt and serialize to DER in one call.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.do_encrypt(plaintext)?.to_der())
    }

    /// Encrypt with a fixed coordinate-pair encoding size and serialize to
    /// DER. For a given `point_size` and plaintext length the output length
    /// is deterministic, so callers can reserve exact buffers.
    pub fn encrypt_fixlen(
        &self,
        plaintext: &[u8],
        point_size: PointSize,
    ) -> Result<Vec<u8>, CryptoError> {
        Ok(self.do_encrypt_fixlen(plaintext, point_size)?.to_der())
    }

    /// Parse a DER ciphertext (rejecting trailing bytes) and decrypt it.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let parsed = Sm2Ciphertext::from_der(ciphertext)?;
        self.do_decrypt(&parsed)
    }
}

/// SM2 Key Derivation Function (GB/T 32918.4 Section 5.4.3): counter-mode
/// expansion of SM3 over the 64-byte x2 || y2 seed.
///
/// The output is a keystream; it comes back in a `Zeroizing` buffer so it
/// is wiped on every path out of the caller.
pub(crate) fn sm2_kdf(seed: &[u8], klen: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    // Reserve whole digests up front so the buffer never reallocates and
    // leaves unwiped keystream behind.
    let blocks = klen.div_ceil(crate::sm3::SM3_OUTPUT_SIZE);
    let mut out = Zeroizing::new(Vec::with_capacity(blocks * crate::sm3::SM3_OUTPUT_SIZE));
    let mut counter: u32 = 1;

    while out.len() < klen {
        let mut hasher = Sm3::new();
        hasher.update(seed)?;
        hasher.update(&counter.to_be_bytes())?;
        let mut digest = hasher.finish()?;
        out.extend_from_slice(&digest);
        digest.zeroize();
        counter += 1;
    }

    out.truncate(klen);
    Ok(out)
}
