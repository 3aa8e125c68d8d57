//! Buffered contexts for feeding plaintext or ciphertext in chunks.
//!
//! SM2 encryption is one-shot, so the contexts only accumulate input;
//! `update` never emits bytes. `finish` consumes the context, runs the
//! one-shot operation over everything buffered, and returns the whole
//! output. A consumed context cannot be updated or finished again.

use shangmi_types::CryptoError;
use zeroize::Zeroizing;

use super::{Sm2KeyPair, SM2_MAX_CIPHERTEXT_SIZE, SM2_MAX_PLAINTEXT_SIZE};

/// Accumulating encryption context.
pub struct Sm2EncryptCtx {
    key: Sm2KeyPair,
    buf: Zeroizing<Vec<u8>>,
}

impl Sm2EncryptCtx {
    /// Create a context holding its own copy of the key.
    pub fn new(key: &Sm2KeyPair) -> Self {
        Self {
            key: key.clone(),
            buf: Zeroizing::new(Vec::new()),
        }
    }

    /// Append plaintext. Fails if the total would exceed
    /// `SM2_MAX_PLAINTEXT_SIZE`.
    pub fn update(&mut self, input: &[u8]) -> Result<(), CryptoError> {
        if input.len() > SM2_MAX_PLAINTEXT_SIZE - self.buf.len() {
            return Err(CryptoError::InputOverflow);
        }
        self.buf.extend_from_slice(input);
        Ok(())
    }

    /// Append a final chunk and encrypt everything buffered, returning the
    /// DER ciphertext. With an empty internal buffer the final chunk is
    /// encrypted directly, skipping the copy.
    pub fn finish(mut self, last: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if self.buf.is_empty() {
            return self.key.encrypt(last);
        }
        self.update(last)?;
        self.key.encrypt(&self.buf)
    }

    /// Upper bound on the `finish` output size, for sizing buffers.
    pub fn max_output_len(&self) -> usize {
        SM2_MAX_CIPHERTEXT_SIZE
    }
}

/// Accumulating decryption context.
pub struct Sm2DecryptCtx {
    key: Sm2KeyPair,
    buf: Zeroizing<Vec<u8>>,
}

impl Sm2DecryptCtx {
    /// Create a context holding its own copy of the key.
    pub fn new(key: &Sm2KeyPair) -> Self {
        Self {
            key: key.clone(),
            buf: Zeroizing::new(Vec::new()),
        }
    }

    /// Append DER ciphertext bytes. Fails if the total would exceed
    /// `SM2_MAX_CIPHERTEXT_SIZE`.
    pub fn update(&mut self, input: &[u8]) -> Result<(), CryptoError> {
        if input.len() > SM2_MAX_CIPHERTEXT_SIZE - self.buf.len() {
            return Err(CryptoError::InputOverflow);
        }
        self.buf.extend_from_slice(input);
        Ok(())
    }

    /// Append a final chunk and decrypt the accumulated DER ciphertext,
    /// returning the plaintext. With an empty internal buffer the final
    /// chunk is decrypted directly, skipping the copy.
    pub fn finish(mut self, last: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if self.buf.is_empty() {
            return self.key.decrypt(last);
        }
        self.update(last)?;
        self.key.decrypt(&self.buf)
    }

    /// Upper bound on the `finish` output size, for sizing buffers.
    pub fn max_output_len(&self) -> usize {
        SM2_MAX_PLAINTEXT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_equivalence() {
        let key = Sm2KeyPair::generate().unwrap();
        let msg = b"a message delivered in three pieces";

        let mut enc = Sm2EncryptCtx::new(&key);
        enc.update(&msg[..7]).unwrap();
        enc.update(&msg[7..20]).unwrap();
        let der = enc.finish(&msg[20..]).unwrap();

        // Ciphertext differs from one-shot output (fresh ephemeral), but
        // decrypts to the same plaintext, chunked or not.
        let mut dec = Sm2DecryptCtx::new(&key);
        dec.update(&der[..10]).unwrap();
        dec.update(&der[10..50]).unwrap();
        assert_eq!(dec.finish(&der[50..]).unwrap(), msg);

        assert_eq!(key.decrypt(&der).unwrap(), msg);
    }

    #[test]
    fn test_finish_direct_path() {
        let key = Sm2KeyPair::generate().unwrap();
        let msg = b"no update calls at all";

        let enc = Sm2EncryptCtx::new(&key);
        let der = enc.finish(msg).unwrap();

        let dec = Sm2DecryptCtx::new(&key);
        assert_eq!(dec.finish(&der).unwrap(), msg);
    }

    #[test]
    fn test_empty_total_rejected() {
        let key = Sm2KeyPair::generate().unwrap();
        let enc = Sm2EncryptCtx::new(&key);
        assert!(matches!(enc.finish(b""), Err(CryptoError::InvalidArg)));

        let dec = Sm2DecryptCtx::new(&key);
        assert!(dec.finish(b"").is_err());
    }

    #[test]
    fn test_update_overflow() {
        let key = Sm2KeyPair::generate().unwrap();

        let mut enc = Sm2EncryptCtx::new(&key);
        enc.update(&[0u8; SM2_MAX_PLAINTEXT_SIZE]).unwrap();
        assert!(matches!(
            enc.update(&[0u8]),
            Err(CryptoError::InputOverflow)
        ));

        let mut dec = Sm2DecryptCtx::new(&key);
        dec.update(&[0u8; SM2_MAX_CIPHERTEXT_SIZE]).unwrap();
        assert!(matches!(
            dec.update(&[0u8]),
            Err(CryptoError::InputOverflow)
        ));
    }

    #[test]
    fn test_finish_overflow_on_last_chunk() {
        let key = Sm2KeyPair::generate().unwrap();
        let mut enc = Sm2EncryptCtx::new(&key);
        enc.update(&[0u8; SM2_MAX_PLAINTEXT_SIZE - 1]).unwrap();
        assert!(matches!(
            enc.finish(&[0u8; 2]),
            Err(CryptoError::InputOverflow)
        ));
    }

    #[test]
    fn test_max_output_len() {
        let key = Sm2KeyPair::generate().unwrap();
        assert_eq!(
            Sm2EncryptCtx::new(&key).max_output_len(),
            SM2_MAX_CIPHERTEXT_SIZE
        );
        assert_eq!(
            Sm2DecryptCtx::new(&key).max_output_len(),
            SM2_MAX_PLAINTEXT_SIZE
        );
    }
}
