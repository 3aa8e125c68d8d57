//! Random big number generation using OS randomness.

use crate::bignum::BigNum;
use shangmi_types::CryptoError;

impl BigNum {
    /// Generate a random BigNum uniformly in [1, upper).
    ///
    /// Uses rejection sampling so the distribution stays uniform; zero is
    /// rejected along with out-of-range candidates.
    pub fn random_range(upper: &BigNum) -> Result<BigNum, CryptoError> {
        if upper.is_zero() || upper.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let bits = upper.bit_len();
        let num_bytes = bits.div_ceil(8);
        let excess = num_bytes * 8 - bits;

        loop {
            let mut buf = vec![0u8; num_bytes];
            getrandom::getrandom(&mut buf).map_err(|_| CryptoError::BnRandGenFail)?;

            // Mask excess bits in the most significant byte
            if excess > 0 {
                buf[0] &= 0xFF >> excess;
            }

            let candidate = BigNum::from_bytes_be(&buf);
            if !candidate.is_zero() && candidate < *upper {
                return Ok(candidate);
            }
        }
    }
}
