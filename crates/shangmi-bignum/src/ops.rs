//! Arithmetic and modular operations for BigNum.

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use shangmi_types::CryptoError;
use std::cmp::Ordering;

impl BigNum {
    /// Signed addition: self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            let mut sum = BigNum::from_limbs(add_limbs(self.limbs(), other.limbs()));
            sum.set_negative(self.is_negative());
            sum
        } else if self.is_negative() {
            // (-a) + b = b - a
            sub_magnitudes(other, self)
        } else {
            // a + (-b) = a - b
            sub_magnitudes(self, other)
        }
    }

    /// Signed subtraction: self - other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            let mut sum = BigNum::from_limbs(add_limbs(self.limbs(), other.limbs()));
            sum.set_negative(self.is_negative());
            sum
        } else if self.is_negative() {
            // (-a) - (-b) = b - a
            sub_magnitudes(other, self)
        } else {
            sub_magnitudes(self, other)
        }
    }

    /// Signed multiplication: self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        let mut product = BigNum::from_limbs(mul_limbs(self.limbs(), other.limbs()));
        product.set_negative(self.is_negative() != other.is_negative());
        product
    }

    /// Division with remainder: returns (quotient, remainder).
    ///
    /// The quotient is truncated toward zero and the remainder carries the
    /// sign of the dividend, so `self = quotient * divisor + remainder`.
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        let (q_limbs, r_limbs) = div_rem_limbs(self.limbs(), divisor.limbs());
        let mut quotient = BigNum::from_limbs(q_limbs);
        let mut remainder = BigNum::from_limbs(r_limbs);
        quotient.set_negative(self.is_negative() != divisor.is_negative());
        remainder.set_negative(self.is_negative());
        Ok((quotient, remainder))
    }

    /// Modular reduction into [0, modulus): self mod modulus.
    ///
    /// The modulus must be positive.
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        let (_, mut r) = self.div_rem(modulus)?;
        if r.is_negative() {
            r = r.add(modulus);
        }
        Ok(r)
    }

    /// Modular addition: (self + other) mod modulus.
    pub fn mod_add(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        // Reduced operands need at most one subtraction, no division
        if !self.is_negative() && !other.is_negative() && *self < *modulus && *other < *modulus {
            let sum = self.add(other);
            if sum < *modulus {
                return Ok(sum);
            }
            return Ok(sum.sub(modulus));
        }
        self.add(other).mod_reduce(modulus)
    }

    /// Modular subtraction: (self - other) mod modulus.
    pub fn mod_sub(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        // Reduced operands need at most one addition, no division
        if !self.is_negative() && !other.is_negative() && *self < *modulus && *other < *modulus {
            let diff = self.sub(other);
            if diff.is_negative() {
                return Ok(diff.add(modulus));
            }
            return Ok(diff);
        }
        self.sub(other).mod_reduce(modulus)
    }

    /// Modular multiplication: (self * other) mod modulus.
    pub fn mod_mul(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.mul(other).mod_reduce(modulus)
    }

    /// Compute the modular inverse: self^(-1) mod modulus.
    ///
    /// Returns `Err(BnNoInverse)` if gcd(self, modulus) != 1.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() || modulus.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        // Extended Euclidean algorithm, tracking only the Bezout coefficient
        // of self: old_r = old_s * self (mod modulus).
        let mut old_r = self.mod_reduce(modulus)?;
        if old_r.is_zero() {
            return Err(CryptoError::BnNoInverse);
        }
        let mut r = modulus.clone();
        let mut old_s = BigNum::from_u64(1);
        let mut s = BigNum::zero();

        while !r.is_zero() {
            let (quotient, remainder) = old_r.div_rem(&r)?;
            old_r = r;
            r = remainder;

            let next_s = old_s.sub(&quotient.mul(&s));
            old_s = s;
            s = next_s;
        }

        if !old_r.is_one() {
            return Err(CryptoError::BnNoInverse);
        }
        old_s.mod_reduce(modulus)
    }
}

/// Compare two little-endian limb slices as magnitudes.
pub(crate) fn cmp_limbs(a: &[Limb], b: &[Limb]) -> Ordering {
    for i in (0..a.len().max(b.len())).rev() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        match av.cmp(&bv) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// Magnitude subtraction with sign: a_mag - b_mag.
fn sub_magnitudes(a: &BigNum, b: &BigNum) -> BigNum {
    match cmp_limbs(a.limbs(), b.limbs()) {
        Ordering::Equal => BigNum::zero(),
        Ordering::Greater => BigNum::from_limbs(sub_limbs(a.limbs(), b.limbs())),
        Ordering::Less => {
            let mut r = BigNum::from_limbs(sub_limbs(b.limbs(), a.limbs()));
            r.set_negative(true);
            r
        }
    }
}

/// Add two limb magnitudes.
fn add_limbs(a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    let max_len = a.len().max(b.len());
    let mut out = vec![0u64; max_len + 1];
    let mut carry: DoubleLimb = 0;

    for (i, limb) in out.iter_mut().take(max_len).enumerate() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        let sum = av as DoubleLimb + bv as DoubleLimb + carry;
        *limb = sum as Limb;
        carry = sum >> LIMB_BITS;
    }
    out[max_len] = carry as Limb;
    out
}

/// Subtract limb magnitudes: a - b, requiring a >= b.
fn sub_limbs(a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    let mut out = a.to_vec();
    sub_limbs_in_place(&mut out, b);
    out
}

/// In-place magnitude subtraction: a -= b, requiring a >= b.
fn sub_limbs_in_place(a: &mut [Limb], b: &[Limb]) {
    let mut borrow = 0u64;
    for (i, limb) in a.iter_mut().enumerate() {
        let bv = b.get(i).copied().unwrap_or(0);
        let (d1, o1) = limb.overflowing_sub(bv);
        let (d2, o2) = d1.overflowing_sub(borrow);
        *limb = d2;
        borrow = (o1 as u64) + (o2 as u64);
    }
    debug_assert_eq!(borrow, 0, "magnitude subtraction underflow");
}

/// Schoolbook multiplication of limb magnitudes.
fn mul_limbs(a: &[Limb], b: &[Limb]) -> Vec<Limb> {
    let mut out = vec![0u64; a.len() + b.len()];
    for (i, &av) in a.iter().enumerate() {
        let mut carry: DoubleLimb = 0;
        for (j, &bv) in b.iter().enumerate() {
            let t = av as DoubleLimb * bv as DoubleLimb + out[i + j] as DoubleLimb + carry;
            out[i + j] = t as Limb;
            carry = t >> LIMB_BITS;
        }
        out[i + b.len()] = carry as Limb;
    }
    out
}

/// Shift a limb magnitude left by one bit, growing it if needed.
fn shl1_in_place(limbs: &mut Vec<Limb>) {
    let mut carry = 0u64;
    for limb in limbs.iter_mut() {
        let next = *limb >> (LIMB_BITS - 1);
        *limb = (*limb << 1) | carry;
        carry = next;
    }
    if carry != 0 {
        limbs.push(carry);
    }
}

/// Binary long division of magnitudes: returns (quotient, remainder).
fn div_rem_limbs(a: &[Limb], b: &[Limb]) -> (Vec<Limb>, Vec<Limb>) {
    if cmp_limbs(a, b) == Ordering::Less {
        return (vec![0], a.to_vec());
    }

    let bits = slice_bit_len(a);
    let mut quotient = vec![0u64; a.len()];
    let mut remainder: Vec<Limb> = vec![0];

    for i in (0..bits).rev() {
        shl1_in_place(&mut remainder);
        remainder[0] |= (a[i / LIMB_BITS] >> (i % LIMB_BITS)) & 1;
        if cmp_limbs(&remainder, b) != Ordering::Less {
            sub_limbs_in_place(&mut remainder, b);
            quotient[i / LIMB_BITS] |= 1u64 << (i % LIMB_BITS);
        }
    }

    (quotient, remainder)
}

/// Significant bits of a limb slice.
fn slice_bit_len(limbs: &[Limb]) -> usize {
    for i in (0..limbs.len()).rev() {
        if limbs[i] != 0 {
            return i * LIMB_BITS + (LIMB_BITS - limbs[i].leading_zeros() as usize);
        }
    }
    0
}
