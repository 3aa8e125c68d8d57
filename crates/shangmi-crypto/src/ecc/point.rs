//! Jacobian coordinate point arithmetic.
//!
//! Points are held in Jacobian projective coordinates (X, Y, Z), standing
//! for the affine point (X/Z², Y/Z³); Z = 0 encodes the point at infinity.
//! The doubling formula takes the a = p - 3 shortcut, which SM2P256V1
//! satisfies.

use shangmi_bignum::BigNum;
use shangmi_types::CryptoError;

use super::curves::CurveParams;

/// A point in Jacobian projective coordinates.
#[derive(Clone)]
pub(crate) struct JacobianPoint {
    pub x: BigNum,
    pub y: BigNum,
    pub z: BigNum,
}

impl JacobianPoint {
    /// The point at infinity (identity element).
    pub fn infinity() -> Self {
        JacobianPoint {
            x: BigNum::from_u64(1),
            y: BigNum::from_u64(1),
            z: BigNum::zero(),
        }
    }

    /// Lift an affine point into Jacobian coordinates (Z = 1).
    pub fn from_affine(x: &BigNum, y: &BigNum) -> Self {
        JacobianPoint {
            x: x.clone(),
            y: y.clone(),
            z: BigNum::from_u64(1),
        }
    }

    /// Check if this point is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// Recover affine coordinates (X/Z², Y/Z³), or None at infinity.
    pub fn to_affine(&self, p: &BigNum) -> Result<Option<(BigNum, BigNum)>, CryptoError> {
        if self.is_infinity() {
            return Ok(None);
        }

        let z_inv = self.z.mod_inv(p)?;
        let z_inv2 = z_inv.mod_mul(&z_inv, p)?;
        let z_inv3 = z_inv2.mod_mul(&z_inv, p)?;

        Ok(Some((
            self.x.mod_mul(&z_inv2, p)?,
            self.y.mod_mul(&z_inv3, p)?,
        )))
    }

    /// Point addition: self + other.
    pub fn add(&self, other: &JacobianPoint, params: &CurveParams) -> Result<Self, CryptoError> {
        let p = &params.p;

        if self.is_infinity() {
            return Ok(other.clone());
        }
        if other.is_infinity() {
            return Ok(self.clone());
        }

        // U1 = X1·Z2², U2 = X2·Z1², S1 = Y1·Z2³, S2 = Y2·Z1³
        let z2_sq = other.z.mod_mul(&other.z, p)?;
        let u1 = self.x.mod_mul(&z2_sq, p)?;
        let z1_sq = self.z.mod_mul(&self.z, p)?;
        let u2 = other.x.mod_mul(&z1_sq, p)?;
        let s1 = self.y.mod_mul(&z2_sq.mod_mul(&other.z, p)?, p)?;
        let s2 = other.y.mod_mul(&z1_sq.mod_mul(&self.z, p)?, p)?;

        let h = u2.mod_sub(&u1, p)?;
        let r = s2.mod_sub(&s1, p)?;

        if h.is_zero() {
            if r.is_zero() {
                // Same point: fall back to doubling
                return self.double(params);
            }
            // Inverse points sum to infinity
            return Ok(JacobianPoint::infinity());
        }

        let h_sq = h.mod_mul(&h, p)?;
        let h_cu = h_sq.mod_mul(&h, p)?;
        let u1_h_sq = u1.mod_mul(&h_sq, p)?;

        // X3 = R² - H³ - 2·U1·H²
        let x3 = r
            .mod_mul(&r, p)?
            .mod_sub(&h_cu, p)?
            .mod_sub(&u1_h_sq, p)?
            .mod_sub(&u1_h_sq, p)?;

        // Y3 = R·(U1·H² - X3) - S1·H³
        let y3 = r
            .mod_mul(&u1_h_sq.mod_sub(&x3, p)?, p)?
            .mod_sub(&s1.mod_mul(&h_cu, p)?, p)?;

        // Z3 = H·Z1·Z2
        let z3 = h.mod_mul(&self.z, p)?.mod_mul(&other.z, p)?;

        Ok(JacobianPoint {
            x: x3,
            y: y3,
            z: z3,
        })
    }

    /// Point doubling: 2·self, with M = 3·(X+Z²)·(X-Z²) for a = p - 3.
    pub fn double(&self, params: &CurveParams) -> Result<Self, CryptoError> {
        let p = &params.p;

        if self.is_infinity() || self.y.is_zero() {
            return Ok(JacobianPoint::infinity());
        }

        let two = BigNum::from_u64(2);
        let three = BigNum::from_u64(3);
        let four = BigNum::from_u64(4);
        let eight = BigNum::from_u64(8);

        // S = 4·X·Y²
        let y_sq = self.y.mod_mul(&self.y, p)?;
        let s = self.x.mod_mul(&y_sq, p)?.mod_mul(&four, p)?;

        // M = 3·(X + Z²)·(X - Z²)
        let z_sq = self.z.mod_mul(&self.z, p)?;
        let m = self
            .x
            .mod_add(&z_sq, p)?
            .mod_mul(&self.x.mod_sub(&z_sq, p)?, p)?
            .mod_mul(&three, p)?;

        // X3 = M² - 2·S
        let x3 = m.mod_mul(&m, p)?.mod_sub(&s.mod_mul(&two, p)?, p)?;

        // Y3 = M·(S - X3) - 8·Y⁴
        let y4 = y_sq.mod_mul(&y_sq, p)?;
        let y3 = m
            .mod_mul(&s.mod_sub(&x3, p)?, p)?
            .mod_sub(&y4.mod_mul(&eight, p)?, p)?;

        // Z3 = 2·Y·Z
        let z3 = self.y.mod_mul(&self.z, p)?.mod_mul(&two, p)?;

        Ok(JacobianPoint {
            x: x3,
            y: y3,
            z: z3,
        })
    }
}

/// Scalar multiplication: k * point, double-and-add from the top bit down.
pub(crate) fn scalar_mul(
    k: &BigNum,
    point: &JacobianPoint,
    params: &CurveParams,
) -> Result<JacobianPoint, CryptoError> {
    if k.is_zero() || point.is_infinity() {
        return Ok(JacobianPoint::infinity());
    }

    let mut acc = JacobianPoint::infinity();
    for i in (0..k.bit_len()).rev() {
        acc = acc.double(params)?;
        if k.get_bit(i) != 0 {
            acc = acc.add(point, params)?;
        }
    }
    Ok(acc)
}
