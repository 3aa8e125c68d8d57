//! Elliptic curve primitives for the SM2 curve.
//!
//! Exposes an affine point type and a group handle for SM2P256V1. The
//! affine representation deliberately cannot encode the point at infinity;
//! a scalar multiplication that lands there reports `EccPointAtInfinity`.
//! With cofactor 1 and on-curve-checked inputs that cannot happen on any
//! encryption or decryption path.

use shangmi_bignum::BigNum;
use shangmi_types::CryptoError;

mod curves;
mod point;

use curves::{sm2p256v1_params, CurveParams};
use point::JacobianPoint;

/// An elliptic curve group (the curve and its parameters).
#[derive(Clone)]
pub struct EcGroup {
    params: CurveParams,
}

impl EcGroup {
    /// The SM2P256V1 curve (GB/T 32918.5-2017).
    pub fn sm2_p256v1() -> Self {
        Self {
            params: sm2p256v1_params(),
        }
    }

    /// Order n of the base point.
    pub fn order(&self) -> &BigNum {
        &self.params.n
    }

    /// Field element size in bytes.
    pub fn field_size(&self) -> usize {
        self.params.field_size
    }

    /// Compute k·G for the curve generator G.
    pub fn scalar_mul_base(&self, k: &BigNum) -> Result<EcPoint, CryptoError> {
        let g = JacobianPoint::from_affine(&self.params.gx, &self.params.gy);
        self.scalar_mul_jacobian(k, &g)
    }

    /// Compute k·P for an affine point P.
    pub fn scalar_mul(&self, k: &BigNum, point: &EcPoint) -> Result<EcPoint, CryptoError> {
        let lifted = JacobianPoint::from_affine(&point.x, &point.y);
        self.scalar_mul_jacobian(k, &lifted)
    }

    fn scalar_mul_jacobian(
        &self,
        k: &BigNum,
        point: &JacobianPoint,
    ) -> Result<EcPoint, CryptoError> {
        let product = point::scalar_mul(k, point, &self.params)?;
        match product.to_affine(&self.params.p)? {
            Some((x, y)) => Ok(EcPoint { x, y }),
            None => Err(CryptoError::EccPointAtInfinity),
        }
    }

    /// Check that a point satisfies y² = x³ + ax + b (mod p) with both
    /// coordinates in field range.
    pub fn is_on_curve(&self, point: &EcPoint) -> bool {
        let p = &self.params.p;
        if point.x >= *p || point.y >= *p {
            return false;
        }

        let on_curve = || -> Result<bool, CryptoError> {
            let lhs = point.y.mod_mul(&point.y, p)?;
            let x_sq = point.x.mod_mul(&point.x, p)?;
            let x_cu = x_sq.mod_mul(&point.x, p)?;
            let ax = self.params.a.mod_mul(&point.x, p)?;
            let rhs = x_cu.mod_add(&ax, p)?.mod_add(&self.params.b, p)?;
            Ok(lhs == rhs)
        };
        on_curve().unwrap_or(false)
    }
}

/// A point on the curve in affine coordinates.
///
/// Coordinates are wiped on drop, so secret-derived points (k·P, d·C1) need
/// no explicit cleanup.
#[derive(Clone)]
pub struct EcPoint {
    x: BigNum,
    y: BigNum,
}

impl EcPoint {
    /// Create a point from affine coordinates without validation.
    pub fn new(x: BigNum, y: BigNum) -> Self {
        Self { x, y }
    }

    /// The affine x-coordinate.
    pub fn x(&self) -> &BigNum {
        &self.x
    }

    /// The affine y-coordinate.
    pub fn y(&self) -> &BigNum {
        &self.y
    }

    /// Serialize as x || y, each 32-byte big-endian.
    pub fn to_xy_bytes(&self) -> Result<[u8; 64], CryptoError> {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.x.to_bytes_be_padded(32)?);
        out[32..].copy_from_slice(&self.y.to_bytes_be_padded(32)?);
        Ok(out)
    }

    /// Deserialize from x || y. Does not check the point is on the curve.
    pub fn from_xy_bytes(bytes: &[u8; 64]) -> Self {
        Self {
            x: BigNum::from_bytes_be(&bytes[..32]),
            y: BigNum::from_bytes_be(&bytes[32..]),
        }
    }

    /// Encode in uncompressed form: 0x04 || x || y.
    pub fn to_uncompressed(&self) -> Result<Vec<u8>, CryptoError> {
        let mut out = Vec::with_capacity(65);
        out.push(0x04);
        out.extend_from_slice(&self.to_xy_bytes()?);
        Ok(out)
    }

    /// Decode an uncompressed point and check it lies on the curve.
    pub fn from_uncompressed(group: &EcGroup, data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != 65 || data[0] != 0x04 {
            return Err(CryptoError::EccInvalidPublicKey);
        }
        let mut xy = [0u8; 64];
        xy.copy_from_slice(&data[1..]);
        let point = Self::from_xy_bytes(&xy);
        if !group.is_on_curve(&point) {
            return Err(CryptoError::EccPointNotOnCurve);
        }
        Ok(point)
    }
}
