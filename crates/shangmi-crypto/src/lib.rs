#![forbid(unsafe_code)]
#![doc = "SM2 public-key encryption and its supporting primitives (SM3, SM2 curve)."]

pub mod ecc;
pub mod sm2;
pub mod sm3;
