#![forbid(unsafe_code)]
#![doc = "Cryptography-safe big number arithmetic for the shangmi workspace."]

mod bignum;
mod ops;
mod rand;

pub use bignum::BigNum;
