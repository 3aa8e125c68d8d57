#![forbid(unsafe_code)]
#![doc = "Common types and error codes for the shangmi SM2/SM3 workspace."]

pub mod error;

pub use error::*;
