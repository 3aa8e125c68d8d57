#![forbid(unsafe_code)]
#![doc = "Utility functions for the shangmi workspace: ASN.1 DER."]

pub mod asn1;
