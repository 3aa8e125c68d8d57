/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("null or empty input")]
    NullInput,
    #[error("invalid argument")]
    InvalidArg,
    #[error("input data too long")]
    InputOverflow,

    // BigNum errors
    #[error("big number: insufficient space")]
    BnSpaceNotEnough,
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,
    #[error("big number: random generation failed")]
    BnRandGenFail,

    // ECC errors
    #[error("ecc: point at infinity")]
    EccPointAtInfinity,
    #[error("ecc: point not on curve")]
    EccPointNotOnCurve,
    #[error("ecc: invalid private key")]
    EccInvalidPrivateKey,
    #[error("ecc: invalid public key")]
    EccInvalidPublicKey,

    // SM2 errors
    #[error("sm2: decryption failed")]
    Sm2DecryptFail,
    #[error("sm2: fixed-length point retry limit exceeded")]
    Sm2FixlenRetryLimit,

    // Encoding/Decoding errors
    #[error("decode: asn1 buffer failed")]
    DecodeAsn1Fail,
}
