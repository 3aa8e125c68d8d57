//! Integration tests for the shangmi workspace.
//! Cross-crate roundtrip and wire-format tests.

#[cfg(test)]
mod tests {
    use shangmi_bignum::BigNum;
    use shangmi_crypto::sm2::{
        PointSize, Sm2Ciphertext, Sm2DecryptCtx, Sm2EncryptCtx, Sm2KeyPair,
        SM2_MAX_CIPHERTEXT_SIZE, SM2_MAX_PLAINTEXT_SIZE,
    };
    use shangmi_types::CryptoError;
    use shangmi_utils::asn1;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    // -------------------------------------------------------
    // 1. Full-stack round trip across key export/import
    // -------------------------------------------------------
    #[test]
    fn test_encrypt_with_exported_public_key() {
        let receiver = Sm2KeyPair::generate().unwrap();
        let sender = Sm2KeyPair::from_public_key(&receiver.public_key_bytes().unwrap()).unwrap();

        let message = b"cross-crate roundtrip message";
        let der = sender.encrypt(message).unwrap();
        assert_eq!(receiver.decrypt(&der).unwrap(), message);
    }

    // -------------------------------------------------------
    // 2. Ciphertext DER envelope is well-formed ASN.1
    // -------------------------------------------------------
    #[test]
    fn test_ciphertext_der_structure() {
        let key = Sm2KeyPair::generate().unwrap();
        let der = key.encrypt(b"wire format check").unwrap();

        let mut dec = asn1::Decoder::new(&der);
        let mut seq = dec.read_sequence().unwrap();
        assert!(dec.is_empty(), "bytes after the SEQUENCE");

        let x = seq.read_integer().unwrap();
        let y = seq.read_integer().unwrap();
        assert!(x.len() <= 32 && y.len() <= 32);

        let tag = seq.read_octet_string().unwrap();
        assert_eq!(tag.len(), 32);

        let body = seq.read_octet_string().unwrap();
        assert_eq!(body.len(), b"wire format check".len());

        assert!(seq.is_empty(), "bytes after the last OCTET STRING");
    }

    // -------------------------------------------------------
    // 3. Re-encoding a decoded ciphertext is byte-identical
    // -------------------------------------------------------
    #[test]
    fn test_der_reencode_identity() {
        let key = Sm2KeyPair::generate().unwrap();
        let der = key.encrypt(b"canonical form").unwrap();
        let parsed = Sm2Ciphertext::from_der(&der).unwrap();
        assert_eq!(parsed.to_der(), der);
        assert_eq!(parsed.encoded_len(), der.len());
    }

    // -------------------------------------------------------
    // 4. Fixed-length envelope arithmetic via the asn1 crate
    // -------------------------------------------------------
    #[test]
    fn test_fixlen_envelope_arithmetic() {
        let key = Sm2KeyPair::generate().unwrap();
        let message = [0xC3u8; 40];

        for point_size in [PointSize::Compact, PointSize::Typical, PointSize::Max] {
            let inner = point_size as usize
                + asn1::octet_string_len(32)
                + asn1::octet_string_len(message.len());
            let expected = asn1::sequence_len(inner);

            let der = key.encrypt_fixlen(&message, point_size).unwrap();
            assert_eq!(der.len(), expected, "{point_size:?}");
            assert_eq!(key.decrypt(&der).unwrap(), message);
        }
    }

    // -------------------------------------------------------
    // 5. Size constants are consistent with the DER arithmetic
    // -------------------------------------------------------
    #[test]
    fn test_max_ciphertext_size_formula() {
        let inner = PointSize::Max as usize
            + asn1::octet_string_len(32)
            + asn1::octet_string_len(SM2_MAX_PLAINTEXT_SIZE);
        assert_eq!(asn1::sequence_len(inner), SM2_MAX_CIPHERTEXT_SIZE);
    }

    // -------------------------------------------------------
    // 6. Streaming facade against the one-shot API
    // -------------------------------------------------------
    #[test]
    fn test_streaming_one_shot_equivalence() {
        let key = Sm2KeyPair::generate().unwrap();
        let message: Vec<u8> = (0..100u8).collect();

        let mut enc = Sm2EncryptCtx::new(&key);
        for chunk in message.chunks(33) {
            enc.update(chunk).unwrap();
        }
        let der = enc.finish(&[]).unwrap();

        let mut dec = Sm2DecryptCtx::new(&key);
        dec.update(&der).unwrap();
        assert_eq!(dec.finish(&[]).unwrap(), message);

        assert_eq!(key.decrypt(&der).unwrap(), message);
    }

    // -------------------------------------------------------
    // 7. Tamper anywhere in the envelope never silently corrupts
    // -------------------------------------------------------
    #[test]
    fn test_bit_flip_sweep_never_decrypts_wrong() {
        let key = Sm2KeyPair::generate().unwrap();
        let message = b"no silent corruption";
        let der = key.encrypt(message).unwrap();

        for i in (0..der.len()).step_by(16) {
            let mut bad = der.clone();
            bad[i] ^= 0x01;
            match key.decrypt(&bad) {
                Ok(recovered) => assert_eq!(recovered, message),
                Err(
                    CryptoError::Sm2DecryptFail
                    | CryptoError::DecodeAsn1Fail
                    | CryptoError::EccPointNotOnCurve,
                ) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    // -------------------------------------------------------
    // 8. Key derivation against the GB/T 32918 example key
    // -------------------------------------------------------
    #[test]
    fn test_private_key_bytes_reproduce_public_key() {
        let d = hex("1649AB77A00637BD5E2EFE283FBF353534AA7F7CB89463F208DDBC2920BB0DA0");
        let key = Sm2KeyPair::from_private_key(&d).unwrap();
        assert_eq!(key.private_key_bytes().unwrap(), d);
        assert_eq!(
            key.public_key_bytes().unwrap(),
            hex(
                "04191BFF8148006EEA72D857CB974DB9F4903B3CA3655D8D597AD4663F5044DC\
                 B1E2F7888AF1FCD8C653A8059CD2F379855389F71A7709E2C1EE1E914C855EF1\
                 19"
            )
        );

        // Smallest valid private key still produces a usable pair
        let one = BigNum::from_u64(1).to_bytes_be_padded(32).unwrap();
        let key = Sm2KeyPair::from_private_key(&one).unwrap();
        let der = key.encrypt(b"d = 1").unwrap();
        assert_eq!(key.decrypt(&der).unwrap(), b"d = 1");
    }
}
