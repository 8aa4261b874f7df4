use dtls_auth::types::{HashAlgorithm, NamedCurve};
use dtls_auth::{generate_key_signature, value_key_message, verify_key_signature, Config, Error};

use crate::common::*;

const CLIENT_RANDOM: [u8; 32] = [0x11; 32];
const SERVER_RANDOM: [u8; 32] = [0x22; 32];

fn ephemeral_key() -> Vec<u8> {
    (0..65u8).collect()
}

fn hashes_for(kind: KeyKind) -> &'static [HashAlgorithm] {
    match kind {
        // Ed25519 ignores the negotiated hash
        KeyKind::Ed25519 => &[HashAlgorithm::SHA256],
        // SHA-1 digests are shorter than half the P-384 field
        KeyKind::P384 => &[
            HashAlgorithm::SHA256,
            HashAlgorithm::SHA384,
            HashAlgorithm::SHA512,
        ],
        _ => &[
            HashAlgorithm::SHA1,
            HashAlgorithm::SHA256,
            HashAlgorithm::SHA384,
            HashAlgorithm::SHA512,
        ],
    }
}

#[test]
fn key_signature_round_trip() {
    let _ = env_logger::try_init();
    let config = Config::default();

    for kind in ALL_KINDS {
        let cert = issue(params(kind, "server"));
        let der = self_signed(&cert);
        let key = signing_key(&config, &cert);

        for &hash in hashes_for(kind) {
            let signature = generate_key_signature(
                &config,
                &CLIENT_RANDOM,
                &SERVER_RANDOM,
                &ephemeral_key(),
                NamedCurve::Secp256r1,
                &*key,
                hash,
            )
            .unwrap();

            let message = value_key_message(
                &CLIENT_RANDOM,
                &SERVER_RANDOM,
                &ephemeral_key(),
                NamedCurve::Secp256r1,
            );

            verify_key_signature(&config, &message, &signature, hash, &[&der])
                .unwrap_or_else(|e| panic!("{:?}/{:?}: {}", kind, hash, e));
        }
    }
}

#[test]
fn key_signature_flipped_byte_fails() {
    let _ = env_logger::try_init();
    let config = Config::default();

    for kind in ALL_KINDS {
        let cert = issue(params(kind, "server"));
        let der = self_signed(&cert);
        let key = signing_key(&config, &cert);

        let signature = generate_key_signature(
            &config,
            &CLIENT_RANDOM,
            &SERVER_RANDOM,
            &ephemeral_key(),
            NamedCurve::X25519,
            &*key,
            HashAlgorithm::SHA256,
        )
        .unwrap();
        let message =
            value_key_message(&CLIENT_RANDOM, &SERVER_RANDOM, &ephemeral_key(), NamedCurve::X25519);

        for i in [0, signature.len() / 2, signature.len() - 1] {
            let mut tampered = signature.clone();
            tampered[i] ^= 0x01;

            let result =
                verify_key_signature(&config, &message, &tampered, HashAlgorithm::SHA256, &[&der]);
            assert!(
                matches!(
                    result,
                    Err(Error::SignatureMismatch)
                        | Err(Error::SignatureDecodeError(_))
                        | Err(Error::InvalidSignatureEncoding)
                ),
                "{:?} byte {}: {:?}",
                kind,
                i,
                result
            );
        }
    }
}

#[test]
fn key_signature_other_message_fails() {
    let config = Config::default();
    let cert = issue(params(KeyKind::P256, "server"));
    let der = self_signed(&cert);
    let key = signing_key(&config, &cert);

    let signature = generate_key_signature(
        &config,
        &CLIENT_RANDOM,
        &SERVER_RANDOM,
        &ephemeral_key(),
        NamedCurve::Secp256r1,
        &*key,
        HashAlgorithm::SHA256,
    )
    .unwrap();

    // Verifier saw a different server random
    let message = value_key_message(
        &CLIENT_RANDOM,
        &[0x33; 32],
        &ephemeral_key(),
        NamedCurve::Secp256r1,
    );
    let result =
        verify_key_signature(&config, &message, &signature, HashAlgorithm::SHA256, &[&der]);
    assert!(matches!(result, Err(Error::SignatureMismatch)));
}

#[test]
fn key_signature_empty_chain() {
    let config = Config::default();
    let chain: [&[u8]; 0] = [];
    let result =
        verify_key_signature(&config, b"message", &[1, 2, 3], HashAlgorithm::SHA256, &chain);
    assert!(matches!(result, Err(Error::EmptyChain)));
}

#[test]
fn ecdsa_zero_r_rejected() {
    let config = Config::default();
    let cert = issue(params(KeyKind::P256, "server"));
    let der = self_signed(&cert);

    // SEQUENCE { INTEGER 0, INTEGER 1 }
    let signature = [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x01];
    let result =
        verify_key_signature(&config, b"message", &signature, HashAlgorithm::SHA256, &[&der]);
    assert!(matches!(result, Err(Error::InvalidSignatureEncoding)));
}

#[test]
fn ecdsa_malformed_signature() {
    let config = Config::default();
    let cert = issue(params(KeyKind::P384, "server"));
    let der = self_signed(&cert);

    let result = verify_key_signature(
        &config,
        b"message",
        &[0x30, 0x05, 0x02],
        HashAlgorithm::SHA384,
        &[&der],
    );
    assert!(matches!(result, Err(Error::SignatureDecodeError(_))));
}

#[test]
fn unsupported_hash_rejected() {
    let config = Config::default();
    let cert = issue(params(KeyKind::P256, "server"));
    let key = signing_key(&config, &cert);

    let result = generate_key_signature(
        &config,
        &CLIENT_RANDOM,
        &SERVER_RANDOM,
        &ephemeral_key(),
        NamedCurve::Secp256r1,
        &*key,
        HashAlgorithm::MD5,
    );
    assert!(matches!(
        result,
        Err(Error::UnsupportedHashAlgorithm(HashAlgorithm::MD5))
    ));
}

#[test]
fn rsa_key_under_ecdsa_certificate_rejected() {
    let config = Config::default();
    let ca = issue(ca_params(KeyKind::P256, "ca"));
    let leaf = issue(params(KeyKind::Rsa, "server"));
    let der = signed_by(&leaf, &ca);
    let key = signing_key(&config, &leaf);

    let signature = generate_key_signature(
        &config,
        &CLIENT_RANDOM,
        &SERVER_RANDOM,
        &ephemeral_key(),
        NamedCurve::Secp256r1,
        &*key,
        HashAlgorithm::SHA256,
    )
    .unwrap();
    let message =
        value_key_message(&CLIENT_RANDOM, &SERVER_RANDOM, &ephemeral_key(), NamedCurve::Secp256r1);

    let result =
        verify_key_signature(&config, &message, &signature, HashAlgorithm::SHA256, &[&der]);
    assert!(matches!(result, Err(Error::UnsupportedKeyType(_))));
}

#[test]
fn ecdsa_unsupported_curve_rejected() {
    let config = Config::default();
    let der = include_bytes!("../data/p521_cert.der");

    // SEQUENCE { INTEGER 1, INTEGER 1 }
    let signature = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01];
    let result =
        verify_key_signature(&config, b"message", &signature, HashAlgorithm::SHA512, &[der]);
    assert!(matches!(result, Err(Error::UnsupportedKeyType(_))));
}
