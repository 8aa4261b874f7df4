use dtls_auth::types::HashAlgorithm;
use dtls_auth::{generate_certificate_verify, verify_certificate_verify, Config, Error};

use crate::common::*;

fn transcript() -> Vec<u8> {
    // ClientHello .. ClientKeyExchange, as the handshake layer would buffer them
    (0..1024u32).map(|i| (i * 7 % 251) as u8).collect()
}

#[test]
fn certificate_verify_round_trip() {
    let _ = env_logger::try_init();
    let config = Config::default();

    for kind in ALL_KINDS {
        let cert = issue(params(kind, "client"));
        let der = self_signed(&cert);
        let key = signing_key(&config, &cert);

        let signature =
            generate_certificate_verify(&config, &transcript(), &*key, HashAlgorithm::SHA256)
                .unwrap();

        verify_certificate_verify(
            &config,
            &transcript(),
            HashAlgorithm::SHA256,
            &signature,
            &[&der],
        )
        .unwrap_or_else(|e| panic!("{:?}: {}", kind, e));
    }
}

#[test]
fn certificate_verify_ed25519_ignores_hash() {
    let config = Config::default();
    let cert = issue(params(KeyKind::Ed25519, "client"));
    let der = self_signed(&cert);
    let key = signing_key(&config, &cert);

    let signature =
        generate_certificate_verify(&config, &transcript(), &*key, HashAlgorithm::SHA512).unwrap();
    verify_certificate_verify(&config, &transcript(), HashAlgorithm::SHA384, &signature, &[&der])
        .unwrap();
}

#[test]
fn certificate_verify_ecdsa_hash_asymmetry() {
    let config = Config::default();
    let cert = issue(params(KeyKind::P256, "client"));
    let der = self_signed(&cert);
    let key = signing_key(&config, &cert);

    // Generation digests with SHA-256 whatever the negotiated hash,
    // verification with the negotiated hash.
    let signature =
        generate_certificate_verify(&config, &transcript(), &*key, HashAlgorithm::SHA384).unwrap();
    let result = verify_certificate_verify(
        &config,
        &transcript(),
        HashAlgorithm::SHA384,
        &signature,
        &[&der],
    );
    assert!(matches!(result, Err(Error::SignatureMismatch)));

    let result = verify_certificate_verify(
        &config,
        &transcript(),
        HashAlgorithm::SHA256,
        &signature,
        &[&der],
    );
    assert!(result.is_ok());
}

#[test]
fn certificate_verify_rsa_requires_sha256() {
    let config = Config::default();
    let cert = issue(params(KeyKind::Rsa, "client"));
    let key = signing_key(&config, &cert);

    let result = generate_certificate_verify(&config, &transcript(), &*key, HashAlgorithm::SHA384);
    assert!(matches!(result, Err(Error::SigningFailed(_))));
}

#[test]
fn certificate_verify_flipped_byte_fails() {
    let _ = env_logger::try_init();
    let config = Config::default();

    for kind in ALL_KINDS {
        let cert = issue(params(kind, "client"));
        let der = self_signed(&cert);
        let key = signing_key(&config, &cert);

        let mut signature =
            generate_certificate_verify(&config, &transcript(), &*key, HashAlgorithm::SHA256)
                .unwrap();
        let last = signature.len() - 1;
        signature[last] ^= 0x80;

        let result = verify_certificate_verify(
            &config,
            &transcript(),
            HashAlgorithm::SHA256,
            &signature,
            &[&der],
        );
        assert!(
            matches!(
                result,
                Err(Error::SignatureMismatch)
                    | Err(Error::SignatureDecodeError(_))
                    | Err(Error::InvalidSignatureEncoding)
            ),
            "{:?}: {:?}",
            kind,
            result
        );
    }
}

#[test]
fn certificate_verify_empty_chain() {
    let config = Config::default();
    let chain: Vec<Vec<u8>> = Vec::new();
    let result =
        verify_certificate_verify(&config, &transcript(), HashAlgorithm::SHA256, &[0; 64], &chain);
    assert!(matches!(result, Err(Error::EmptyChain)));
}

#[test]
fn certificate_verify_garbage_leaf() {
    let config = Config::default();
    let chain = vec![vec![0x30, 0x82, 0x01]];
    let result =
        verify_certificate_verify(&config, &transcript(), HashAlgorithm::SHA256, &[0; 64], &chain);
    assert!(matches!(result, Err(Error::CertificateParseError(_))));
}
