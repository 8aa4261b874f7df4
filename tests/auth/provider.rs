//! Custom providers plugged in through `Config`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use dtls_auth::crypto::{
    rust_crypto, CryptoProvider, HashContext, HashProvider, SignatureVerifier,
};
use dtls_auth::types::{HashAlgorithm, NamedCurve};
use dtls_auth::{
    generate_certificate_verify, generate_key_signature, value_key_message,
    verify_certificate_verify, verify_key_signature, Config, Error,
};
use spki::SubjectPublicKeyInfoOwned;

use crate::common::*;

#[derive(Debug)]
struct CountingHashes {
    created: AtomicUsize,
}

impl HashProvider for CountingHashes {
    fn create_hash(&self, algorithm: HashAlgorithm) -> Option<Box<dyn HashContext>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        rust_crypto::default_provider()
            .hash_provider
            .create_hash(algorithm)
    }
}

/// Records the prehash of every verification before delegating.
#[derive(Debug)]
struct RecordingVerifier {
    seen: Mutex<Vec<(Option<HashAlgorithm>, usize)>>,
}

impl SignatureVerifier for RecordingVerifier {
    fn verify_signature(
        &self,
        spki: &SubjectPublicKeyInfoOwned,
        data: &[u8],
        signature: &[u8],
        prehash: Option<HashAlgorithm>,
    ) -> Result<(), String> {
        self.seen.lock().unwrap().push((prehash, data.len()));
        rust_crypto::default_provider()
            .signature_verification
            .verify_signature(spki, data, signature, prehash)
    }
}

#[derive(Debug)]
struct NoHashes;

impl HashProvider for NoHashes {
    fn create_hash(&self, _algorithm: HashAlgorithm) -> Option<Box<dyn HashContext>> {
        None
    }
}

static COUNTING_HASHES: CountingHashes = CountingHashes {
    created: AtomicUsize::new(0),
};

static RECORDING_VERIFIER: RecordingVerifier = RecordingVerifier {
    seen: Mutex::new(Vec::new()),
};

static NO_HASHES: NoHashes = NoHashes;

#[test]
fn custom_provider_is_used() {
    let _ = env_logger::try_init();

    let provider = CryptoProvider {
        hash_provider: &COUNTING_HASHES,
        signature_verification: &RECORDING_VERIFIER,
        ..rust_crypto::default_provider()
    };
    let config = Config::builder()
        .with_crypto_provider(provider)
        .build()
        .unwrap();

    RECORDING_VERIFIER.seen.lock().unwrap().clear();
    let hashes_before = COUNTING_HASHES.created.load(Ordering::SeqCst);

    // ECDSA goes through the provider's hash and is verified as a SHA-384 digest
    let cert = issue(params(KeyKind::P384, "server"));
    let der = self_signed(&cert);
    let key = signing_key(&config, &cert);
    let pk = [0x04; 65];

    let signature = generate_key_signature(
        &config,
        &[1; 32],
        &[2; 32],
        &pk,
        NamedCurve::Secp384r1,
        &*key,
        HashAlgorithm::SHA384,
    )
    .unwrap();
    let message = value_key_message(&[1; 32], &[2; 32], &pk, NamedCurve::Secp384r1);
    verify_key_signature(&config, &message, &signature, HashAlgorithm::SHA384, &[&der]).unwrap();

    assert!(COUNTING_HASHES.created.load(Ordering::SeqCst) >= hashes_before + 2);

    // Ed25519 is verified over the raw transcript
    let cert = issue(params(KeyKind::Ed25519, "client"));
    let der = self_signed(&cert);
    let key = signing_key(&config, &cert);
    let transcript = vec![0xab; 300];

    let signature =
        generate_certificate_verify(&config, &transcript, &*key, HashAlgorithm::SHA256).unwrap();
    verify_certificate_verify(&config, &transcript, HashAlgorithm::SHA256, &signature, &[&der])
        .unwrap();

    let seen = RECORDING_VERIFIER.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(Some(HashAlgorithm::SHA384), 48), (None, transcript.len())]
    );
}

#[test]
fn provider_without_sha256_rejected() {
    let provider = CryptoProvider {
        hash_provider: &NO_HASHES,
        ..rust_crypto::default_provider()
    };

    let result = Config::builder().with_crypto_provider(provider).build();
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn provider_loads_pem_keys() {
    let config = Config::default();
    let cert = issue(params(KeyKind::P256, "server"));

    let key = config
        .crypto_provider()
        .load_private_key(cert.serialize_private_key_pem().as_bytes())
        .unwrap();
    assert_eq!(key.algorithm(), dtls_auth::types::SignatureAlgorithm::ECDSA);

    let rsa = config.crypto_provider().load_private_key(RSA_KEY).unwrap();
    assert_eq!(rsa.algorithm(), dtls_auth::types::SignatureAlgorithm::RSA);

    assert!(matches!(
        config.crypto_provider().load_private_key(b"not a key"),
        Err(Error::UnsupportedKeyType(_))
    ));
}

#[test]
fn provider_loads_pkcs8_v2_ed25519_keys() {
    let _ = env_logger::try_init();
    let config = Config::default();
    let cert = issue(params(KeyKind::Ed25519, "client"));
    let der = self_signed(&cert);

    // ring writes OneAsymmetricKey v2 with the public key attached
    let key_der = cert.serialize_private_key_der();
    assert_eq!(&key_der[..5], &[0x30, 0x53, 0x02, 0x01, 0x01]);

    let key = config.crypto_provider().load_private_key(&key_der).unwrap();
    assert_eq!(key.algorithm(), dtls_auth::types::SignatureAlgorithm::ED25519);

    let signature =
        generate_certificate_verify(&config, b"transcript", &*key, HashAlgorithm::SHA256).unwrap();
    verify_certificate_verify(
        &config,
        b"transcript",
        HashAlgorithm::SHA256,
        &signature,
        &[&der],
    )
    .unwrap();
}

#[test]
fn default_digest() {
    let digest = HashAlgorithm::SHA1.digest(b"abc").unwrap();
    assert_eq!(
        digest,
        [
            0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, 0x25, 0x71, 0x78, 0x50,
            0xc2, 0x6c, 0x9c, 0xd0, 0xd8, 0x9d
        ]
    );
    assert!(matches!(
        HashAlgorithm::None.digest(b"abc"),
        Err(Error::UnsupportedHashAlgorithm(HashAlgorithm::None))
    ));
}
