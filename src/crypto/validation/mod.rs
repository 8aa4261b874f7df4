//! Validation for crypto providers.
//!
//! A provider is checked against known answers before a [`Config`](crate::Config)
//! accepts it.

use der::Decode;
use spki::SubjectPublicKeyInfoOwned;

use crate::crypto::provider::CryptoProvider;
use crate::types::{HashAlgorithm, SignatureAlgorithm};
use crate::Error;

impl CryptoProvider {
    /// Validates the provider configuration.
    ///
    /// This ensures the provider meets the crate's requirements:
    /// - SHA-256 is available (CertificateVerify always digests with it)
    /// - Every hash the provider offers produces the correct digest
    /// - The key provider and signature verifier agree on a known Ed25519 signature
    ///
    /// Returns `Error::ConfigError` if validation fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_hash_provider()?;
        self.validate_signature_verifier()?;
        self.validate_key_provider()?;
        Ok(())
    }

    fn validate_hash_provider(&self) -> Result<(), Error> {
        if self.hash_provider.create_hash(HashAlgorithm::SHA256).is_none() {
            return Err(Error::ConfigError(
                "CryptoProvider does not support SHA-256".to_string(),
            ));
        }

        for (hash_alg, expected) in HASH_TEST_VECTORS {
            let Some(mut hasher) = self.hash_provider.create_hash(*hash_alg) else {
                trace!("Hash provider does not offer {:?}", hash_alg);
                continue;
            };

            // Test with empty input - use known hash values
            hasher.update(&[]);
            let mut result = Vec::new();
            hasher.clone_and_finalize(&mut result);

            if result.as_slice() != *expected {
                return Err(Error::ConfigError(format!(
                    "Hash provider {:?} produced incorrect result",
                    hash_alg
                )));
            }
        }

        Ok(())
    }

    fn validate_signature_verifier(&self) -> Result<(), Error> {
        let spki = SubjectPublicKeyInfoOwned::from_der(VALIDATION_ED25519_SPKI)
            .map_err(|e| Error::ConfigError(format!("Invalid validation key: {}", e)))?;

        self.signature_verification
            .verify_signature(&spki, VALIDATION_TEST_DATA, VALIDATION_ED25519_SIG, None)
            .map_err(|e| {
                Error::ConfigError(format!("Signature verification failed for Ed25519: {}", e))
            })?;

        let mut tampered = VALIDATION_ED25519_SIG.to_vec();
        tampered[0] ^= 0x01;
        if self
            .signature_verification
            .verify_signature(&spki, VALIDATION_TEST_DATA, &tampered, None)
            .is_ok()
        {
            return Err(Error::ConfigError(
                "Signature verifier accepted a tampered signature".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_key_provider(&self) -> Result<(), Error> {
        let key = self
            .key_provider
            .load_private_key(VALIDATION_ED25519_KEY)
            .map_err(|e| Error::ConfigError(format!("Key provider failed: {}", e)))?;

        if key.algorithm() != SignatureAlgorithm::ED25519 {
            return Err(Error::ConfigError(format!(
                "Key provider loaded Ed25519 key as {:?}",
                key.algorithm()
            )));
        }

        let signature = key
            .sign(VALIDATION_TEST_DATA, None)
            .map_err(|e| Error::ConfigError(format!("Signing failed for Ed25519: {}", e)))?;

        // Ed25519 is deterministic
        if signature.as_slice() != VALIDATION_ED25519_SIG {
            return Err(Error::ConfigError(
                "Key provider produced incorrect Ed25519 signature".to_string(),
            ));
        }

        Ok(())
    }
}

// Digests of the empty string.
const HASH_TEST_VECTORS: &[(HashAlgorithm, &[u8])] = &[
    (
        HashAlgorithm::SHA1,
        &[
            0xda, 0x39, 0xa3, 0xee, 0x5e, 0x6b, 0x4b, 0x0d, 0x32, 0x55, 0xbf, 0xef, 0x95, 0x60,
            0x18, 0x90, 0xaf, 0xd8, 0x07, 0x09,
        ],
    ),
    (
        HashAlgorithm::SHA224,
        &[
            0xd1, 0x4a, 0x02, 0x8c, 0x2a, 0x3a, 0x2b, 0xc9, 0x47, 0x61, 0x02, 0xbb, 0x28, 0x82,
            0x34, 0xc4, 0x15, 0xa2, 0xb0, 0x1f, 0x82, 0x8e, 0xa6, 0x2a, 0xc5, 0xb3, 0xe4, 0x2f,
        ],
    ),
    (
        HashAlgorithm::SHA256,
        &[
            0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
            0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
            0x78, 0x52, 0xb8, 0x55,
        ],
    ),
    (
        HashAlgorithm::SHA384,
        &[
            0x38, 0xb0, 0x60, 0xa7, 0x51, 0xac, 0x96, 0x38, 0x4c, 0xd9, 0x32, 0x7e, 0xb1, 0xb1,
            0xe3, 0x6a, 0x21, 0xfd, 0xb7, 0x11, 0x14, 0xbe, 0x07, 0x43, 0x4c, 0x0c, 0xc7, 0xbf,
            0x63, 0xf6, 0xe1, 0xda, 0x27, 0x4e, 0xde, 0xbf, 0xe7, 0x6f, 0x65, 0xfb, 0xd5, 0x1a,
            0xd2, 0xf1, 0x48, 0x98, 0xb9, 0x5b,
        ],
    ),
    (
        HashAlgorithm::SHA512,
        &[
            0xcf, 0x83, 0xe1, 0x35, 0x7e, 0xef, 0xb8, 0xbd, 0xf1, 0x54, 0x28, 0x50, 0xd6, 0x6d,
            0x80, 0x07, 0xd6, 0x20, 0xe4, 0x05, 0x0b, 0x57, 0x15, 0xdc, 0x83, 0xf4, 0xa9, 0x21,
            0xd3, 0x6c, 0xe9, 0xce, 0x47, 0xd0, 0xd1, 0x3c, 0x5d, 0x85, 0xf2, 0xb0, 0xff, 0x83,
            0x18, 0xd2, 0x87, 0x7e, 0xec, 0x2f, 0x63, 0xb9, 0x31, 0xbd, 0x47, 0x41, 0x7a, 0x81,
            0xa5, 0x38, 0x32, 0x7a, 0xf9, 0x27, 0xda, 0x3e,
        ],
    ),
];

// Ed25519 key (PKCS#8), its SubjectPublicKeyInfo and its signature over the test data
const VALIDATION_TEST_DATA: &[u8] = include_bytes!("test_data.bin");
const VALIDATION_ED25519_KEY: &[u8] = include_bytes!("ed25519_key.der");
const VALIDATION_ED25519_SPKI: &[u8] = include_bytes!("ed25519_spki.der");
const VALIDATION_ED25519_SIG: &[u8] = include_bytes!("ed25519_sig.bin");
