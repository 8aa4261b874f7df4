//! CertificateVerify signatures (RFC 5246 section 7.4.8).
//!
//! The client signs the handshake messages exchanged so far to prove it
//! holds the key of the certificate it sent.
//!
//! Generation always digests the transcript with SHA-256 and labels the
//! signature with the negotiated hash. Verification digests with the
//! negotiated hash. Both agree when SHA-256 is negotiated.

use crate::config::Config;
use crate::crypto::signing::{sign_message, verify_with_leaf};
use crate::crypto::SigningKey;
use crate::types::HashAlgorithm;
use crate::Error;

/// Sign the concatenated handshake messages with `private_key`.
///
/// Ed25519 keys sign `handshake_bodies` directly.
pub fn generate_certificate_verify(
    config: &Config,
    handshake_bodies: &[u8],
    private_key: &dyn SigningKey,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    trace!(
        "Signing CertificateVerify over {} bytes with {:?} key, hash {:?}",
        handshake_bodies.len(),
        private_key.algorithm(),
        hash
    );
    sign_message(
        config.crypto_provider(),
        private_key,
        handshake_bodies,
        HashAlgorithm::SHA256,
        hash,
    )
}

/// Verify a CertificateVerify signature against the leaf of
/// `raw_certificates`.
pub fn verify_certificate_verify<C: AsRef<[u8]>>(
    config: &Config,
    handshake_bodies: &[u8],
    hash: HashAlgorithm,
    signature: &[u8],
    raw_certificates: &[C],
) -> Result<(), Error> {
    verify_with_leaf(
        config.crypto_provider(),
        raw_certificates,
        handshake_bodies,
        signature,
        hash,
    )
}
