//! ServerKeyExchange signatures (RFC 5246 section 7.4.3, RFC 8422 section 5.4).
//!
//! The server proves possession of its certificate key by signing the
//! handshake randoms together with its ephemeral ECDH parameters.
//!
//! ```text
//! client_random(32) || server_random(32) || ServerECDHParams
//!
//! struct {
//!     ECCurveType curve_type;   // named_curve (3)
//!     NamedCurve  namedcurve;   // u16
//!     opaque      point<1..2^8-1>;
//! } ServerECDHParams;
//! ```

use crate::config::Config;
use crate::crypto::signing::{sign_message, verify_with_leaf};
use crate::crypto::SigningKey;
use crate::types::{CurveType, HashAlgorithm, NamedCurve};
use crate::Error;

/// Serialize the bytes signed in a ServerKeyExchange.
///
/// `public_key` must not exceed 255 bytes, its length is carried in a single
/// octet.
pub fn value_key_message(
    client_random: &[u8; 32],
    server_random: &[u8; 32],
    public_key: &[u8],
    curve: NamedCurve,
) -> Vec<u8> {
    debug_assert!(public_key.len() <= 255, "ECDH public key exceeds 255 bytes");

    let mut message = Vec::with_capacity(32 + 32 + 4 + public_key.len());
    message.extend_from_slice(client_random);
    message.extend_from_slice(server_random);
    message.push(CurveType::NamedCurve.as_u8());
    message.extend_from_slice(&curve.as_u16().to_be_bytes());
    message.push(public_key.len() as u8);
    message.extend_from_slice(public_key);
    message
}

/// Sign the ServerKeyExchange parameters with `private_key`.
///
/// Ed25519 keys sign the serialized parameters directly. ECDSA and RSA keys
/// sign their `hash` digest.
pub fn generate_key_signature(
    config: &Config,
    client_random: &[u8; 32],
    server_random: &[u8; 32],
    public_key: &[u8],
    curve: NamedCurve,
    private_key: &dyn SigningKey,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    let message = value_key_message(client_random, server_random, public_key, curve);
    trace!(
        "Signing key exchange for {:?} with {:?} key, hash {:?}",
        curve,
        private_key.algorithm(),
        hash
    );
    sign_message(config.crypto_provider(), private_key, &message, hash, hash)
}

/// Verify a ServerKeyExchange signature against the leaf of
/// `raw_certificates`.
///
/// `message` is the output of [`value_key_message`] as rebuilt by the
/// verifying side.
pub fn verify_key_signature<C: AsRef<[u8]>>(
    config: &Config,
    message: &[u8],
    signature: &[u8],
    hash: HashAlgorithm,
    raw_certificates: &[C],
) -> Result<(), Error> {
    verify_with_leaf(
        config.crypto_provider(),
        raw_certificates,
        message,
        signature,
        hash,
    )
}
