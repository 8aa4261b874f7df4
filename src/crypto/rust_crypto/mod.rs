//! RustCrypto cryptographic provider implementation.
//!
//! Pure Rust backend built on crates from the
//! [RustCrypto](https://github.com/RustCrypto) organization.
//!
//! # Usage
//!
//! ```
//! use dtls_auth::Config;
//! use dtls_auth::crypto::rust_crypto;
//!
//! let config = Config::builder()
//!     .with_crypto_provider(rust_crypto::default_provider())
//!     .build()
//!     .unwrap();
//! # let _ = config;
//! ```

mod hash;
mod sign;

use crate::crypto::provider::CryptoProvider;

/// Get the default RustCrypto-based crypto provider.
///
/// # Supported Signature Algorithms
///
/// - Ed25519 (pure, no prehash)
/// - ECDSA with P-256 or P-384, over any supported digest
/// - RSA PKCS#1 v1.5, over any supported digest
///
/// # Supported Hash Algorithms
///
/// - SHA-1
/// - SHA-224
/// - SHA-256
/// - SHA-384
/// - SHA-512
///
/// # Key Formats
///
/// The key provider supports loading private keys in:
/// - PKCS#8 DER format (Ed25519, P-256, P-384, RSA)
/// - SEC1 DER format (OpenSSL EC private key format)
/// - PKCS#1 DER format (OpenSSL RSA private key format)
/// - PEM encoded versions of the above
pub fn default_provider() -> CryptoProvider {
    CryptoProvider {
        hash_provider: &hash::HASH_PROVIDER,
        key_provider: &sign::KEY_PROVIDER,
        signature_verification: &sign::SIGNATURE_VERIFIER,
    }
}
