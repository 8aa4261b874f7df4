//! Cryptographic provider traits for pluggable crypto backends.
//!
//! Every hash, sign and verify primitive this crate needs goes through a
//! [`CryptoProvider`]. The authentication logic itself (message layout,
//! key dispatch, signature encoding checks, chain building) never touches a
//! concrete crypto crate, so it can be exercised with deterministic fakes.
//!
//! # Architecture
//!
//! - **Hash Provider** ([`HashProvider`]): Factory for hash contexts
//! - **Key Provider** ([`KeyProvider`]): Parse and load private keys
//! - **Signature Verification** ([`SignatureVerifier`]): Verify signatures
//!   against a certificate's subject public key
//!
//! # Using a Custom Provider
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
//!
//! # Thread Safety
//!
//! All provider traits require `Send + Sync + UnwindSafe + RefUnwindSafe` to ensure
//! safe usage across threads and panic boundaries.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::sync::OnceLock;

use spki::SubjectPublicKeyInfoOwned;

use crate::types::{HashAlgorithm, SignatureAlgorithm};
use crate::Error;

// ============================================================================
// Marker Trait
// ============================================================================

/// Marker trait for types that are safe to use in crypto provider components.
///
/// This trait combines the common bounds required for crypto provider trait objects:
/// - [`Send`] + [`Sync`]: Thread-safe
/// - [`Debug`]: Support debugging
/// - [`UnwindSafe`] + [`RefUnwindSafe`]: Panic-safe
pub trait CryptoSafe: Send + Sync + Debug + UnwindSafe + RefUnwindSafe {}

/// Blanket implementation: any type satisfying the bounds implements [`CryptoSafe`].
impl<T: Send + Sync + Debug + UnwindSafe + RefUnwindSafe> CryptoSafe for T {}

// ============================================================================
// Instance Traits (created by factories)
// ============================================================================

/// Stateful hash context for incremental hashing.
pub trait HashContext: CryptoSafe {
    /// Update the hash with new data.
    fn update(&mut self, data: &[u8]);

    /// Clone the context and finalize it, writing the hash to `out`.
    /// The original context can continue to be updated.
    fn clone_and_finalize(&self, out: &mut Vec<u8>);
}

/// Private key able to produce handshake signatures.
///
/// This is the opaque private-key handle handed in by the key-management
/// layer. The crate only looks at [`SigningKey::algorithm`] to decide how to
/// prepare the data before calling [`SigningKey::sign`].
pub trait SigningKey: CryptoSafe {
    /// Sign `data`.
    ///
    /// With `prehash: Some(hash)`, `data` is a digest already computed with
    /// `hash` and the key must sign it as such (ECDSA prehash signing, RSA
    /// PKCS#1 v1.5 with the `DigestInfo` of `hash`). With `None` the key
    /// signs the raw message (Ed25519).
    fn sign(&self, data: &[u8], prehash: Option<HashAlgorithm>) -> Result<Vec<u8>, String>;

    /// Key family of this key.
    fn algorithm(&self) -> SignatureAlgorithm;
}

// ============================================================================
// Factory Traits (used by CryptoProvider)
// ============================================================================

/// Hash provider (factory for HashContext).
pub trait HashProvider: CryptoSafe {
    /// Create a new hash context, or `None` if the algorithm is not available.
    fn create_hash(&self, algorithm: HashAlgorithm) -> Option<Box<dyn HashContext>>;
}

/// Private key parser (factory for SigningKey).
pub trait KeyProvider: CryptoSafe {
    /// Parse and load a private key from DER/PEM bytes.
    fn load_private_key(&self, key_der: &[u8]) -> Result<Box<dyn SigningKey>, String>;
}

/// Signature verification against a subject public key.
pub trait SignatureVerifier: CryptoSafe {
    /// Verify `signature` over `data` with the key in `spki`.
    ///
    /// `prehash` has the same meaning as for [`SigningKey::sign`]. ECDSA
    /// signatures are passed in their DER `Ecdsa-Sig-Value` form, RSA
    /// signatures as raw PKCS#1 v1.5 bytes.
    fn verify_signature(
        &self,
        spki: &SubjectPublicKeyInfoOwned,
        data: &[u8],
        signature: &[u8],
        prehash: Option<HashAlgorithm>,
    ) -> Result<(), String>;
}

// ============================================================================
// Core Provider Struct
// ============================================================================

/// Cryptographic provider for handshake authentication.
///
/// The provider uses static trait object references (`&'static dyn Trait`),
/// so it is cheap to clone and share between threads.
///
/// # Example
///
/// ```
/// use dtls_auth::crypto::{CryptoProvider, rust_crypto};
///
/// let provider = rust_crypto::default_provider();
///
/// let custom_provider = CryptoProvider {
///     hash_provider: provider.hash_provider,
///     key_provider: provider.key_provider,
///     signature_verification: provider.signature_verification,
/// };
/// # let _ = custom_provider;
/// ```
#[derive(Debug, Clone)]
pub struct CryptoProvider {
    /// Hash provider for message and transcript digests.
    pub hash_provider: &'static dyn HashProvider,

    /// Key provider for parsing private keys.
    pub key_provider: &'static dyn KeyProvider,

    /// Signature verification for peer keys.
    pub signature_verification: &'static dyn SignatureVerifier,
}

/// Static storage for the default crypto provider.
///
/// This is set by `install_default()` and retrieved by `get_default()`.
static DEFAULT: OnceLock<CryptoProvider> = OnceLock::new();

impl CryptoProvider {
    /// Install a default crypto provider for the process.
    ///
    /// Used by [`Config::builder()`](crate::Config::builder) and
    /// [`HashAlgorithm::digest`] when no explicit provider is given.
    ///
    /// # Panics
    ///
    /// Panics if called more than once. The default provider can only be set once per process.
    pub fn install_default(provider: CryptoProvider) {
        DEFAULT
            .set(provider)
            .expect("CryptoProvider::install_default() called more than once");
    }

    /// Get the default crypto provider, if one has been installed.
    pub fn get_default() -> Option<&'static CryptoProvider> {
        DEFAULT.get()
    }

    /// One-shot digest of `data`.
    pub fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut hasher = self
            .hash_provider
            .create_hash(algorithm)
            .ok_or(Error::UnsupportedHashAlgorithm(algorithm))?;
        hasher.update(data);

        let mut out = Vec::with_capacity(algorithm.output_len().unwrap_or(64));
        hasher.clone_and_finalize(&mut out);
        Ok(out)
    }

    /// Load a private key using this provider's key parser.
    pub fn load_private_key(&self, key_der: &[u8]) -> Result<Box<dyn SigningKey>, Error> {
        self.key_provider
            .load_private_key(key_der)
            .map_err(Error::UnsupportedKeyType)
    }
}
