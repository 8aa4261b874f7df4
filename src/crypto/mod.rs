//! Pluggable cryptography used by the authentication primitives.

mod provider;
pub mod rust_crypto;
pub(crate) mod signing;
mod validation;

// Re-export all provider traits so backends can be written against
// `dtls_auth::crypto::{CryptoProvider, HashProvider, ...}`.
pub use provider::{CryptoProvider, CryptoSafe, HashContext, HashProvider};
pub use provider::{KeyProvider, SignatureVerifier, SigningKey};

pub use signing::EcdsaSignatureValue;

// Re-export shared types for provider trait implementations
pub use crate::types::{HashAlgorithm, SignatureAlgorithm};
