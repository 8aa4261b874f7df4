use crate::crypto::{rust_crypto, CryptoProvider};
use crate::Error;

/// Authentication configuration.
///
/// Holds the crypto provider every signing and verification call goes
/// through, plus the limits applied while building certification paths.
#[derive(Debug, Clone)]
pub struct Config {
    crypto_provider: CryptoProvider,
    max_chain_depth: usize,
    max_signature_checks: usize,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            crypto_provider: None,
            max_chain_depth: 10,
            max_signature_checks: 100,
        }
    }

    /// Cryptographic provider.
    ///
    /// Provides hashing, private key loading, and signature verification.
    #[inline(always)]
    pub fn crypto_provider(&self) -> &CryptoProvider {
        &self.crypto_provider
    }

    /// Max number of certificates in a certification path, leaf and root included.
    #[inline(always)]
    pub fn max_chain_depth(&self) -> usize {
        self.max_chain_depth
    }

    /// Max number of issuer signatures checked while building paths for one chain.
    #[inline(always)]
    pub fn max_signature_checks(&self) -> usize {
        self.max_signature_checks
    }
}

/// Builder for authentication configuration.
pub struct ConfigBuilder {
    crypto_provider: Option<CryptoProvider>,
    max_chain_depth: usize,
    max_signature_checks: usize,
}

impl ConfigBuilder {
    /// Set a custom crypto provider.
    ///
    /// If not set, the provider installed via
    /// [`CryptoProvider::install_default()`] is used, falling back to the
    /// RustCrypto backend.
    pub fn with_crypto_provider(mut self, provider: CryptoProvider) -> Self {
        self.crypto_provider = Some(provider);
        self
    }

    /// Set the max number of certificates in a certification path.
    ///
    /// Counts the leaf and the trust root. Defaults to 10.
    pub fn max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Set the max number of issuer signature checks per chain validation.
    ///
    /// Bounds the work a peer can cause with a chain of look-alike
    /// intermediates. Defaults to 100.
    pub fn max_signature_checks(mut self, checks: usize) -> Self {
        self.max_signature_checks = checks;
        self
    }

    /// Build the configuration.
    ///
    /// This validates the crypto provider before returning the configuration.
    /// Returns `Error::ConfigError` if the provider is invalid or a limit is zero.
    ///
    /// The crypto provider is selected in the following priority order:
    /// 1. Explicit provider set via `with_crypto_provider()`
    /// 2. Default provider installed via `CryptoProvider::install_default()`
    /// 3. The RustCrypto provider
    pub fn build(self) -> Result<Config, Error> {
        let crypto_provider = self
            .crypto_provider
            .or_else(|| CryptoProvider::get_default().cloned())
            .unwrap_or_else(rust_crypto::default_provider);

        // Always validate the crypto provider
        crypto_provider.validate()?;

        if self.max_chain_depth == 0 {
            return Err(Error::ConfigError(
                "max_chain_depth must be at least 1".to_string(),
            ));
        }
        if self.max_signature_checks == 0 {
            return Err(Error::ConfigError(
                "max_signature_checks must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            crypto_provider,
            max_chain_depth: self.max_chain_depth,
            max_signature_checks: self.max_signature_checks,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builder()
            .build()
            .expect("Default config should always validate")
    }
}
