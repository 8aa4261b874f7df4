//! Hash implementations using RustCrypto.

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::crypto::provider::{HashContext, HashProvider};
use crate::types::HashAlgorithm;

/// Hash context implementation using RustCrypto.
#[derive(Debug, Clone)]
enum RustCryptoHashContext {
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

fn finalize_into<D: Digest + Clone>(ctx: &D, out: &mut Vec<u8>) {
    let digest = ctx.clone().finalize();
    out.clear();
    out.extend_from_slice(&digest);
}

impl HashContext for RustCryptoHashContext {
    fn update(&mut self, data: &[u8]) {
        match self {
            RustCryptoHashContext::Sha1(ctx) => ctx.update(data),
            RustCryptoHashContext::Sha224(ctx) => ctx.update(data),
            RustCryptoHashContext::Sha256(ctx) => ctx.update(data),
            RustCryptoHashContext::Sha384(ctx) => ctx.update(data),
            RustCryptoHashContext::Sha512(ctx) => ctx.update(data),
        }
    }

    fn clone_and_finalize(&self, out: &mut Vec<u8>) {
        match self {
            RustCryptoHashContext::Sha1(ctx) => finalize_into(ctx, out),
            RustCryptoHashContext::Sha224(ctx) => finalize_into(ctx, out),
            RustCryptoHashContext::Sha256(ctx) => finalize_into(ctx, out),
            RustCryptoHashContext::Sha384(ctx) => finalize_into(ctx, out),
            RustCryptoHashContext::Sha512(ctx) => finalize_into(ctx, out),
        }
    }
}

/// Hash provider implementation.
#[derive(Debug)]
pub(super) struct RustCryptoHashProvider;

impl HashProvider for RustCryptoHashProvider {
    fn create_hash(&self, algorithm: HashAlgorithm) -> Option<Box<dyn HashContext>> {
        let ctx = match algorithm {
            HashAlgorithm::SHA1 => RustCryptoHashContext::Sha1(Sha1::new()),
            HashAlgorithm::SHA224 => RustCryptoHashContext::Sha224(Sha224::new()),
            HashAlgorithm::SHA256 => RustCryptoHashContext::Sha256(Sha256::new()),
            HashAlgorithm::SHA384 => RustCryptoHashContext::Sha384(Sha384::new()),
            HashAlgorithm::SHA512 => RustCryptoHashContext::Sha512(Sha512::new()),
            _ => return None,
        };
        Some(Box::new(ctx))
    }
}

/// Static instance of the hash provider.
pub(super) static HASH_PROVIDER: RustCryptoHashProvider = RustCryptoHashProvider;
