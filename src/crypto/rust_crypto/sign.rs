//! Signing and key loading implementations using RustCrypto.

use std::str;

use der::asn1::OctetStringRef;
use der::{Decode, Reader, SliceReader};
use pkcs8::DecodePrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use signature::hazmat::{PrehashSigner, PrehashVerifier};
use signature::{Signer, Verifier};
use spki::{AlgorithmIdentifierRef, ObjectIdentifier, SubjectPublicKeyInfoOwned};
use zeroize::Zeroizing;

use crate::crypto::provider::{KeyProvider, SignatureVerifier, SigningKey};
use crate::crypto::signing::{
    OID_EC_PUBLIC_KEY, OID_ED25519, OID_P256, OID_P384, OID_RSA_ENCRYPTION,
};
use crate::types::{HashAlgorithm, SignatureAlgorithm};

/// Private key variants supported by the RustCrypto backend.
enum RustCryptoSigningKey {
    Ed25519(ed25519_dalek::SigningKey),
    EcdsaP256(p256::ecdsa::SigningKey),
    EcdsaP384(p384::ecdsa::SigningKey),
    Rsa(RsaPrivateKey),
}

impl std::fmt::Debug for RustCryptoSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RustCryptoSigningKey::Ed25519(_) => f.debug_tuple("SigningKey::Ed25519").finish(),
            RustCryptoSigningKey::EcdsaP256(_) => f.debug_tuple("SigningKey::EcdsaP256").finish(),
            RustCryptoSigningKey::EcdsaP384(_) => f.debug_tuple("SigningKey::EcdsaP384").finish(),
            RustCryptoSigningKey::Rsa(_) => f.debug_tuple("SigningKey::Rsa").finish(),
        }
    }
}

/// PKCS#1 v1.5 padding carrying the `DigestInfo` prefix for `hash`.
fn pkcs1v15_padding(hash: HashAlgorithm) -> Result<Pkcs1v15Sign, String> {
    Ok(match hash {
        HashAlgorithm::SHA1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::SHA224 => Pkcs1v15Sign::new::<Sha224>(),
        HashAlgorithm::SHA256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::SHA384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::SHA512 => Pkcs1v15Sign::new::<Sha512>(),
        _ => return Err(format!("Unsupported hash algorithm for RSA: {:?}", hash)),
    })
}

impl SigningKey for RustCryptoSigningKey {
    fn sign(&self, data: &[u8], prehash: Option<HashAlgorithm>) -> Result<Vec<u8>, String> {
        match (self, prehash) {
            (RustCryptoSigningKey::Ed25519(key), None) => Ok(key.sign(data).to_bytes().to_vec()),
            (RustCryptoSigningKey::EcdsaP256(key), Some(_)) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(data)
                    .map_err(|e| format!("ECDSA P-256 signing failed: {e}"))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            (RustCryptoSigningKey::EcdsaP384(key), Some(_)) => {
                let signature: p384::ecdsa::Signature = key
                    .sign_prehash(data)
                    .map_err(|e| format!("ECDSA P-384 signing failed: {e}"))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            (RustCryptoSigningKey::Rsa(key), Some(hash)) => {
                let mut rng = rand::thread_rng();
                key.sign_with_rng(&mut rng, pkcs1v15_padding(hash)?, data)
                    .map_err(|e| format!("RSA signing failed: {e}"))
            }
            (RustCryptoSigningKey::Ed25519(_), Some(hash)) => Err(format!(
                "Ed25519 signs the message itself, not a {:?} digest",
                hash
            )),
            (_, None) => Err("ECDSA and RSA keys only sign digests".to_string()),
        }
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            RustCryptoSigningKey::Ed25519(_) => SignatureAlgorithm::ED25519,
            RustCryptoSigningKey::EcdsaP256(_) | RustCryptoSigningKey::EcdsaP384(_) => {
                SignatureAlgorithm::ECDSA
            }
            RustCryptoSigningKey::Rsa(_) => SignatureAlgorithm::RSA,
        }
    }
}

/// Extract the seed of a PKCS#8 Ed25519 key.
///
/// Accepts both v1 and v2 (RFC 5958) documents. Anything after the private
/// key, such as the attached public key, is skipped unread.
fn ed25519_seed(key_der: &[u8]) -> der::Result<Option<[u8; 32]>> {
    let mut reader = SliceReader::new(key_der)?;
    let (version, oid, private_key) = reader.sequence(|r| {
        let version: u8 = r.decode()?;
        let algorithm: AlgorithmIdentifierRef<'_> = r.decode()?;
        let private_key: OctetStringRef<'_> = r.decode()?;
        let rest = r.remaining_len();
        r.read_slice(rest)?;
        Ok((version, algorithm.oid, private_key.as_bytes()))
    })?;
    reader.finish(())?;

    if oid != OID_ED25519 || version > 1 {
        return Ok(None);
    }

    // CurvePrivateKey ::= OCTET STRING
    let seed = OctetStringRef::from_der(private_key)?;
    Ok(seed.as_bytes().try_into().ok())
}

/// Key provider implementation.
#[derive(Debug)]
pub(super) struct RustCryptoKeyProvider;

impl KeyProvider for RustCryptoKeyProvider {
    fn load_private_key(&self, key_der: &[u8]) -> Result<Box<dyn SigningKey>, String> {
        // PKCS#8 DER first (most common)
        if let Ok(Some(seed)) = ed25519_seed(key_der) {
            let seed = Zeroizing::new(seed);
            let key = ed25519_dalek::SigningKey::from_bytes(&seed);
            return Ok(Box::new(RustCryptoSigningKey::Ed25519(key)));
        }
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_der(key_der) {
            return Ok(Box::new(RustCryptoSigningKey::EcdsaP256(key)));
        }
        if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_der(key_der) {
            return Ok(Box::new(RustCryptoSigningKey::EcdsaP384(key)));
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs8_der(key_der) {
            return Ok(Box::new(RustCryptoSigningKey::Rsa(key)));
        }

        // SEC1 DER (OpenSSL EC private key format)
        if let Ok(key) = p256::SecretKey::from_sec1_der(key_der) {
            return Ok(Box::new(RustCryptoSigningKey::EcdsaP256(key.into())));
        }
        if let Ok(key) = p384::SecretKey::from_sec1_der(key_der) {
            return Ok(Box::new(RustCryptoSigningKey::EcdsaP384(key.into())));
        }

        // PKCS#1 DER (OpenSSL RSA private key format)
        if let Ok(key) = RsaPrivateKey::from_pkcs1_der(key_der) {
            return Ok(Box::new(RustCryptoSigningKey::Rsa(key)));
        }

        // PEM wrapping any of the above
        if let Ok(pem_str) = str::from_utf8(key_der) {
            if pem_str.contains("-----BEGIN") {
                if let Ok((_label, der)) = der::pem::decode_vec(pem_str.as_bytes()) {
                    let der = Zeroizing::new(der);
                    return self.load_private_key(&der);
                }
            }
        }

        Err("Failed to parse private key in any supported format".to_string())
    }
}

/// Signature verifier implementation.
#[derive(Debug)]
pub(super) struct RustCryptoSignatureVerifier;

impl SignatureVerifier for RustCryptoSignatureVerifier {
    fn verify_signature(
        &self,
        spki: &SubjectPublicKeyInfoOwned,
        data: &[u8],
        signature: &[u8],
        prehash: Option<HashAlgorithm>,
    ) -> Result<(), String> {
        let pubkey_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| "Invalid subject_public_key bitstring".to_string())?;

        match (spki.algorithm.oid, prehash) {
            (OID_ED25519, None) => {
                let key_bytes: &[u8; 32] = pubkey_bytes
                    .try_into()
                    .map_err(|_| "Invalid Ed25519 public key length".to_string())?;
                let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(key_bytes)
                    .map_err(|_| "Invalid Ed25519 public key".to_string())?;
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| "Invalid Ed25519 signature length".to_string())?;
                verifying_key
                    .verify(data, &sig)
                    .map_err(|_| "Ed25519 signature verification failed".to_string())
            }
            (OID_EC_PUBLIC_KEY, Some(hash)) => {
                let curve_oid: ObjectIdentifier = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .ok_or("Missing EC curve parameter in certificate")?
                    .decode_as()
                    .map_err(|_| "Invalid EC curve parameter in certificate".to_string())?;

                match curve_oid {
                    OID_P256 => {
                        let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(pubkey_bytes)
                            .map_err(|_| "Invalid P-256 public key".to_string())?;
                        let sig = p256::ecdsa::Signature::from_der(signature)
                            .map_err(|_| "Invalid signature format".to_string())?;
                        verifying_key.verify_prehash(data, &sig).map_err(|_| {
                            format!("ECDSA signature verification failed for {:?}", hash)
                        })
                    }
                    OID_P384 => {
                        let verifying_key = p384::ecdsa::VerifyingKey::from_sec1_bytes(pubkey_bytes)
                            .map_err(|_| "Invalid P-384 public key".to_string())?;
                        let sig = p384::ecdsa::Signature::from_der(signature)
                            .map_err(|_| "Invalid signature format".to_string())?;
                        verifying_key.verify_prehash(data, &sig).map_err(|_| {
                            format!("ECDSA signature verification failed for {:?}", hash)
                        })
                    }
                    _ => Err(format!("Unsupported EC curve: {}", curve_oid)),
                }
            }
            (OID_RSA_ENCRYPTION, Some(hash)) => {
                let public_key = RsaPublicKey::from_pkcs1_der(pubkey_bytes)
                    .map_err(|e| format!("Invalid RSA public key: {e}"))?;
                public_key
                    .verify(pkcs1v15_padding(hash)?, data, signature)
                    .map_err(|_| format!("RSA signature verification failed for {:?}", hash))
            }
            (oid, prehash) => Err(format!(
                "Unsupported public key algorithm {} with prehash {:?}",
                oid, prehash
            )),
        }
    }
}

/// Static instance of the key provider.
pub(super) static KEY_PROVIDER: RustCryptoKeyProvider = RustCryptoKeyProvider;

/// Static instance of the signature verifier.
pub(super) static SIGNATURE_VERIFIER: RustCryptoSignatureVerifier = RustCryptoSignatureVerifier;
