//! Key-family dispatch shared by the ServerKeyExchange and CertificateVerify
//! signatures.
//!
//! Ed25519 keys sign and verify the raw message. ECDSA and RSA keys work on
//! a digest that is computed here, through the configured provider, before the
//! key is involved.

use der::asn1::IntRef;
use der::{Decode, Sequence};
use num_bigint::{BigInt, Sign};
use spki::{ObjectIdentifier, SubjectPublicKeyInfoOwned};
use x509_cert::Certificate;

use crate::crypto::provider::{CryptoProvider, SigningKey};
use crate::types::{HashAlgorithm, SignatureAlgorithm};
use crate::Error;

pub(crate) const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
pub(crate) const OID_EC_PUBLIC_KEY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
pub(crate) const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

pub(crate) const OID_P256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
pub(crate) const OID_P384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

pub(crate) const OID_SHA1_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
pub(crate) const OID_SHA256_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
pub(crate) const OID_SHA384_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
pub(crate) const OID_SHA512_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
pub(crate) const OID_ECDSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
pub(crate) const OID_ECDSA_WITH_SHA384: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
pub(crate) const OID_ECDSA_WITH_SHA512: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// Key family of a subject public key.
pub(crate) fn key_algorithm(spki: &SubjectPublicKeyInfoOwned) -> SignatureAlgorithm {
    match spki.algorithm.oid {
        OID_ED25519 => SignatureAlgorithm::ED25519,
        OID_EC_PUBLIC_KEY => SignatureAlgorithm::ECDSA,
        OID_RSA_ENCRYPTION => SignatureAlgorithm::RSA,
        _ => SignatureAlgorithm::Unknown(0),
    }
}

/// Named curve of an EC subject public key.
fn ec_curve(spki: &SubjectPublicKeyInfoOwned) -> Option<ObjectIdentifier> {
    spki.algorithm
        .parameters
        .as_ref()?
        .decode_as::<ObjectIdentifier>()
        .ok()
}

/// True for the certificate signature algorithms under which an RSA leaf key
/// is accepted for handshake signatures.
fn is_pkcs1v15_certificate(cert: &Certificate) -> bool {
    matches!(
        cert.signature_algorithm.oid,
        OID_SHA1_WITH_RSA | OID_SHA256_WITH_RSA | OID_SHA384_WITH_RSA | OID_SHA512_WITH_RSA
    )
}

/// The `Ecdsa-Sig-Value` structure from RFC 3279.
///
/// ```text
/// Ecdsa-Sig-Value  ::=  SEQUENCE  {
///      r     INTEGER,
///      s     INTEGER  }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignatureValue {
    pub r: BigInt,
    pub s: BigInt,
}

#[derive(Sequence)]
struct EcdsaSigValueRef<'a> {
    r: IntRef<'a>,
    s: IntRef<'a>,
}

impl EcdsaSignatureValue {
    /// Decode a DER `Ecdsa-Sig-Value`.
    ///
    /// Fails with [`Error::SignatureDecodeError`] on malformed DER and with
    /// [`Error::InvalidSignatureEncoding`] when R or S is not strictly positive.
    pub fn from_der(signature: &[u8]) -> Result<Self, Error> {
        let value = EcdsaSigValueRef::from_der(signature).map_err(Error::SignatureDecodeError)?;

        let r = BigInt::from_signed_bytes_be(value.r.as_bytes());
        let s = BigInt::from_signed_bytes_be(value.s.as_bytes());

        if r.sign() != Sign::Plus || s.sign() != Sign::Plus {
            return Err(Error::InvalidSignatureEncoding);
        }

        Ok(EcdsaSignatureValue { r, s })
    }
}

/// Sign `message` with `key`.
///
/// ECDSA and RSA keys sign `digest_with(message)`, announced to the key as
/// produced by `signature_hash`. Ed25519 keys sign `message` directly.
pub(crate) fn sign_message(
    provider: &CryptoProvider,
    key: &dyn SigningKey,
    message: &[u8],
    digest_with: HashAlgorithm,
    signature_hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    let signature = match key.algorithm() {
        SignatureAlgorithm::ED25519 => key.sign(message, None),
        SignatureAlgorithm::ECDSA | SignatureAlgorithm::RSA => {
            if !signature_hash.is_supported() {
                return Err(Error::UnsupportedHashAlgorithm(signature_hash));
            }
            let hashed = provider.digest(digest_with, message)?;
            key.sign(&hashed, Some(signature_hash))
        }
        other => {
            return Err(Error::UnsupportedKeyType(format!(
                "Cannot sign with {:?} key",
                other
            )))
        }
    };

    signature.map_err(Error::SigningFailed)
}

/// Verify `signature` over `message` with the public key of the first
/// certificate in `raw_certificates`.
pub(crate) fn verify_with_leaf<C: AsRef<[u8]>>(
    provider: &CryptoProvider,
    raw_certificates: &[C],
    message: &[u8],
    signature: &[u8],
    hash: HashAlgorithm,
) -> Result<(), Error> {
    let leaf_der = raw_certificates.first().ok_or(Error::EmptyChain)?;
    let leaf = Certificate::from_der(leaf_der.as_ref()).map_err(Error::CertificateParseError)?;
    let spki = &leaf.tbs_certificate.subject_public_key_info;
    let verifier = provider.signature_verification;

    let result = match key_algorithm(spki) {
        SignatureAlgorithm::ED25519 => verifier.verify_signature(spki, message, signature, None),
        SignatureAlgorithm::ECDSA => {
            match ec_curve(spki) {
                Some(OID_P256) | Some(OID_P384) => {}
                Some(curve) => {
                    return Err(Error::UnsupportedKeyType(format!(
                        "ECDSA public key on curve {}",
                        curve
                    )))
                }
                None => {
                    return Err(Error::UnsupportedKeyType(
                        "ECDSA public key without a named curve".to_string(),
                    ))
                }
            }
            EcdsaSignatureValue::from_der(signature)?;
            let hashed = provider.digest(hash, message)?;
            verifier.verify_signature(spki, &hashed, signature, Some(hash))
        }
        SignatureAlgorithm::RSA if is_pkcs1v15_certificate(&leaf) => {
            let hashed = provider.digest(hash, message)?;
            verifier.verify_signature(spki, &hashed, signature, Some(hash))
        }
        _ => {
            return Err(Error::UnsupportedKeyType(format!(
                "Public key {} with certificate signature {}",
                spki.algorithm.oid, leaf.signature_algorithm.oid
            )))
        }
    };

    result.map_err(|e| {
        debug!("Signature verification failed: {}", e);
        Error::SignatureMismatch
    })
}
