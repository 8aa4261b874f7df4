//! Value types shared by the signing, verification and record helpers.
//!
//! These mirror the wire enumerations negotiated during a DTLS 1.2 handshake
//! and are threaded unchanged through every authentication call.

use std::fmt;

use nom::number::complete::{be_u16, be_u8};
use nom::IResult;

use crate::crypto::CryptoProvider;
use crate::util::be_u48;
use crate::Error;

// ============================================================================
// Named Curves (Key Exchange)
// ============================================================================

/// Elliptic curves for ECDHE key exchange (RFC 4492, RFC 8422).
///
/// Only the wire identifier matters to this crate: it is written into the
/// signed `ServerECDHParams` and otherwise carried opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCurve {
    /// sect163k1 (deprecated).
    Sect163k1,
    /// sect163r1 (deprecated).
    Sect163r1,
    /// sect163r2 (deprecated).
    Sect163r2,
    /// sect193r1 (deprecated).
    Sect193r1,
    /// sect193r2 (deprecated).
    Sect193r2,
    /// sect233k1 (deprecated).
    Sect233k1,
    /// sect233r1 (deprecated).
    Sect233r1,
    /// sect239k1 (deprecated).
    Sect239k1,
    /// sect283k1 (deprecated).
    Sect283k1,
    /// sect283r1 (deprecated).
    Sect283r1,
    /// sect409k1 (deprecated).
    Sect409k1,
    /// sect409r1 (deprecated).
    Sect409r1,
    /// sect571k1 (deprecated).
    Sect571k1,
    /// sect571r1 (deprecated).
    Sect571r1,
    /// secp160k1 (deprecated).
    Secp160k1,
    /// secp160r1 (deprecated).
    Secp160r1,
    /// secp160r2 (deprecated).
    Secp160r2,
    /// secp192k1 (deprecated).
    Secp192k1,
    /// secp192r1 (deprecated).
    Secp192r1,
    /// secp224k1.
    Secp224k1,
    /// secp224r1.
    Secp224r1,
    /// secp256k1.
    Secp256k1,
    /// secp256r1 (NIST P-256).
    Secp256r1,
    /// secp384r1 (NIST P-384).
    Secp384r1,
    /// secp521r1 (NIST P-521).
    Secp521r1,
    /// X25519 (Curve25519 for ECDHE).
    X25519,
    /// X448 (Curve448 for ECDHE).
    X448,
    /// Unknown or unsupported curve.
    Unknown(u16),
}

impl NamedCurve {
    /// Convert a wire format u16 value to a `NamedCurve`.
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => NamedCurve::Sect163k1,
            2 => NamedCurve::Sect163r1,
            3 => NamedCurve::Sect163r2,
            4 => NamedCurve::Sect193r1,
            5 => NamedCurve::Sect193r2,
            6 => NamedCurve::Sect233k1,
            7 => NamedCurve::Sect233r1,
            8 => NamedCurve::Sect239k1,
            9 => NamedCurve::Sect283k1,
            10 => NamedCurve::Sect283r1,
            11 => NamedCurve::Sect409k1,
            12 => NamedCurve::Sect409r1,
            13 => NamedCurve::Sect571k1,
            14 => NamedCurve::Sect571r1,
            15 => NamedCurve::Secp160k1,
            16 => NamedCurve::Secp160r1,
            17 => NamedCurve::Secp160r2,
            18 => NamedCurve::Secp192k1,
            19 => NamedCurve::Secp192r1,
            20 => NamedCurve::Secp224k1,
            21 => NamedCurve::Secp224r1,
            22 => NamedCurve::Secp256k1,
            23 => NamedCurve::Secp256r1,
            24 => NamedCurve::Secp384r1,
            25 => NamedCurve::Secp521r1,
            29 => NamedCurve::X25519,
            30 => NamedCurve::X448,
            _ => NamedCurve::Unknown(value),
        }
    }

    /// Convert this `NamedCurve` to its wire format u16 value.
    pub fn as_u16(&self) -> u16 {
        match self {
            NamedCurve::Sect163k1 => 1,
            NamedCurve::Sect163r1 => 2,
            NamedCurve::Sect163r2 => 3,
            NamedCurve::Sect193r1 => 4,
            NamedCurve::Sect193r2 => 5,
            NamedCurve::Sect233k1 => 6,
            NamedCurve::Sect233r1 => 7,
            NamedCurve::Sect239k1 => 8,
            NamedCurve::Sect283k1 => 9,
            NamedCurve::Sect283r1 => 10,
            NamedCurve::Sect409k1 => 11,
            NamedCurve::Sect409r1 => 12,
            NamedCurve::Sect571k1 => 13,
            NamedCurve::Sect571r1 => 14,
            NamedCurve::Secp160k1 => 15,
            NamedCurve::Secp160r1 => 16,
            NamedCurve::Secp160r2 => 17,
            NamedCurve::Secp192k1 => 18,
            NamedCurve::Secp192r1 => 19,
            NamedCurve::Secp224k1 => 20,
            NamedCurve::Secp224r1 => 21,
            NamedCurve::Secp256k1 => 22,
            NamedCurve::Secp256r1 => 23,
            NamedCurve::Secp384r1 => 24,
            NamedCurve::Secp521r1 => 25,
            NamedCurve::X25519 => 29,
            NamedCurve::X448 => 30,
            NamedCurve::Unknown(value) => *value,
        }
    }

    /// Parse a `NamedCurve` from wire format.
    pub fn parse(input: &[u8]) -> IResult<&[u8], NamedCurve> {
        let (input, value) = be_u16(input)?;
        Ok((input, NamedCurve::from_u16(value)))
    }
}

/// `ECCurveType` from RFC 4492 section 5.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    ExplicitPrime,
    ExplicitChar2,
    NamedCurve,
    Unknown(u8),
}

impl CurveType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => CurveType::ExplicitPrime,
            2 => CurveType::ExplicitChar2,
            3 => CurveType::NamedCurve,
            _ => CurveType::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            CurveType::ExplicitPrime => 1,
            CurveType::ExplicitChar2 => 2,
            CurveType::NamedCurve => 3,
            CurveType::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], CurveType> {
        let (input, value) = be_u8(input)?;
        Ok((input, CurveType::from_u8(value)))
    }
}

// ============================================================================
// Hash Algorithms
// ============================================================================

/// Hash algorithms used in DTLS 1.2 digital signatures (RFC 5246).
///
/// Selected during cipher-suite negotiation and passed to every signing
/// and verification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum HashAlgorithm {
    /// No hash (not typically used).
    None,
    /// MD5 hash (deprecated, not supported).
    MD5,
    /// SHA-1 hash.
    SHA1,
    /// SHA-224 hash.
    SHA224,
    /// SHA-256 hash.
    SHA256,
    /// SHA-384 hash.
    SHA384,
    /// SHA-512 hash.
    SHA512,
    /// Unknown or unsupported hash algorithm.
    Unknown(u8),
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Unknown(0)
    }
}

impl HashAlgorithm {
    /// Convert a wire format u8 value to a `HashAlgorithm`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => HashAlgorithm::None,
            1 => HashAlgorithm::MD5,
            2 => HashAlgorithm::SHA1,
            3 => HashAlgorithm::SHA224,
            4 => HashAlgorithm::SHA256,
            5 => HashAlgorithm::SHA384,
            6 => HashAlgorithm::SHA512,
            _ => HashAlgorithm::Unknown(value),
        }
    }

    /// Convert this `HashAlgorithm` to its wire format u8 value.
    pub fn as_u8(&self) -> u8 {
        match self {
            HashAlgorithm::None => 0,
            HashAlgorithm::MD5 => 1,
            HashAlgorithm::SHA1 => 2,
            HashAlgorithm::SHA224 => 3,
            HashAlgorithm::SHA256 => 4,
            HashAlgorithm::SHA384 => 5,
            HashAlgorithm::SHA512 => 6,
            HashAlgorithm::Unknown(value) => *value,
        }
    }

    /// Parse a `HashAlgorithm` from wire format.
    pub fn parse(input: &[u8]) -> IResult<&[u8], HashAlgorithm> {
        let (input, value) = be_u8(input)?;
        Ok((input, HashAlgorithm::from_u8(value)))
    }

    /// Digest length in bytes, or `None` for algorithms this crate can't compute.
    pub fn output_len(&self) -> Option<usize> {
        match self {
            HashAlgorithm::SHA1 => Some(20),
            HashAlgorithm::SHA224 => Some(28),
            HashAlgorithm::SHA256 => Some(32),
            HashAlgorithm::SHA384 => Some(48),
            HashAlgorithm::SHA512 => Some(64),
            _ => None,
        }
    }

    /// Returns true if signatures can be produced and checked with this hash.
    pub fn is_supported(&self) -> bool {
        self.output_len().is_some()
    }

    /// Hash `data` with this algorithm.
    ///
    /// Uses the process default [`CryptoProvider`] when one is installed, else
    /// the RustCrypto backend.
    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match CryptoProvider::get_default() {
            Some(provider) => provider.digest(*self, data),
            None => crate::crypto::rust_crypto::default_provider().digest(*self, data),
        }
    }
}

// ============================================================================
// Signature Algorithms
// ============================================================================

/// Signature algorithms used in DTLS 1.2 handshakes.
///
/// Identifies the key family behind a signing key or a certificate's
/// subject public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum SignatureAlgorithm {
    /// Anonymous (no certificate).
    Anonymous,
    /// RSA signatures.
    RSA,
    /// DSA signatures.
    DSA,
    /// ECDSA signatures.
    ECDSA,
    /// Ed25519 signatures (RFC 8422).
    ED25519,
    /// Unknown or unsupported signature algorithm.
    Unknown(u8),
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self::Unknown(0)
    }
}

impl SignatureAlgorithm {
    /// Convert an 8-bit value into a `SignatureAlgorithm`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => SignatureAlgorithm::Anonymous,
            1 => SignatureAlgorithm::RSA,
            2 => SignatureAlgorithm::DSA,
            3 => SignatureAlgorithm::ECDSA,
            7 => SignatureAlgorithm::ED25519,
            _ => SignatureAlgorithm::Unknown(value),
        }
    }

    /// Convert this `SignatureAlgorithm` into its 8-bit representation.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureAlgorithm::Anonymous => 0,
            SignatureAlgorithm::RSA => 1,
            SignatureAlgorithm::DSA => 2,
            SignatureAlgorithm::ECDSA => 3,
            SignatureAlgorithm::ED25519 => 7,
            SignatureAlgorithm::Unknown(value) => *value,
        }
    }

    /// Parse a `SignatureAlgorithm` from network bytes.
    pub fn parse(input: &[u8]) -> IResult<&[u8], SignatureAlgorithm> {
        let (input, value) = be_u8(input)?;
        Ok((input, SignatureAlgorithm::from_u8(value)))
    }
}

// ============================================================================
// Content Type
// ============================================================================

/// DTLS record content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Change Cipher Spec.
    ChangeCipherSpec,
    /// Alert message.
    Alert,
    /// Handshake message.
    Handshake,
    /// Application data.
    ApplicationData,
    /// Unknown content type.
    Unknown(u8),
}

impl Default for ContentType {
    fn default() -> Self {
        Self::Unknown(0)
    }
}

impl ContentType {
    /// Convert a u8 value to a `ContentType`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            20 => ContentType::ChangeCipherSpec,
            21 => ContentType::Alert,
            22 => ContentType::Handshake,
            23 => ContentType::ApplicationData,
            _ => ContentType::Unknown(value),
        }
    }

    /// Convert this `ContentType` to its u8 value.
    pub fn as_u8(&self) -> u8 {
        match self {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
            ContentType::Unknown(value) => *value,
        }
    }

    /// Parse a `ContentType` from wire format.
    pub fn parse(input: &[u8]) -> IResult<&[u8], ContentType> {
        let (input, byte) = be_u8(input)?;
        Ok((input, Self::from_u8(byte)))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::ChangeCipherSpec => write!(f, "ChangeCipherSpec"),
            ContentType::Alert => write!(f, "Alert"),
            ContentType::Handshake => write!(f, "Handshake"),
            ContentType::ApplicationData => write!(f, "ApplicationData"),
            ContentType::Unknown(v) => write!(f, "Unknown({})", v),
        }
    }
}

// ============================================================================
// Protocol Version
// ============================================================================

/// Record-layer protocol version as carried on the wire.
///
/// DTLS versions are the one's complement of the TLS version they derive
/// from, so DTLS 1.2 is `{254, 253}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const DTLS1_0: ProtocolVersion = ProtocolVersion {
        major: 0xfe,
        minor: 0xff,
    };

    pub const DTLS1_2: ProtocolVersion = ProtocolVersion {
        major: 0xfe,
        minor: 0xfd,
    };

    pub fn parse(input: &[u8]) -> IResult<&[u8], ProtocolVersion> {
        let (input, major) = be_u8(input)?;
        let (input, minor) = be_u8(input)?;
        Ok((input, ProtocolVersion { major, minor }))
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DTLS1_0 => write!(f, "DTLS 1.0"),
            Self::DTLS1_2 => write!(f, "DTLS 1.2"),
            ProtocolVersion { major, minor } => write!(f, "{{{}, {}}}", major, minor),
        }
    }
}

// ============================================================================
// Record Layer Header
// ============================================================================

/// DTLS 1.2 record header (RFC 6347 section 4.1).
///
/// `sequence_number` is a 48-bit value carried in a `u64`. Bits above 48 are
/// not representable on the wire and are dropped when the header is packed
/// into associated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordLayerHeader {
    pub content_type: ContentType,
    pub protocol_version: ProtocolVersion,
    pub epoch: u16,
    pub sequence_number: u64,
    pub content_len: u16,
}

impl RecordLayerHeader {
    /// Encoded size of the header on the wire.
    pub const LEN: usize = 13;

    /// Parse a record header from the start of a datagram.
    pub fn parse(input: &[u8]) -> IResult<&[u8], RecordLayerHeader> {
        let (input, content_type) = ContentType::parse(input)?;
        let (input, protocol_version) = ProtocolVersion::parse(input)?;
        let (input, epoch) = be_u16(input)?;
        let (input, sequence_number) = be_u48(input)?;
        let (input, content_len) = be_u16(input)?;
        Ok((
            input,
            RecordLayerHeader {
                content_type,
                protocol_version,
                epoch,
                sequence_number,
                content_len,
            },
        ))
    }
}
