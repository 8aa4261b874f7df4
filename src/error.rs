use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::types::HashAlgorithm;

/// Every way an authentication primitive can fail.
///
/// Each variant is a definite authentication failure; callers are expected
/// to abort the handshake attempt rather than retry.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Certificate chain is empty")]
    EmptyChain,

    #[error("Failed to parse certificate: {0}")]
    CertificateParseError(der::Error),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("Unsupported hash algorithm: {0:?}")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    #[error("Failed to decode signature: {0}")]
    SignatureDecodeError(der::Error),

    #[error("Signature has a non-positive R or S component")]
    InvalidSignatureEncoding,

    #[error("Signature does not match key")]
    SignatureMismatch,

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Certificate chain validation failed: {0}")]
    ChainValidationError(ChainError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<ChainError> for Error {
    fn from(value: ChainError) -> Self {
        Error::ChainValidationError(value)
    }
}

/// Reason no certification path could be validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A certificate's notAfter lies in the past.
    #[error("certificate {subject} expired at {}", fmt_time(.not_after))]
    Expired { subject: String, not_after: u64 },

    /// A certificate's notBefore lies in the future.
    #[error("certificate {subject} is not valid before {}", fmt_time(.not_before))]
    NotYetValid { subject: String, not_before: u64 },

    /// No path from the leaf reaches a trust root.
    #[error("certificate signed by unknown authority {issuer}")]
    UnknownAuthority { issuer: String },

    /// The leaf is not valid for the expected server name.
    #[error("certificate is not valid for {expected}")]
    NameMismatch { expected: String },

    /// The leaf (or a CA above it) restricts extended key usage.
    #[error("certificate specifies an incompatible key usage")]
    IncompatibleUsage,

    /// An issuer does not carry basicConstraints with cA set.
    #[error("certificate {subject} is not authorized to sign other certificates")]
    NotAuthorizedToSign { subject: String },

    /// A name below a CA falls outside its name constraints.
    #[error("certificate {subject} is not permitted to sign for {name}")]
    NameConstraintViolation { subject: String, name: String },

    /// A certificate carries a critical extension that is not processed.
    #[error("certificate {subject} has unhandled critical extension {oid}")]
    UnhandledCriticalExtension { subject: String, oid: String },

    /// Path building gave up after too many signature checks.
    #[error("too many signature checks while building chain")]
    TooManySignatureChecks,

    /// A path length constraint or the configured depth limit was exceeded.
    #[error("too many intermediates for path length")]
    TooManyIntermediates,
}

fn fmt_time(unix_secs: &u64) -> String {
    i64::try_from(*unix_secs)
        .ok()
        .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| unix_secs.to_string())
}
