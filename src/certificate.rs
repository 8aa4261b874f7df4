//! Peer certificate chain validation.
//!
//! A chain arrives leaf first. Everything after the leaf is treated as an
//! unordered pool of intermediates, and paths are built from the leaf up to
//! any of the caller's [`TrustRoots`].

use std::net::IpAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use der::oid::AssociatedOid;
use der::{Decode, Encode};
use spki::ObjectIdentifier;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::constraints::name::GeneralSubtrees;
use x509_cert::ext::pkix::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, NameConstraints, SubjectAltName,
};
use x509_cert::ext::Extension;
use x509_cert::Certificate;

use crate::config::Config;
use crate::crypto::signing::{self, key_algorithm};
use crate::crypto::CryptoProvider;
use crate::error::ChainError;
use crate::types::{HashAlgorithm, SignatureAlgorithm};
use crate::Error;

const OID_KP_CLIENT_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.2");
const OID_ANY_EXTENDED_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37.0");

/// Extensions understood here. Any other critical extension rejects the certificate.
const HANDLED_EXTENSIONS: [ObjectIdentifier; 5] = [
    BasicConstraints::OID,
    KeyUsage::OID,
    ExtendedKeyUsage::OID,
    SubjectAltName::OID,
    NameConstraints::OID,
];

/// Set of trusted certificate authorities.
#[derive(Debug, Clone, Default)]
pub struct TrustRoots {
    roots: Vec<Certificate>,
}

impl TrustRoots {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already parsed certificate.
    pub fn add(&mut self, cert: Certificate) {
        if !self.roots.contains(&cert) {
            self.roots.push(cert);
        }
    }

    /// Add a DER encoded certificate.
    pub fn add_der(&mut self, der: &[u8]) -> Result<(), Error> {
        let cert = Certificate::from_der(der).map_err(Error::CertificateParseError)?;
        self.add(cert);
        Ok(())
    }

    /// Add every certificate of a PEM bundle, returning how many were read.
    pub fn add_pem(&mut self, pem: &[u8]) -> Result<usize, Error> {
        let certs = Certificate::load_pem_chain(pem).map_err(Error::CertificateParseError)?;
        let count = certs.len();
        for cert in certs {
            self.add(cert);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn contains(&self, cert: &Certificate) -> bool {
        self.roots.contains(cert)
    }
}

impl FromIterator<Certificate> for TrustRoots {
    fn from_iter<I: IntoIterator<Item = Certificate>>(iter: I) -> Self {
        let mut roots = TrustRoots::new();
        for cert in iter {
            roots.add(cert);
        }
        roots
    }
}

/// Parse every certificate of a raw chain.
///
/// Fails on the first certificate that does not parse.
pub fn load_certs<C: AsRef<[u8]>>(raw_certificates: &[C]) -> Result<Vec<Certificate>, Error> {
    if raw_certificates.is_empty() {
        return Err(Error::EmptyChain);
    }

    raw_certificates
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            Certificate::from_der(raw.as_ref()).map_err(|e| {
                debug!("Certificate {} in chain failed to parse: {}", i, e);
                Error::CertificateParseError(e)
            })
        })
        .collect()
}

/// Validate a client's certificate chain.
///
/// The leaf, and every CA above it that restricts extended key usage, must
/// allow client authentication. Returns every certification path found,
/// each ordered leaf first and ending in a trust root.
pub fn verify_client_cert<C: AsRef<[u8]>>(
    config: &Config,
    raw_certificates: &[C],
    roots: &TrustRoots,
) -> Result<Vec<Vec<Certificate>>, Error> {
    let certs = load_certs(raw_certificates)?;
    let paths = build_verified_paths(config, &certs, roots, None)?;

    let paths: Vec<_> = paths
        .into_iter()
        .filter(|path| path.iter().all(allows_client_auth))
        .collect();

    if paths.is_empty() {
        debug!("No certification path allows client authentication");
        return Err(ChainError::IncompatibleUsage.into());
    }

    Ok(paths)
}

/// Validate a server's certificate chain for `server_name`.
///
/// An empty `server_name` skips hostname verification. Returns every
/// certification path found, each ordered leaf first and ending in a trust
/// root.
pub fn verify_server_cert<C: AsRef<[u8]>>(
    config: &Config,
    raw_certificates: &[C],
    roots: &TrustRoots,
    server_name: &str,
) -> Result<Vec<Vec<Certificate>>, Error> {
    let certs = load_certs(raw_certificates)?;
    build_verified_paths(config, &certs, roots, Some(server_name))
}

fn build_verified_paths(
    config: &Config,
    certs: &[Certificate],
    roots: &TrustRoots,
    server_name: Option<&str>,
) -> Result<Vec<Vec<Certificate>>, Error> {
    let (leaf, intermediates) = certs.split_first().ok_or(Error::EmptyChain)?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    check_validity(leaf, now)?;
    check_critical_extensions(leaf)?;

    if let Some(name) = server_name.filter(|n| !n.is_empty()) {
        verify_hostname(leaf, name)?;
    }

    if roots.contains(leaf) {
        trace!("Leaf {} is itself a trust root", leaf.tbs_certificate.subject);
        return Ok(vec![vec![leaf.clone()]]);
    }

    let mut builder = PathBuilder {
        provider: config.crypto_provider(),
        roots: &roots.roots,
        intermediates,
        now,
        max_depth: config.max_chain_depth(),
        signature_checks_left: config.max_signature_checks(),
        paths: Vec::new(),
        hint: None,
    };

    let mut current = vec![leaf];
    builder.extend(&mut current)?;

    if builder.paths.is_empty() {
        let err = builder.hint.unwrap_or_else(|| ChainError::UnknownAuthority {
            issuer: leaf.tbs_certificate.issuer.to_string(),
        });
        debug!("Chain validation failed: {}", err);
        return Err(err.into());
    }

    trace!("Built {} certification path(s)", builder.paths.len());
    Ok(builder.paths)
}

struct PathBuilder<'a> {
    provider: &'a CryptoProvider,
    roots: &'a [Certificate],
    intermediates: &'a [Certificate],
    now: Duration,
    max_depth: usize,
    signature_checks_left: usize,
    paths: Vec<Vec<Certificate>>,
    /// First reason a candidate issuer was rejected, reported if no path is found.
    hint: Option<ChainError>,
}

impl<'a> PathBuilder<'a> {
    /// Extend `current` (leaf first) with every issuer of its last element.
    fn extend(&mut self, current: &mut Vec<&'a Certificate>) -> Result<(), ChainError> {
        let Some(&child) = current.last() else {
            return Ok(());
        };

        let roots = self.roots;
        let intermediates = self.intermediates;

        for candidate in roots {
            if self.consider(current, child, candidate)? {
                let mut path: Vec<Certificate> = current.iter().map(|c| (*c).clone()).collect();
                path.push(candidate.clone());
                self.paths.push(path);
            }
        }

        for candidate in intermediates {
            if self.consider(current, child, candidate)? {
                current.push(candidate);
                let result = self.extend(current);
                current.pop();
                result?;
            }
        }

        Ok(())
    }

    /// Whether `candidate` is a valid issuer of `child` on top of `current`.
    fn consider(
        &mut self,
        current: &[&Certificate],
        child: &Certificate,
        candidate: &Certificate,
    ) -> Result<bool, ChainError> {
        if candidate.tbs_certificate.subject != child.tbs_certificate.issuer {
            return Ok(false);
        }
        if current.iter().any(|c| *c == candidate) {
            return Ok(false);
        }

        trace!(
            "Considering issuer {} for {}",
            candidate.tbs_certificate.subject,
            child.tbs_certificate.subject
        );

        if current.len() >= self.max_depth {
            self.note(ChainError::TooManyIntermediates);
            return Ok(false);
        }

        if self.signature_checks_left == 0 {
            debug!("Signature check limit reached while building chain");
            return Err(ChainError::TooManySignatureChecks);
        }
        self.signature_checks_left -= 1;

        if let Err(e) = verify_issued_by(self.provider, child, candidate) {
            trace!("Issuer signature rejected: {}", e);
            return Ok(false);
        }

        if let Err(e) = self.check_issuer(current, candidate) {
            self.note(e);
            return Ok(false);
        }

        Ok(true)
    }

    fn check_issuer(
        &self,
        current: &[&Certificate],
        candidate: &Certificate,
    ) -> Result<(), ChainError> {
        check_validity(candidate, self.now)?;
        check_critical_extensions(candidate)?;

        let subject = || candidate.tbs_certificate.subject.to_string();

        let constraints = match find_extension::<BasicConstraints>(candidate) {
            Some(Ok(bc)) if bc.ca => bc,
            _ => return Err(ChainError::NotAuthorizedToSign { subject: subject() }),
        };

        if let Some(max_path_len) = constraints.path_len_constraint {
            let intermediates_below = current.len() - 1;
            if intermediates_below > usize::from(max_path_len) {
                return Err(ChainError::TooManyIntermediates);
            }
        }

        match find_extension::<NameConstraints>(candidate) {
            None => {}
            Some(Ok(nc)) => {
                for cert in current {
                    if let Err(name) = check_name_constraints(&nc, cert) {
                        return Err(ChainError::NameConstraintViolation {
                            subject: subject(),
                            name,
                        });
                    }
                }
            }
            Some(Err(_)) => return Err(ChainError::NotAuthorizedToSign { subject: subject() }),
        }

        Ok(())
    }

    fn note(&mut self, err: ChainError) {
        trace!("Candidate issuer rejected: {}", err);
        if self.hint.is_none() {
            self.hint = Some(err);
        }
    }
}

fn check_validity(cert: &Certificate, now: Duration) -> Result<(), ChainError> {
    let validity = &cert.tbs_certificate.validity;
    let not_before = validity.not_before.to_unix_duration();
    let not_after = validity.not_after.to_unix_duration();

    if now < not_before {
        return Err(ChainError::NotYetValid {
            subject: cert.tbs_certificate.subject.to_string(),
            not_before: not_before.as_secs(),
        });
    }
    if now > not_after {
        return Err(ChainError::Expired {
            subject: cert.tbs_certificate.subject.to_string(),
            not_after: not_after.as_secs(),
        });
    }

    Ok(())
}

fn check_critical_extensions(cert: &Certificate) -> Result<(), ChainError> {
    let Some(extensions) = cert.tbs_certificate.extensions.as_ref() else {
        return Ok(());
    };

    match extensions
        .iter()
        .find(|ext| ext.critical && !HANDLED_EXTENSIONS.contains(&ext.extn_id))
    {
        Some(ext) => Err(ChainError::UnhandledCriticalExtension {
            subject: cert.tbs_certificate.subject.to_string(),
            oid: ext.extn_id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Check the dNSName and iPAddress SANs of `cert` against a CA's name
/// constraints, returning the first name that is not allowed.
///
/// Certificates without a SAN extension are not constrained.
fn check_name_constraints(constraints: &NameConstraints, cert: &Certificate) -> Result<(), String> {
    let san = match find_extension::<SubjectAltName>(cert) {
        None => return Ok(()),
        Some(Ok(san)) => san,
        Some(Err(_)) => return Err("malformed subjectAltName".to_string()),
    };

    for name in &san.0 {
        let display = match name {
            GeneralName::DnsName(dns) => dns.to_string(),
            GeneralName::IpAddress(ip) => format!("{:02x?}", ip.as_bytes()),
            _ => continue,
        };

        let excluded = constraints
            .excluded_subtrees
            .as_ref()
            .map_or(false, |subtrees| subtrees_match(subtrees, name) == Some(true));
        let permitted = constraints
            .permitted_subtrees
            .as_ref()
            .map_or(true, |subtrees| subtrees_match(subtrees, name) != Some(false));

        if excluded || !permitted {
            debug!("Name {} violates name constraints", display);
            return Err(display);
        }
    }

    Ok(())
}

/// Whether `name` matches any subtree of its own type. `None` when no
/// subtree has that type.
fn subtrees_match(subtrees: &GeneralSubtrees, name: &GeneralName) -> Option<bool> {
    let mut seen = false;

    for subtree in subtrees {
        let matched = match (&subtree.base, name) {
            (GeneralName::DnsName(base), GeneralName::DnsName(dns)) => {
                match_domain_constraint(&base.to_string(), &dns.to_string())
            }
            (GeneralName::IpAddress(base), GeneralName::IpAddress(ip)) => {
                match_ip_constraint(base.as_bytes(), ip.as_bytes())
            }
            _ => continue,
        };
        seen = true;
        if matched {
            return Some(true);
        }
    }

    seen.then_some(false)
}

/// A constraint of `example.com` covers the domain and its subdomains,
/// `.example.com` only the subdomains. An empty constraint covers everything.
fn match_domain_constraint(constraint: &str, name: &str) -> bool {
    let constraint = constraint.trim_end_matches('.').to_ascii_lowercase();
    let name = name.trim_end_matches('.').to_ascii_lowercase();

    if constraint.is_empty() {
        return true;
    }

    match constraint.strip_prefix('.') {
        Some(suffix) => name
            .strip_suffix(suffix)
            .map_or(false, |head| head.len() > 1 && head.ends_with('.')),
        None => {
            name == constraint
                || name
                    .strip_suffix(constraint.as_str())
                    .map_or(false, |head| head.ends_with('.'))
        }
    }
}

/// `constraint` is an address followed by a mask of the same length.
fn match_ip_constraint(constraint: &[u8], ip: &[u8]) -> bool {
    if constraint.len() != ip.len() * 2 {
        return false;
    }

    let (addr, mask) = constraint.split_at(ip.len());
    ip.iter()
        .zip(addr)
        .zip(mask)
        .all(|((i, a), m)| i & m == a & m)
}

/// Check the signature `issuer` made over `child`.
fn verify_issued_by(
    provider: &CryptoProvider,
    child: &Certificate,
    issuer: &Certificate,
) -> Result<(), String> {
    let (key_type, hash) = match child.signature_algorithm.oid {
        signing::OID_SHA1_WITH_RSA => (SignatureAlgorithm::RSA, Some(HashAlgorithm::SHA1)),
        signing::OID_SHA256_WITH_RSA => (SignatureAlgorithm::RSA, Some(HashAlgorithm::SHA256)),
        signing::OID_SHA384_WITH_RSA => (SignatureAlgorithm::RSA, Some(HashAlgorithm::SHA384)),
        signing::OID_SHA512_WITH_RSA => (SignatureAlgorithm::RSA, Some(HashAlgorithm::SHA512)),
        signing::OID_ECDSA_WITH_SHA256 => (SignatureAlgorithm::ECDSA, Some(HashAlgorithm::SHA256)),
        signing::OID_ECDSA_WITH_SHA384 => (SignatureAlgorithm::ECDSA, Some(HashAlgorithm::SHA384)),
        signing::OID_ECDSA_WITH_SHA512 => (SignatureAlgorithm::ECDSA, Some(HashAlgorithm::SHA512)),
        signing::OID_ED25519 => (SignatureAlgorithm::ED25519, None),
        oid => return Err(format!("Unsupported certificate signature algorithm {}", oid)),
    };

    let spki = &issuer.tbs_certificate.subject_public_key_info;
    if key_algorithm(spki) != key_type {
        return Err(format!(
            "Issuer key {} cannot verify {}",
            spki.algorithm.oid, child.signature_algorithm.oid
        ));
    }

    let tbs = child
        .tbs_certificate
        .to_der()
        .map_err(|e| format!("Failed to encode TBS certificate: {}", e))?;
    let signature = child
        .signature
        .as_bytes()
        .ok_or_else(|| "Certificate signature has unused bits".to_string())?;

    let data = match hash {
        Some(hash) => provider.digest(hash, &tbs).map_err(|e| e.to_string())?,
        None => tbs,
    };

    provider
        .signature_verification
        .verify_signature(spki, &data, signature, hash)
}

fn find_extension<T>(cert: &Certificate) -> Option<Result<T, der::Error>>
where
    T: AssociatedOid + for<'a> Decode<'a>,
{
    cert.tbs_certificate
        .extensions
        .as_ref()?
        .iter()
        .find(|ext: &&Extension| ext.extn_id == T::OID)
        .map(|ext| T::from_der(ext.extn_value.as_bytes()))
}

/// Certificates without an EKU extension are unrestricted.
fn allows_client_auth(cert: &Certificate) -> bool {
    match find_extension::<ExtendedKeyUsage>(cert) {
        None => true,
        Some(Ok(eku)) => eku
            .0
            .iter()
            .any(|oid| *oid == OID_KP_CLIENT_AUTH || *oid == OID_ANY_EXTENDED_KEY_USAGE),
        Some(Err(_)) => false,
    }
}

fn verify_hostname(leaf: &Certificate, server_name: &str) -> Result<(), ChainError> {
    let mismatch = || {
        debug!("Certificate is not valid for {}", server_name);
        ChainError::NameMismatch {
            expected: server_name.to_string(),
        }
    };

    let host = server_name
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(server_name);

    let san = match find_extension::<SubjectAltName>(leaf) {
        Some(Ok(san)) => san,
        _ => return Err(mismatch()),
    };

    if let Ok(ip) = host.parse::<IpAddr>() {
        let wanted: Vec<u8> = match ip {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };
        let matched = san.0.iter().any(|name| match name {
            GeneralName::IpAddress(addr) => addr.as_bytes() == wanted.as_slice(),
            _ => false,
        });
        return if matched { Ok(()) } else { Err(mismatch()) };
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();

    let matched = san.0.iter().any(|name| match name {
        GeneralName::DnsName(dns) => match_hostname(&dns.to_string(), &host),
        _ => false,
    });

    if matched {
        Ok(())
    } else {
        Err(mismatch())
    }
}

/// Match a lowercased `host` against a certificate name, which may start
/// with a single `*` label.
fn match_hostname(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    if pattern.is_empty() || host.is_empty() {
        return false;
    }

    let pattern_labels: Vec<&str> = pattern.split('.').collect();
    let host_labels: Vec<&str> = host.split('.').collect();
    if pattern_labels.len() != host_labels.len() {
        return false;
    }

    pattern_labels
        .iter()
        .zip(&host_labels)
        .enumerate()
        .all(|(i, (p, h))| {
            if h.is_empty() {
                return false;
            }
            (i == 0 && *p == "*") || p == h
        })
}
