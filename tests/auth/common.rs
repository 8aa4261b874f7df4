//! Shared certificate and key helpers.

#![allow(unused)]

use std::net::IpAddr;

use dtls_auth::crypto::SigningKey;
use dtls_auth::Config;
use rcgen::{
    BasicConstraints, Certificate as RcgenCertificate, CertificateParams, DistinguishedName,
    DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair, SanType, PKCS_ECDSA_P256_SHA256,
    PKCS_ECDSA_P384_SHA384, PKCS_ED25519, PKCS_RSA_SHA256,
};
use time::{Duration, OffsetDateTime};

/// 2048-bit RSA key, rcgen cannot generate RSA keys itself.
pub const RSA_KEY: &[u8] = include_bytes!("../data/rsa2048_pkcs8.der");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Ed25519,
    P256,
    P384,
    Rsa,
}

pub const ALL_KINDS: [KeyKind; 4] = [KeyKind::Ed25519, KeyKind::P256, KeyKind::P384, KeyKind::Rsa];

/// Certificate parameters with a fresh key of `kind` and subject `CN=<cn>`.
pub fn params(kind: KeyKind, cn: &str) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new());

    let (alg, key_pair) = match kind {
        KeyKind::Ed25519 => (&PKCS_ED25519, KeyPair::generate(&PKCS_ED25519).unwrap()),
        KeyKind::P256 => (
            &PKCS_ECDSA_P256_SHA256,
            KeyPair::generate(&PKCS_ECDSA_P256_SHA256).unwrap(),
        ),
        KeyKind::P384 => (
            &PKCS_ECDSA_P384_SHA384,
            KeyPair::generate(&PKCS_ECDSA_P384_SHA384).unwrap(),
        ),
        KeyKind::Rsa => (&PKCS_RSA_SHA256, KeyPair::from_der(RSA_KEY).unwrap()),
    };
    params.alg = alg;
    params.key_pair = Some(key_pair);

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn.to_string());
    params.distinguished_name = dn;

    params
}

/// Parameters for a CA certificate.
pub fn ca_params(kind: KeyKind, cn: &str) -> CertificateParams {
    let mut params = params(kind, cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params
}

pub fn with_dns_names(mut params: CertificateParams, names: &[&str]) -> CertificateParams {
    params.subject_alt_names = names
        .iter()
        .map(|n| SanType::DnsName(n.to_string()))
        .collect();
    params
}

pub fn with_ip(mut params: CertificateParams, ip: IpAddr) -> CertificateParams {
    params.subject_alt_names.push(SanType::IpAddress(ip));
    params
}

pub fn with_usage(
    mut params: CertificateParams,
    usage: &[ExtendedKeyUsagePurpose],
) -> CertificateParams {
    params.extended_key_usages = usage.to_vec();
    params
}

/// Shift the validity window to `[now + from_days, now + to_days]`.
pub fn with_validity(
    mut params: CertificateParams,
    from_days: i64,
    to_days: i64,
) -> CertificateParams {
    let now = OffsetDateTime::now_utc();
    params.not_before = now + Duration::days(from_days);
    params.not_after = now + Duration::days(to_days);
    params
}

pub fn issue(params: CertificateParams) -> RcgenCertificate {
    RcgenCertificate::from_params(params).unwrap()
}

pub fn self_signed(cert: &RcgenCertificate) -> Vec<u8> {
    cert.serialize_der().unwrap()
}

pub fn signed_by(cert: &RcgenCertificate, issuer: &RcgenCertificate) -> Vec<u8> {
    cert.serialize_der_with_signer(issuer).unwrap()
}

pub fn signing_key(config: &Config, cert: &RcgenCertificate) -> Box<dyn SigningKey> {
    config
        .crypto_provider()
        .load_private_key(&cert.serialize_private_key_der())
        .unwrap()
}
