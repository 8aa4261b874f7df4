//! Handshake authentication primitives for DTLS 1.2.
//!
//! This crate holds the parts of a DTLS stack where a single wrong byte
//! turns into an authentication bypass:
//!
//! * [`value_key_message`], [`generate_key_signature`] and
//!   [`verify_key_signature`] sign and check the ServerKeyExchange parameters.
//! * [`generate_certificate_verify`] and [`verify_certificate_verify`] sign
//!   and check the handshake transcript for client authentication.
//! * [`verify_client_cert`] and [`verify_server_cert`] validate a peer's
//!   certificate chain against a set of [`TrustRoots`].
//! * [`generate_aead_additional_data`] packs the 13 byte additional data
//!   bound to every AEAD record.
//!
//! The handshake state machine, record encryption and transport are not part
//! of this crate. They call in with assembled handshake bytes and parsed
//! header fields.
//!
//! Every operation is a pure function of its inputs. Cryptography goes
//! through the [`CryptoProvider`](crate::crypto::CryptoProvider) held by
//! [`Config`], so backends can be swapped.
//!
//! # Example
//!
//! ```
//! use dtls_auth::types::{ContentType, ProtocolVersion, RecordLayerHeader};
//! use dtls_auth::generate_aead_additional_data;
//!
//! let header = RecordLayerHeader {
//!     content_type: ContentType::ApplicationData,
//!     protocol_version: ProtocolVersion::DTLS1_2,
//!     epoch: 1,
//!     sequence_number: 5,
//!     content_len: 0,
//! };
//!
//! let aad = generate_aead_additional_data(&header, 16);
//! assert_eq!(&aad[..2], &[0x00, 0x01]);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod aead;
mod certificate;
mod certificate_verify;
mod config;
mod error;
mod key_exchange;
mod util;

pub mod crypto;
pub mod types;

pub use aead::{generate_aead_additional_data, Aad, AAD_LEN};
pub use certificate::{load_certs, verify_client_cert, verify_server_cert, TrustRoots};
pub use certificate_verify::{generate_certificate_verify, verify_certificate_verify};
pub use config::{Config, ConfigBuilder};
pub use error::{ChainError, Error};
pub use key_exchange::{generate_key_signature, value_key_message, verify_key_signature};

// Certificates are returned in their parsed form.
pub use x509_cert::Certificate;
