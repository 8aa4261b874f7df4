//! Integration tests for the handshake authentication primitives.

mod certificate_verify;
mod common;
mod key_exchange;
mod provider;
