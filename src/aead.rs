//! Additional Authenticated Data for DTLS 1.2 AEAD records.

use std::ops::Deref;

use crate::types::RecordLayerHeader;

/// Length of the DTLS 1.2 AEAD additional data.
pub const AAD_LEN: usize = 13;

/// Additional Authenticated Data for a DTLS 1.2 record.
///
/// ```text
/// epoch(2) || sequence_number(6) || content_type(1) || major(1) || minor(1) || length(2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aad(pub [u8; AAD_LEN]);

impl Deref for Aad {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Build the AEAD additional data for a record carrying `payload_len` bytes.
///
/// The sequence number is written as a full 64-bit value and its top two
/// bytes are then overwritten by the epoch. Sequence bits above 48 are
/// therefore dropped.
pub fn generate_aead_additional_data(header: &RecordLayerHeader, payload_len: u16) -> Aad {
    let mut aad = [0u8; AAD_LEN];

    // First set the full 8-byte sequence number
    aad[0..8].copy_from_slice(&header.sequence_number.to_be_bytes());

    // Overwrite the first 2 bytes with epoch
    aad[0..2].copy_from_slice(&header.epoch.to_be_bytes());

    // Content type at index 8
    aad[8] = header.content_type.as_u8();

    // Protocol version bytes (major:minor) at indexes 9-10
    aad[9] = header.protocol_version.major;
    aad[10] = header.protocol_version.minor;

    // Payload length (2 bytes) at indexes 11-12
    aad[11..13].copy_from_slice(&payload_len.to_be_bytes());

    Aad(aad)
}
