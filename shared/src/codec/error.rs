use thiserror::Error;

/// Errors raised while building outbound packets.
///
/// Decoding has no error type: malformed input only ever yields fewer fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    #[error("Field type {field_type} value is {len} bytes, longer than a TLV can carry")]
    FieldTooLong { field_type: u8, len: usize },
}
