//! # Wire Codec
//!
//! Stateless transforms between in-memory values and the fixed-width
//! encodings used on the probe wire and in genesis export files.
//!
//! ```text
//! probe request   [tag: u16 BE]                    2 bytes
//! probe response  [head block id: u32 BE]          4 bytes
//! genesis file    [magic|version|len|crc|payload]  14 + N bytes
//! ```

pub mod envelope;
pub mod probe;

pub use envelope::{
    decode_genesis_envelope, encode_genesis_envelope, ENVELOPE_HEADER_LEN, ENVELOPE_MAGIC,
    ENVELOPE_VERSION, MAX_ENVELOPE_PAYLOAD,
};
pub use probe::{
    decode_head_response, decode_request, encode_head_response, encode_request, RequestKind,
    HEAD_RESPONSE_LEN, REQUEST_LEN,
};
