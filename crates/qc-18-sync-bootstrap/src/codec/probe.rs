//! Probe request/response encoding.

use crate::domain::CodecError;

/// Size of every probe request.
pub const REQUEST_LEN: usize = 2;

/// Size of every head response.
pub const HEAD_RESPONSE_LEN: usize = 4;

/// Request kinds understood by peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum RequestKind {
    /// "Report your current head block id."
    MaxBlockId = 10,
}

impl RequestKind {
    /// Wire tag.
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Kind for a wire tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            10 => Some(RequestKind::MaxBlockId),
            _ => None,
        }
    }
}

/// Encode a request. No payload follows the tag.
pub fn encode_request(kind: RequestKind) -> [u8; REQUEST_LEN] {
    kind.tag().to_be_bytes()
}

/// Decode a request as a serving peer would.
pub fn decode_request(bytes: &[u8]) -> Result<RequestKind, CodecError> {
    let tag: [u8; REQUEST_LEN] = bytes.try_into().map_err(|_| {
        CodecError::MalformedRequest(format!(
            "expected {} bytes, got {}",
            REQUEST_LEN,
            bytes.len()
        ))
    })?;

    let tag = u16::from_be_bytes(tag);
    RequestKind::from_tag(tag)
        .ok_or_else(|| CodecError::MalformedRequest(format!("unknown request tag {}", tag)))
}

/// Encode a head response as a serving peer would.
pub fn encode_head_response(head_block_id: u32) -> [u8; HEAD_RESPONSE_LEN] {
    head_block_id.to_be_bytes()
}

/// Decode a peer's head block id. Only an exact 4-byte reply is accepted.
pub fn decode_head_response(bytes: &[u8]) -> Result<u64, CodecError> {
    let raw: [u8; HEAD_RESPONSE_LEN] = bytes.try_into().map_err(|_| {
        CodecError::MalformedResponse {
            expected: HEAD_RESPONSE_LEN,
            actual: bytes.len(),
        }
    })?;
    Ok(u64::from(u32::from_be_bytes(raw)))
}
