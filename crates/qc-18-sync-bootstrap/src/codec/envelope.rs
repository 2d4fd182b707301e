//! Genesis export envelope.
//!
//! Layout (version 1, big-endian):
//!
//! | offset | size | field                      |
//! |--------|------|----------------------------|
//! | 0      | 4    | magic `QCGB`               |
//! | 4      | 2    | format version             |
//! | 6      | 4    | payload length `N`         |
//! | 10     | 4    | CRC-32 of payload          |
//! | 14     | N    | bincode-encoded `Block`    |

use bincode::Options;

use crate::domain::{Block, CodecError};

/// Magic bytes: "QCGB" (Quantum Chain Genesis Block)
pub const ENVELOPE_MAGIC: [u8; 4] = [0x51, 0x43, 0x47, 0x42];

/// Current envelope format version.
pub const ENVELOPE_VERSION: u16 = 1;

/// Fixed header size preceding the payload.
pub const ENVELOPE_HEADER_LEN: usize = 14;

/// Largest payload accepted on decode.
pub const MAX_ENVELOPE_PAYLOAD: usize = 1024 * 1024;

fn payload_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_ENVELOPE_PAYLOAD as u64)
        .reject_trailing_bytes()
}

/// Serialize `block` into a self-contained envelope.
///
/// # Errors
/// - `MalformedEnvelope` if the block does not fit in `MAX_ENVELOPE_PAYLOAD`
pub fn encode_genesis_envelope(block: &Block) -> Result<Vec<u8>, CodecError> {
    let payload = payload_options()
        .serialize(block)
        .map_err(|e| CodecError::MalformedEnvelope(format!("cannot encode block: {}", e)))?;

    let mut out = Vec::with_capacity(ENVELOPE_HEADER_LEN + payload.len());
    out.extend_from_slice(&ENVELOPE_MAGIC);
    out.extend_from_slice(&ENVELOPE_VERSION.to_be_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parse an envelope back into the genesis block it carries.
///
/// # Errors
/// `MalformedEnvelope` on truncated input, bad magic, unsupported version,
/// a length field that disagrees with the payload, a checksum mismatch, an
/// undecodable payload, or a block that is not a sealed block #1.
pub fn decode_genesis_envelope(bytes: &[u8]) -> Result<Block, CodecError> {
    if bytes.len() < ENVELOPE_HEADER_LEN {
        return Err(malformed(format!(
            "truncated header: {} of {} bytes",
            bytes.len(),
            ENVELOPE_HEADER_LEN
        )));
    }

    let (header, payload) = bytes.split_at(ENVELOPE_HEADER_LEN);

    if header[0..4] != ENVELOPE_MAGIC {
        return Err(malformed("unrecognized magic bytes".to_string()));
    }

    let version = u16::from_be_bytes([header[4], header[5]]);
    if version != ENVELOPE_VERSION {
        return Err(malformed(format!(
            "unsupported version {} (expected {})",
            version, ENVELOPE_VERSION
        )));
    }

    let declared = u32::from_be_bytes([header[6], header[7], header[8], header[9]]) as usize;
    if declared > MAX_ENVELOPE_PAYLOAD {
        return Err(malformed(format!(
            "payload length {} exceeds limit {}",
            declared, MAX_ENVELOPE_PAYLOAD
        )));
    }
    if declared != payload.len() {
        return Err(malformed(format!(
            "length field says {} bytes, found {}",
            declared,
            payload.len()
        )));
    }

    let checksum = u32::from_be_bytes([header[10], header[11], header[12], header[13]]);
    let actual = crc32fast::hash(payload);
    if checksum != actual {
        return Err(malformed(format!(
            "checksum mismatch: header {:08x}, payload {:08x}",
            checksum, actual
        )));
    }

    let block: Block = payload_options()
        .deserialize(payload)
        .map_err(|e| malformed(format!("cannot decode block: {}", e)))?;

    if !block.is_genesis() {
        return Err(malformed(format!("expected block 1, found block {}", block.id)));
    }
    if !block.is_sealed() {
        return Err(malformed("block hash does not match content".to_string()));
    }

    Ok(block)
}

fn malformed(reason: String) -> CodecError {
    CodecError::MalformedEnvelope(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_genesis_block;
    use proptest::prelude::*;

    fn encoded() -> Vec<u8> {
        encode_genesis_envelope(&default_genesis_block()).unwrap()
    }

    #[test]
    fn test_round_trip_default_genesis() {
        let block = default_genesis_block();
        let decoded = decode_genesis_envelope(&encoded()).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_header_layout() {
        let bytes = encoded();
        assert_eq!(&bytes[0..4], b"QCGB");
        assert_eq!(&bytes[4..6], &[0, 1]);
        let len = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
        assert_eq!(len, bytes.len() - ENVELOPE_HEADER_LEN);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            decode_genesis_envelope(&[]),
            Err(CodecError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let bytes = encoded();
        let result = decode_genesis_envelope(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(CodecError::MalformedEnvelope(m)) if m.contains("length")));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut bytes = encoded();
        bytes.push(0);
        assert!(decode_genesis_envelope(&bytes).is_err());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = encoded();
        bytes[0] = b'X';
        let result = decode_genesis_envelope(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedEnvelope(m)) if m.contains("magic")));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut bytes = encoded();
        bytes[5] = 2;
        let result = decode_genesis_envelope(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedEnvelope(m)) if m.contains("version")));
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let mut bytes = encoded();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let result = decode_genesis_envelope(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedEnvelope(m)) if m.contains("checksum")));
    }

    #[test]
    fn test_tampered_block_rejected() {
        let mut block = default_genesis_block();
        block.host = "evil:1".to_string();
        let bytes = encode_genesis_envelope(&block).unwrap();
        let result = decode_genesis_envelope(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedEnvelope(m)) if m.contains("hash")));
    }

    #[test]
    fn test_non_genesis_block_rejected() {
        let block = Block::new(2, 0, 1, 0, 0, 1, vec![], vec![], String::new());
        let bytes = encode_genesis_envelope(&block).unwrap();
        assert!(decode_genesis_envelope(&bytes).is_err());
    }

    proptest! {
        #[test]
        fn prop_envelope_round_trip(
            time in any::<u64>(),
            ecosystem_id in any::<u64>(),
            key_id in any::<i64>(),
            node_position in any::<u32>(),
            public_key in proptest::collection::vec(any::<u8>(), 0..96),
            node_public_key in proptest::collection::vec(any::<u8>(), 0..96),
            host in "[a-z0-9.]{0,24}(:[0-9]{1,5})?",
        ) {
            let block = Block::new(
                1, time, ecosystem_id, key_id, node_position, 1,
                public_key, node_public_key, host,
            );
            let bytes = encode_genesis_envelope(&block).unwrap();
            prop_assert_eq!(decode_genesis_envelope(&bytes).unwrap(), block);
        }
    }
}
