//! # Embedded Genesis
//!
//! The default first block, fixed at build time. Used when no export file
//! is configured.

use super::entities::{Block, GENESIS_BLOCK_ID};

/// Genesis creation time (Unix seconds).
pub const DEFAULT_GENESIS_TIME: u64 = 1_700_000_000;

/// Ecosystem of the genesis block.
pub const DEFAULT_ECOSYSTEM_ID: u64 = 1;

/// Wallet id that signs the genesis block.
pub const DEFAULT_GENESIS_KEY_ID: i64 = -6_457_397_116_804_315_740;

/// Block format version.
pub const DEFAULT_BLOCK_VERSION: u32 = 1;

/// Public key of the founding wallet (uncompressed, without prefix).
pub const DEFAULT_PUBLIC_KEY: [u8; 64] = [
    0x3b, 0x51, 0x2e, 0x7a, 0x66, 0x0d, 0x9f, 0x14, 0xc2, 0x87, 0x5e, 0x40, 0xa1, 0x93, 0x0b, 0x6e,
    0xf4, 0x28, 0xd7, 0x1c, 0x55, 0x8a, 0x02, 0xbd, 0x79, 0xe6, 0x31, 0x4f, 0xc0, 0x9a, 0x17, 0x68,
    0x8e, 0x23, 0xf1, 0x5c, 0x04, 0xb7, 0x6a, 0xd9, 0x12, 0x3e, 0xa5, 0x70, 0xcb, 0x46, 0x9d, 0x01,
    0x5f, 0xe8, 0x37, 0x8c, 0x2a, 0x61, 0xd4, 0x0f, 0xb2, 0x75, 0x19, 0xee, 0x43, 0x96, 0x2d, 0xc8,
];

/// Public key of the founding node.
pub const DEFAULT_NODE_PUBLIC_KEY: [u8; 64] = [
    0xa7, 0x04, 0x6b, 0xd2, 0x39, 0x8e, 0x15, 0xf0, 0x5d, 0xc3, 0x22, 0x9a, 0x71, 0x0e, 0xb4, 0x4f,
    0x86, 0x2b, 0xe9, 0x50, 0x13, 0xcd, 0x7e, 0x34, 0xa8, 0x61, 0x0f, 0xd5, 0x9c, 0x47, 0xba, 0x26,
    0xf3, 0x18, 0x8d, 0x62, 0xc9, 0x05, 0x7a, 0xe1, 0x3c, 0x94, 0x2f, 0xb6, 0x58, 0x0d, 0xe4, 0x71,
    0x1a, 0xcf, 0x66, 0x83, 0x3d, 0xf8, 0x29, 0x9e, 0x44, 0xb1, 0x07, 0xda, 0x6c, 0x35, 0x80, 0xfb,
];

/// Host the founding node announced.
pub const DEFAULT_GENESIS_HOST: &str = "127.0.0.1:7078";

/// Build the embedded genesis block.
pub fn default_genesis_block() -> Block {
    Block::new(
        GENESIS_BLOCK_ID,
        DEFAULT_GENESIS_TIME,
        DEFAULT_ECOSYSTEM_ID,
        DEFAULT_GENESIS_KEY_ID,
        0,
        DEFAULT_BLOCK_VERSION,
        DEFAULT_PUBLIC_KEY.to_vec(),
        DEFAULT_NODE_PUBLIC_KEY.to_vec(),
        DEFAULT_GENESIS_HOST.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_genesis_is_block_one() {
        let genesis = default_genesis_block();
        assert_eq!(genesis.id, 1);
        assert!(genesis.is_sealed());
        assert_eq!(genesis.node_public_key.len(), 64);
    }

    #[test]
    fn test_default_genesis_deterministic() {
        assert_eq!(default_genesis_block().hash, default_genesis_block().hash);
    }
}
