//! In-Memory Chain Store
//!
//! `ChainStore` backed by a `HashMap` behind a `RwLock`. Each call is
//! atomic on its own; used by tests and by nodes running without a
//! persistent ledger.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::{Block, ChainHead, StoreError};
use crate::ports::outbound::ChainStore;

#[derive(Default)]
struct Inner {
    blocks: HashMap<u64, Block>,
    head: Option<ChainHead>,
}

/// In-memory ledger store.
#[derive(Default)]
pub struct InMemoryChainStore {
    inner: RwLock<Inner>,
}

impl InMemoryChainStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks.
    pub fn block_count(&self) -> usize {
        self.inner.read().blocks.len()
    }
}

impl ChainStore for InMemoryChainStore {
    fn block_exists(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.inner.read().blocks.contains_key(&id))
    }

    fn get_block(&self, id: u64) -> Result<Option<Block>, StoreError> {
        Ok(self.inner.read().blocks.get(&id).cloned())
    }

    fn put_block(&self, block: &Block) -> Result<(), StoreError> {
        self.inner.write().blocks.insert(block.id, block.clone());
        Ok(())
    }

    fn set_chain_head(&self, head: ChainHead) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.blocks.contains_key(&head.block_id) {
            return Err(StoreError::MissingBlock {
                block_id: head.block_id,
            });
        }
        inner.head = Some(head);
        Ok(())
    }

    fn get_chain_head(&self) -> Result<Option<ChainHead>, StoreError> {
        Ok(self.inner.read().head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_genesis_block;

    #[test]
    fn test_empty_store() {
        let store = InMemoryChainStore::new();
        assert!(!store.block_exists(1).unwrap());
        assert_eq!(store.get_chain_head().unwrap(), None);
    }

    #[test]
    fn test_put_then_head() {
        let store = InMemoryChainStore::new();
        let block = default_genesis_block();

        store.put_block(&block).unwrap();
        store.set_chain_head(ChainHead::for_block(&block)).unwrap();

        assert!(store.block_exists(1).unwrap());
        assert_eq!(store.get_block(1).unwrap(), Some(block));
        assert_eq!(store.get_chain_head().unwrap().map(|h| h.block_id), Some(1));
    }

    #[test]
    fn test_head_without_block_rejected() {
        let store = InMemoryChainStore::new();
        let head = ChainHead::for_block(&default_genesis_block());

        let result = store.set_chain_head(head);
        assert_eq!(result, Err(StoreError::MissingBlock { block_id: 1 }));
        assert_eq!(store.get_chain_head().unwrap(), None);
    }
}
