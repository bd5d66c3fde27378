//! Durability boundary of the posting saga.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use afipedi_core::DocumentId;
use afipedi_invoicing::Document;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Makes a document's current state durable.
///
/// Each call is its own durability boundary: once it returns `Ok`, a later
/// failure in the same batch does not undo it.
pub trait TransactionBoundary {
    fn commit(&mut self, document: &Document) -> Result<(), CommitError>;
}

/// Keeps committed snapshots in memory, in commit order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransaction {
    committed: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> Result<Vec<Document>, CommitError> {
        let committed = self.committed.read().map_err(|_| poisoned())?;
        Ok(committed.clone())
    }

    pub fn committed_ids(&self) -> Result<Vec<DocumentId>, CommitError> {
        Ok(self.committed()?.iter().map(Document::id_typed).collect())
    }
}

fn poisoned() -> CommitError {
    CommitError::Unavailable("lock poisoned".to_string())
}

impl TransactionBoundary for InMemoryTransaction {
    fn commit(&mut self, document: &Document) -> Result<(), CommitError> {
        let mut committed = self
            .committed
            .write()
            .map_err(|_| poisoned())?;
        committed.push(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisoned_store_is_reported_not_hidden() {
        let transaction = InMemoryTransaction::new();
        let shared = Arc::clone(&transaction.committed);
        let _ = std::thread::spawn(move || {
            let _guard = shared.write().unwrap();
            panic!("writer died while holding the lock");
        })
        .join();

        assert!(matches!(
            transaction.committed(),
            Err(CommitError::Unavailable(_))
        ));
        assert!(transaction.committed_ids().is_err());
    }
}
