//! Read access to documents and permits referenced by other documents.

use std::collections::HashMap;

use afipedi_core::{BoardingPermitId, DocumentId, DomainError, DomainResult, SaleLineId};

use crate::boarding_permit::BoardingPermit;
use crate::document::Document;

/// Lookup of related records.
///
/// Implementations are expected to return documents in creation order so
/// that "first match" lookups are deterministic.
pub trait DocumentDirectory {
    fn document(&self, id: DocumentId) -> Option<&Document>;

    /// Documents having at least one line that invoices `sale_line`.
    fn invoices_for_sale_line(&self, sale_line: SaleLineId) -> Vec<DocumentId>;

    fn boarding_permit(&self, id: BoardingPermitId) -> Option<&BoardingPermit>;

    /// Resolve the permits linked to `document`, in link order.
    fn linked_permits(&self, document: &Document) -> DomainResult<Vec<BoardingPermit>> {
        document
            .ar_edi()
            .boarding_permits
            .iter()
            .map(|id| {
                self.boarding_permit(*id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found(format!("boarding permit {id}")))
            })
            .collect()
    }
}

/// In-memory directory keeping insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    documents: Vec<Document>,
    index: HashMap<DocumentId, usize>,
    permits: HashMap<BoardingPermitId, BoardingPermit>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document (replacement keeps the original position).
    pub fn upsert_document(&mut self, document: Document) {
        let id = document.id_typed();
        match self.index.get(&id) {
            Some(&pos) => self.documents[pos] = document,
            None => {
                self.index.insert(id, self.documents.len());
                self.documents.push(document);
            }
        }
    }

    pub fn upsert_permit(&mut self, permit: BoardingPermit) {
        self.permits.insert(permit.id, permit);
    }

    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        let pos = *self.index.get(&id)?;
        self.documents.get_mut(pos)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl DocumentDirectory for InMemoryDirectory {
    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.index.get(&id).map(|&pos| &self.documents[pos])
    }

    fn invoices_for_sale_line(&self, sale_line: SaleLineId) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|doc| {
                doc.lines()
                    .iter()
                    .any(|line| line.sale_lines.contains(&sale_line))
            })
            .map(Document::id_typed)
            .collect()
    }

    fn boarding_permit(&self, id: BoardingPermitId) -> Option<&BoardingPermit> {
        self.permits.get(&id)
    }
}
