//! Invoicing domain module for Argentine electronic invoicing.
//!
//! This crate holds the accounting document ("move") and the Argentine
//! extension composed onto it (associated period, boarding permits), plus
//! original-invoice resolution for credit/debit notes. Pure domain logic:
//! no IO, no web-service calls, no storage.

pub mod boarding_permit;
pub mod directory;
pub mod document;
pub mod extension;
pub mod journal;
pub mod related;

pub use boarding_permit::{BoardingPermit, Country};
pub use directory::{DocumentDirectory, InMemoryDirectory};
pub use document::{
    ActivityMessage, AfipResult, AuthMode, Company, AfipEnvironment, Document, DocumentLine,
    DocumentState, DocumentType, InternalType, MoveType, NewDocument, Partner,
    DUMMY_AUTH_CODE,
};
pub use extension::{ArEdiExtension, AssociatedPeriod};
pub use journal::{Journal, JournalKind, WebService};
pub use related::{AssociatedDocument, RelatedLookup, found_related_invoice, related_invoice_data};
