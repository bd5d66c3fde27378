//! `afipedi-core`: shared building blocks for the AFIP e-invoicing crates.
//!
//! Pure domain primitives only: identifiers, entity/value-object markers and
//! the domain error model. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BoardingPermitId, CompanyId, DocumentId, JournalId, PartnerId, SaleLineId};
pub use value_object::ValueObject;
