//! Infrastructure layer: settings, durability boundary and the vendor-bill
//! batch posting saga.

pub mod config;
pub mod posting;
pub mod transaction;

mod integration_tests;

pub use config::{EdiSettings, PostingContext};
pub use posting::{BatchReport, BatchStep, PostingError, StepStatus, VendorBillPosting};
pub use transaction::{CommitError, InMemoryTransaction, TransactionBoundary};
