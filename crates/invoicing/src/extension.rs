//! Argentine electronic-invoicing fields composed onto a [`Document`].
//!
//! [`Document`]: crate::document::Document

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use afipedi_core::{BoardingPermitId, ValueObject};

/// AR-specific data carried next to the base document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArEdiExtension {
    /// Start of the period a credit/debit note refers to, when it has no
    /// related invoice.
    pub associated_period_start: Option<NaiveDate>,
    pub associated_period_end: Option<NaiveDate>,
    /// Boarding permits sent with export invoices (type 19, concept 1).
    pub boarding_permits: Vec<BoardingPermitId>,
}

impl ArEdiExtension {
    /// Both bounds, when both are set.
    pub fn associated_period(&self) -> Option<AssociatedPeriod> {
        match (self.associated_period_start, self.associated_period_end) {
            (Some(start), Some(end)) => Some(AssociatedPeriod { start, end }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ValueObject for AssociatedPeriod {}
