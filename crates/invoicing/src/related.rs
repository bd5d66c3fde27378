//! Resolution of the original invoice a credit/debit note corrects.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use afipedi_core::{DomainError, DomainResult, Entity, ValueObject};

use crate::directory::DocumentDirectory;
use crate::document::{Document, InternalType};

/// Options of the related-invoice lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedLookup {
    /// Follow sale-order links when no machine link exists.
    pub sale_integration: bool,
}

impl Default for RelatedLookup {
    fn default() -> Self {
        Self {
            sale_integration: true,
        }
    }
}

/// Reference to the original invoice, as reported in `CbtesAsoc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedDocument {
    pub doc_type_code: String,
    pub point_of_sale: u32,
    pub number: u64,
    /// CUIT of the issuing company.
    pub cuit: String,
    pub date: Option<NaiveDate>,
}

impl AssociatedDocument {
    /// Numeric AFIP code of the related document type.
    pub fn doc_type_number(&self) -> Option<u32> {
        self.doc_type_code.trim().parse().ok()
    }
}

impl ValueObject for AssociatedDocument {}

/// Find the invoice `document` corrects.
///
/// Uses the machine links first (`reversed_entry`, then `debit_origin`).
/// For credit/debit notes without such a link, falls back to invoices
/// sharing a sale-order line with the note: the first one that is
/// Argentine, of a different internal type, and authorized by AFIP.
pub fn found_related_invoice<'a, D>(
    document: &Document,
    directory: &'a D,
    lookup: RelatedLookup,
) -> Option<&'a Document>
where
    D: DocumentDirectory + ?Sized,
{
    let base = document
        .reversed_entry()
        .or(document.debit_origin())
        .and_then(|id| directory.document(id));
    if base.is_some() || !document.is_note() || !lookup.sale_integration {
        return base;
    }

    let own_type = document.internal_type();
    let mut seen = HashSet::new();
    let candidates = document
        .lines()
        .iter()
        .flat_map(|line| line.sale_lines.iter())
        .flat_map(|sale_line| directory.invoices_for_sale_line(*sale_line))
        .filter(|id| seen.insert(*id))
        .filter_map(|id| directory.document(id));

    for candidate in candidates {
        if is_original_candidate(candidate, own_type) {
            tracing::debug!(
                note = ?document.name(),
                original = ?candidate.name(),
                "related invoice resolved through sale order lines"
            );
            return Some(candidate);
        }
    }
    base
}

fn is_original_candidate(candidate: &Document, note_type: Option<InternalType>) -> bool {
    let Some(doc_type) = candidate.document_type() else {
        return false;
    };
    doc_type.is_argentine()
        && Some(doc_type.internal_type) != note_type
        && candidate.is_afip_authorized()
}

/// `CbtesAsoc` data of the related invoice, if one resolves.
///
/// A resolved invoice without document type or number cannot be reported
/// and is a validation error.
pub fn related_invoice_data<D>(
    document: &Document,
    directory: &D,
    lookup: RelatedLookup,
) -> DomainResult<Option<AssociatedDocument>>
where
    D: DocumentDirectory + ?Sized,
{
    let Some(related) = found_related_invoice(document, directory, lookup) else {
        return Ok(None);
    };
    let incomplete = |what: &str| {
        DomainError::validation(format!(
            "related invoice {} has no {what}",
            related.display_name()
        ))
    };
    let doc_type = related.document_type().ok_or_else(|| incomplete("document type"))?;
    let number = related.sequence_number().ok_or_else(|| incomplete("number"))?;
    Ok(Some(AssociatedDocument {
        doc_type_code: doc_type.code.clone(),
        point_of_sale: related.journal().point_of_sale,
        number,
        cuit: related.company().vat.clone(),
        date: related.invoice_date(),
    }))
}
