//! Batch posting of electronic vendor bills.
//!
//! Vendor bills of point-of-sale purchase journals are submitted to AFIP one
//! by one, in input order:
//!
//! ```text
//! bill ─┬─ dummy mode ──→ validate locally → post ─────────────→ next bill
//!       └─ connect → post → request CAE ─┬─ authorized → commit → next bill
//!                                        └─ failed → stop, report
//! ```
//!
//! A CAE cannot be revoked once issued, so each authorized bill is committed
//! on its own instead of wrapping the batch in one transaction. When a bill
//! fails the batch stops and [`PostingError::BatchHalted`] carries a report of
//! what was validated and what was not. A failing bill is handed back in
//! the state it came in; a bill whose commit fails after AFIP authorized it
//! keeps its CAE and is reported as the failing step.
//!
//! Documents outside that subset are posted through the base path once every
//! bill validated.

mod report;

pub use report::{BatchReport, BatchStep, StepStatus};

use thiserror::Error;
use tracing::{error, info, warn};

use afipedi_core::{DomainError, Entity};
use afipedi_invoicing::{Document, DocumentDirectory, RelatedLookup, WebService};
use afipedi_wsclient::{CaeOutcome, Connector, StageContext, request_cae};

use crate::config::PostingContext;
use crate::transaction::TransactionBoundary;

#[derive(Debug, Error)]
pub enum PostingError {
    /// A vendor bill failed; earlier authorized bills stay committed.
    #[error("{message}")]
    BatchHalted {
        message: String,
        report: BatchReport,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Posting saga over a set of documents.
pub struct VendorBillPosting<'a, C, T> {
    connector: &'a C,
    transaction: &'a mut T,
    directory: &'a dyn DocumentDirectory,
    lookup: RelatedLookup,
}

impl<'a, C, T> VendorBillPosting<'a, C, T>
where
    C: Connector,
    T: TransactionBoundary,
{
    pub fn new(
        connector: &'a C,
        transaction: &'a mut T,
        directory: &'a dyn DocumentDirectory,
        lookup: RelatedLookup,
    ) -> Self {
        Self {
            connector,
            transaction,
            directory,
            lookup,
        }
    }

    /// Vendor bills submitted through a web service, with that service.
    fn electronic_bills(documents: &[Document]) -> Vec<(usize, WebService)> {
        documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.journal().is_electronic_purchase_pos())
            .filter_map(|(idx, doc)| doc.journal().afip_ws.map(|ws| (idx, ws)))
            .collect()
    }

    /// Post `documents`, validating electronic vendor bills with AFIP first.
    pub fn post(
        &mut self,
        documents: &mut [Document],
        ctx: PostingContext,
    ) -> Result<BatchReport, PostingError> {
        let bills = Self::electronic_bills(documents);
        let mut report = BatchReport::new(documents);

        for (idx, ws) in &bills {
            let idx = *idx;
            let bill = &mut documents[idx];
            // A failing bill goes back to the state it was handed in, so the
            // same batch can be retried once the cause is fixed.
            let snapshot = bill.clone();

            if bill.company().uses_dummy_validation() {
                bill.dummy_afip_validation();
                if let Err(err) = bill.post() {
                    *bill = snapshot;
                    report.fail(idx, err.to_string());
                    return Err(Self::halt(report));
                }
                info!(bill = %bill.display_name(), "vendor bill validated locally");
                report.validate(idx, false, true);
                continue;
            }

            let auth_code = match self.submit(bill, *ws) {
                Ok(auth_code) => auth_code,
                Err(detail) => {
                    *bill = snapshot;
                    warn!(bill = %bill.display_name(), %ws, %detail, "vendor bill validation failed, stopping batch");
                    report.fail(idx, detail);
                    return Err(Self::halt(report));
                }
            };

            let committed = !ctx.skip_commit;
            if committed {
                if let Err(err) = self.transaction.commit(bill) {
                    // The CAE is already issued: keep it on the bill and say so.
                    error!(bill = %bill.display_name(), %ws, %auth_code, %err, "authorized vendor bill could not be committed");
                    report.fail(
                        idx,
                        format!("{err}
AFIP already authorized it with CAE {auth_code}"),
                    );
                    return Err(Self::halt(report));
                }
            }
            info!(bill = %bill.display_name(), %ws, committed, "vendor bill validated in AFIP");
            report.validate(idx, committed, false);
        }

        for (idx, doc) in documents.iter_mut().enumerate() {
            if bills.iter().any(|(bill_idx, _)| *bill_idx == idx) {
                continue;
            }
            doc.post()?;
            report.post_locally(idx);
        }
        Ok(report)
    }

    /// Connect, post and ask for a CAE. `Ok` carries the CAE, `Err` what
    /// AFIP (or the transport) answered.
    fn submit(&self, bill: &mut Document, ws: WebService) -> Result<String, String> {
        let mut session = self
            .connector
            .connect(bill.company(), ws)
            .map_err(|e| e.to_string())?;
        bill.post().map_err(|e| e.to_string())?;

        let mut stage_ctx = StageContext {
            directory: self.directory,
            session: session.as_mut(),
            lookup: self.lookup,
        };
        match request_cae(bill, &mut stage_ctx) {
            Ok(CaeOutcome::Authorized { auth_code }) => Ok(auth_code),
            Ok(CaeOutcome::Rejected { detail }) => Err(detail),
            Err(err) => Err(err.to_string()),
        }
    }

    fn halt(report: BatchReport) -> PostingError {
        let message = report.failure_message().unwrap_or_default();
        PostingError::BatchHalted { message, report }
    }
}
