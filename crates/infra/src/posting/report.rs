use serde::{Deserialize, Serialize};

use afipedi_core::{DocumentId, Entity};
use afipedi_invoicing::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// Not reached (batch stopped earlier, or not started yet).
    NotAttempted,
    /// Validated with AFIP, or locally in dummy mode.
    Validated { committed: bool, dummy: bool },
    /// Posted through the base path (not an electronic vendor bill).
    PostedLocally,
    Failed { detail: String },
}

/// One input document of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStep {
    pub document: DocumentId,
    pub display_name: String,
    pub partner: String,
    pub amount: String,
    pub status: StepStatus,
}

/// Outcome of a posting run, one step per input document in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    steps: Vec<BatchStep>,
}

impl BatchReport {
    pub(crate) fn new(documents: &[Document]) -> Self {
        let steps = documents
            .iter()
            .map(|doc| BatchStep {
                document: doc.id_typed(),
                display_name: doc.display_name(),
                partner: doc.partner().name.clone(),
                amount: doc.amount_display(),
                status: StepStatus::NotAttempted,
            })
            .collect();
        Self { steps }
    }

    fn set(&mut self, idx: usize, status: StepStatus) {
        if let Some(step) = self.steps.get_mut(idx) {
            step.status = status;
        }
    }

    pub(crate) fn validate(&mut self, idx: usize, committed: bool, dummy: bool) {
        self.set(idx, StepStatus::Validated { committed, dummy });
    }

    pub(crate) fn post_locally(&mut self, idx: usize) {
        self.set(idx, StepStatus::PostedLocally);
    }

    pub(crate) fn fail(&mut self, idx: usize, detail: String) {
        self.set(idx, StepStatus::Failed { detail });
    }

    pub fn steps(&self) -> &[BatchStep] {
        &self.steps
    }

    pub fn validated(&self) -> impl Iterator<Item = &BatchStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Validated { .. }))
    }

    pub fn failed(&self) -> Option<&BatchStep> {
        self.steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::Failed { .. }))
    }

    /// Documents neither validated nor failed (includes documents outside
    /// the electronic subset that were never posted).
    pub fn not_validated(&self) -> impl Iterator<Item = &BatchStep> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::NotAttempted)
    }

    pub fn committed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Validated { committed: true, .. }))
            .count()
    }

    /// User-facing message for a halted batch, `None` if nothing failed.
    pub fn failure_message(&self) -> Option<String> {
        let failed = self.failed()?;
        let StepStatus::Failed { detail } = &failed.status else {
            return None;
        };

        let msg = format!(
            "We could not validate the vendor bill in AFIP \"{}\" {}. This is what we get:\n{}\n\nPlease make the required corrections and try again",
            failed.partner, failed.display_name, detail
        );

        let validated: Vec<&str> = self.validated().map(|s| s.display_name.as_str()).collect();
        if validated.is_empty() {
            return Some(msg);
        }

        let pending: Vec<String> = self
            .not_validated()
            .map(|s| format!("   * {}: \"{}\" amount {}", s.display_name, s.partner, s.amount))
            .collect();
        Some(format!(
            "Some vendor bills where validated in AFIP but as we have an error with one vendor bill the batch validation was stopped\n\
             \n* These vendor bills were validated:\n   * {}\n\
             \n* These vendor bills weren't validated:\n{}\n\n\n\n{}",
            validated.join("\n   * "),
            pending.join("\n"),
            msg
        ))
    }
}
