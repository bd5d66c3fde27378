//! Request construction as a base builder followed by named stages.
//!
//! ```text
//! base request (per web service)
//!   ↓
//! stage 1: applies(document)? → apply(payload)
//!   ↓
//! stage N ...
//! ```
//!
//! Each stage states its own applicability predicate; stages run in
//! registration order and the first failing stage aborts the build.

use serde_json::Value as JsonValue;
use tracing::debug;

use afipedi_invoicing::{Document, DocumentDirectory, RelatedLookup};

use crate::error::RequestError;
use crate::session::AfipSession;

/// Everything a builder or stage may consult besides the document itself.
pub struct StageContext<'a> {
    pub directory: &'a dyn DocumentDirectory,
    pub session: &'a mut dyn AfipSession,
    pub lookup: RelatedLookup,
}

/// Builds the request a web service expects before any AR stage runs.
pub trait BaseRequest {
    fn build(
        &self,
        document: &Document,
        ctx: &mut StageContext<'_>,
    ) -> Result<JsonValue, RequestError>;
}

/// Named post-processing step over a built request.
pub trait RequestStage {
    fn name(&self) -> &'static str;

    fn applies(&self, document: &Document) -> bool;

    /// Mutates the request. May record activity on the document.
    fn apply(
        &self,
        document: &mut Document,
        payload: &mut JsonValue,
        ctx: &mut StageContext<'_>,
    ) -> Result<(), RequestError>;
}

pub struct RequestPipeline {
    base: Box<dyn BaseRequest>,
    stages: Vec<Box<dyn RequestStage>>,
}

impl RequestPipeline {
    pub fn new(base: impl BaseRequest + 'static) -> Self {
        Self {
            base: Box::new(base),
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn build(
        &self,
        document: &mut Document,
        ctx: &mut StageContext<'_>,
    ) -> Result<JsonValue, RequestError> {
        let mut payload = self.base.build(document, ctx)?;
        for stage in &self.stages {
            if !stage.applies(document) {
                continue;
            }
            debug!(stage = stage.name(), document = ?document.name(), "applying request stage");
            stage.apply(document, &mut payload, ctx)?;
        }
        Ok(payload)
    }
}

pub(crate) fn require<T>(value: Option<T>, what: &str, document: &Document) -> Result<T, RequestError> {
    value.ok_or_else(|| {
        RequestError::Domain(afipedi_core::DomainError::validation(format!(
            "{what} is required to report {} to AFIP",
            document.name().unwrap_or("the document")
        )))
    })
}

/// Unsigned amount in currency units, as AFIP expects it.
pub(crate) fn amount(cents: i64) -> JsonValue {
    JsonValue::from(cents.unsigned_abs() as f64 / 100.0)
}
