use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use afipedi_core::{
    BoardingPermitId, CompanyId, DocumentId, DomainError, DomainResult, Entity, PartnerId,
    SaleLineId,
};

use crate::boarding_permit::BoardingPermit;
use crate::extension::{ArEdiExtension, AssociatedPeriod};
use crate::journal::Journal;

/// Authorization code written on documents validated locally (testing
/// environment without certificate).
pub const DUMMY_AUTH_CODE: &str = "68448767638166";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    Entry,
    OutInvoice,
    OutRefund,
    InInvoice,
    InRefund,
}

impl MoveType {
    pub fn is_purchase_document(&self) -> bool {
        matches!(self, MoveType::InInvoice | MoveType::InRefund)
    }
}

/// Document status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Draft,
    Posted,
    Cancel,
}

/// Internal classification of a LATAM document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalType {
    Invoice,
    CreditNote,
    DebitNote,
    Other,
}

impl InternalType {
    pub fn is_note(&self) -> bool {
        matches!(self, InternalType::CreditNote | InternalType::DebitNote)
    }
}

/// LATAM document type (e.g. code `"19"`, "Facturas de Exportación").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    pub code: String,
    pub name: String,
    pub internal_type: InternalType,
    /// ISO country code of the tax authority defining the type.
    pub country_code: String,
}

impl DocumentType {
    /// Numeric AFIP code, if the code is numeric.
    pub fn code_number(&self) -> Option<u32> {
        self.code.trim().parse().ok()
    }

    pub fn is_argentine(&self) -> bool {
        self.country_code == "AR"
    }
}

/// Result returned by AFIP for a submitted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfipResult {
    #[serde(rename = "A")]
    Approved,
    #[serde(rename = "O")]
    Observed,
    #[serde(rename = "R")]
    Rejected,
}

impl AfipResult {
    pub fn as_code(&self) -> &'static str {
        match self {
            AfipResult::Approved => "A",
            AfipResult::Observed => "O",
            AfipResult::Rejected => "R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthMode {
    Cae,
    Caea,
    Cai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfipEnvironment {
    Production,
    Testing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// CUIT of the company.
    pub vat: String,
    pub environment: AfipEnvironment,
    pub has_certificate: bool,
    pub has_private_key: bool,
}

impl Company {
    /// Testing companies without credentials validate documents locally.
    pub fn uses_dummy_validation(&self) -> bool {
        self.environment == AfipEnvironment::Testing
            && !(self.has_certificate && self.has_private_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub vat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: i64,
    /// Subtotal in smallest currency unit (cents).
    pub price_subtotal: i64,
    /// Sale-order lines this line invoices.
    pub sale_lines: Vec<SaleLineId>,
}

/// Entry of the document's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMessage {
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

/// Input for creating a draft document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: DocumentId,
    pub name: Option<String>,
    pub move_type: MoveType,
    pub partner: Partner,
    pub company: Company,
    pub journal: Journal,
    pub document_type: Option<DocumentType>,
    pub sequence_number: Option<u64>,
    pub invoice_date: Option<NaiveDate>,
    /// Signed total in smallest currency unit (negative for vendor bills).
    pub amount_total_signed: i64,
    pub lines: Vec<DocumentLine>,
    pub afip_concept: Option<String>,
    pub reversed_entry: Option<DocumentId>,
    pub debit_origin: Option<DocumentId>,
}

/// Accounting document: invoice, credit/debit note or vendor bill.
///
/// The Argentine-specific fields live in [`ArEdiExtension`], composed
/// alongside the base record and only editable while the document is draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    name: Option<String>,
    move_type: MoveType,
    state: DocumentState,
    partner: Partner,
    company: Company,
    journal: Journal,
    document_type: Option<DocumentType>,
    sequence_number: Option<u64>,
    invoice_date: Option<NaiveDate>,
    amount_total_signed: i64,
    lines: Vec<DocumentLine>,
    afip_concept: Option<String>,
    afip_result: Option<AfipResult>,
    afip_auth_mode: Option<AuthMode>,
    afip_auth_code: Option<String>,
    afip_auth_code_due: Option<NaiveDate>,
    reversed_entry: Option<DocumentId>,
    debit_origin: Option<DocumentId>,
    ar_edi: ArEdiExtension,
    messages: Vec<ActivityMessage>,
}

impl Document {
    pub fn new(new: NewDocument) -> Self {
        Self {
            id: new.id,
            name: new.name,
            move_type: new.move_type,
            state: DocumentState::Draft,
            partner: new.partner,
            company: new.company,
            journal: new.journal,
            document_type: new.document_type,
            sequence_number: new.sequence_number,
            invoice_date: new.invoice_date,
            amount_total_signed: new.amount_total_signed,
            lines: new.lines,
            afip_concept: new.afip_concept,
            afip_result: None,
            afip_auth_mode: None,
            afip_auth_code: None,
            afip_auth_code_due: None,
            reversed_entry: new.reversed_entry,
            debit_origin: new.debit_origin,
            ar_edi: ArEdiExtension::default(),
            messages: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn partner(&self) -> &Partner {
        &self.partner
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn document_type(&self) -> Option<&DocumentType> {
        self.document_type.as_ref()
    }

    pub fn sequence_number(&self) -> Option<u64> {
        self.sequence_number
    }

    pub fn invoice_date(&self) -> Option<NaiveDate> {
        self.invoice_date
    }

    pub fn amount_total_signed(&self) -> i64 {
        self.amount_total_signed
    }

    pub fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    pub fn afip_concept(&self) -> Option<&str> {
        self.afip_concept.as_deref()
    }

    /// Numeric AFIP concept, if set and numeric.
    pub fn afip_concept_number(&self) -> Option<u32> {
        self.afip_concept.as_deref().and_then(|c| c.trim().parse().ok())
    }

    pub fn afip_result(&self) -> Option<AfipResult> {
        self.afip_result
    }

    pub fn afip_auth_mode(&self) -> Option<AuthMode> {
        self.afip_auth_mode
    }

    pub fn afip_auth_code(&self) -> Option<&str> {
        self.afip_auth_code.as_deref()
    }

    pub fn afip_auth_code_due(&self) -> Option<NaiveDate> {
        self.afip_auth_code_due
    }

    pub fn reversed_entry(&self) -> Option<DocumentId> {
        self.reversed_entry
    }

    pub fn debit_origin(&self) -> Option<DocumentId> {
        self.debit_origin
    }

    pub fn ar_edi(&self) -> &ArEdiExtension {
        &self.ar_edi
    }

    pub fn messages(&self) -> &[ActivityMessage] {
        &self.messages
    }

    pub fn internal_type(&self) -> Option<InternalType> {
        self.document_type.as_ref().map(|t| t.internal_type)
    }

    /// Credit or debit note according to its document type.
    pub fn is_note(&self) -> bool {
        self.internal_type().is_some_and(|t| t.is_note())
    }

    /// Authorized (or observed) by AFIP and carrying an auth code.
    pub fn is_afip_authorized(&self) -> bool {
        matches!(
            self.afip_result,
            Some(AfipResult::Approved) | Some(AfipResult::Observed)
        ) && self.afip_auth_code.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Total formatted as a decimal amount, e.g. `-1210.50`.
    pub fn amount_display(&self) -> String {
        format_amount(self.amount_total_signed)
    }

    fn ensure_draft(&self, what: &str) -> DomainResult<()> {
        if self.state != DocumentState::Draft {
            return Err(DomainError::conflict(format!(
                "{what} can only be changed on draft documents"
            )));
        }
        Ok(())
    }

    /// Set or clear the associated period reported by credit/debit notes
    /// that have no related invoice.
    pub fn set_associated_period(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DomainResult<()> {
        self.ensure_draft("associated period")?;
        self.ar_edi.associated_period_start = start;
        self.ar_edi.associated_period_end = end;
        Ok(())
    }

    pub fn associated_period(&self) -> Option<AssociatedPeriod> {
        self.ar_edi.associated_period()
    }

    /// Link a boarding permit. Permits must belong to the document's company.
    pub fn link_boarding_permit(&mut self, permit: &BoardingPermit) -> DomainResult<()> {
        self.ensure_draft("boarding permits")?;
        if permit.company != self.company.id {
            return Err(DomainError::validation(format!(
                "boarding permit {} belongs to another company",
                permit.number
            )));
        }
        if !self.ar_edi.boarding_permits.contains(&permit.id) {
            self.ar_edi.boarding_permits.push(permit.id);
        }
        Ok(())
    }

    pub fn unlink_boarding_permit(&mut self, permit_id: BoardingPermitId) -> DomainResult<()> {
        self.ensure_draft("boarding permits")?;
        self.ar_edi.boarding_permits.retain(|id| *id != permit_id);
        Ok(())
    }

    /// Base posting path: draft → posted.
    pub fn post(&mut self) -> DomainResult<()> {
        if self.state != DocumentState::Draft {
            return Err(DomainError::conflict(format!(
                "{} is not a draft document",
                self.display_name()
            )));
        }
        if self.name.as_deref().is_none_or(str::is_empty) {
            return Err(DomainError::validation(
                "a document number is required to post",
            ));
        }
        self.state = DocumentState::Posted;
        tracing::debug!(document = %self.display_name(), "document posted");
        Ok(())
    }

    /// Store the authorization returned by AFIP.
    pub fn record_authorization(
        &mut self,
        result: AfipResult,
        mode: AuthMode,
        code: impl Into<String>,
        due: Option<NaiveDate>,
    ) {
        self.afip_result = Some(result);
        self.afip_auth_mode = Some(mode);
        self.afip_auth_code = Some(code.into());
        self.afip_auth_code_due = due;
    }

    /// Store a rejection returned by AFIP (no auth code is issued).
    pub fn record_rejection(&mut self) {
        self.afip_result = Some(AfipResult::Rejected);
    }

    /// Validate locally with placeholder authorization data, skipping AFIP.
    pub fn dummy_afip_validation(&mut self) {
        self.afip_auth_mode = Some(AuthMode::Cae);
        self.afip_auth_code = Some(DUMMY_AUTH_CODE.to_string());
        self.afip_auth_code_due = self.invoice_date;
        self.afip_result = None;
        self.post_message(
            "Invoice validated locally because it is in a testing environment without testing certificate/keys",
        );
    }

    /// Append a message to the activity log.
    pub fn post_message(&mut self, body: impl Into<String>) {
        self.messages.push(ActivityMessage {
            body: body.into(),
            posted_at: Utc::now(),
        });
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => match self.move_type {
                MoveType::InInvoice => "Draft Bill".to_string(),
                MoveType::InRefund => "Draft Vendor Credit Note".to_string(),
                MoveType::OutRefund => "Draft Credit Note".to_string(),
                MoveType::OutInvoice => "Draft Invoice".to_string(),
                MoveType::Entry => "Draft Entry".to_string(),
            },
        }
    }
}

fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::journal::{JournalKind, WebService};
    use afipedi_core::JournalId;

    pub fn company() -> Company {
        Company {
            id: CompanyId::new(),
            name: "Responsable Inscripto".to_string(),
            vat: "30111111118".to_string(),
            environment: AfipEnvironment::Production,
            has_certificate: true,
            has_private_key: true,
        }
    }

    pub fn sale_journal() -> Journal {
        Journal {
            id: JournalId::new(),
            name: "Ventas".to_string(),
            kind: JournalKind::Sale,
            is_pos: true,
            point_of_sale: 1,
            afip_ws: Some(WebService::Wsfe),
        }
    }

    pub fn doc_type(code: &str, internal_type: InternalType) -> DocumentType {
        DocumentType {
            code: code.to_string(),
            name: format!("type {code}"),
            internal_type,
            country_code: "AR".to_string(),
        }
    }

    pub fn draft(company: &Company, name: &str, doc_type: DocumentType) -> Document {
        Document::new(new_document(company, name, doc_type))
    }

    pub fn new_document(company: &Company, name: &str, doc_type: DocumentType) -> NewDocument {
        NewDocument {
            id: DocumentId::new(),
            name: Some(name.to_string()),
            move_type: MoveType::OutInvoice,
            partner: Partner {
                id: PartnerId::new(),
                name: "ADHOC SA".to_string(),
                vat: Some("30714295698".to_string()),
            },
            company: company.clone(),
            journal: sale_journal(),
            document_type: Some(doc_type),
            sequence_number: Some(1),
            invoice_date: NaiveDate::from_ymd_opt(2024, 2, 15),
            amount_total_signed: 121_000,
            lines: Vec::new(),
            afip_concept: Some("1".to_string()),
            reversed_entry: None,
            debit_origin: None,
        }
    }
}
