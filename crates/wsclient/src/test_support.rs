use chrono::NaiveDate;

use afipedi_core::{BoardingPermitId, CompanyId, DocumentId, JournalId, PartnerId};
use afipedi_invoicing::{
    AfipEnvironment, BoardingPermit, Company, Country, DocumentType, InternalType, Journal,
    JournalKind, MoveType, NewDocument, Partner, WebService,
};

pub fn company() -> Company {
    Company {
        id: CompanyId::new(),
        name: "Exportadora SA".to_string(),
        vat: "30500010912".to_string(),
        environment: AfipEnvironment::Production,
        has_certificate: true,
        has_private_key: true,
    }
}

pub fn journal(ws: WebService) -> Journal {
    Journal {
        id: JournalId::new(),
        name: format!("Ventas {ws}"),
        kind: JournalKind::Sale,
        is_pos: true,
        point_of_sale: 2,
        afip_ws: Some(ws),
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

pub fn new_document(
    company: &Company,
    name: &str,
    doc_type: DocumentType,
    ws: WebService,
) -> NewDocument {
    NewDocument {
        id: DocumentId::new(),
        name: Some(name.to_string()),
        move_type: MoveType::OutInvoice,
        partner: Partner {
            id: PartnerId::new(),
            name: "Importadora Oriental SRL".to_string(),
            vat: Some("55000002206".to_string()),
        },
        company: company.clone(),
        journal: journal(ws),
        document_type: Some(doc_type),
        sequence_number: Some(7),
        invoice_date: NaiveDate::from_ymd_opt(2024, 2, 10),
        amount_total_signed: 1_500_000,
        lines: Vec::new(),
        afip_concept: Some("1".to_string()),
        reversed_entry: None,
        debit_origin: None,
    }
}

pub fn permit(company: &Company, number: &str, afip_code: &str) -> BoardingPermit {
    BoardingPermit {
        id: BoardingPermitId::new(),
        company: company.id,
        number: number.to_string(),
        destination: Country {
            name: "Uruguay".to_string(),
            afip_code: Some(afip_code.to_string()),
        },
    }
}
