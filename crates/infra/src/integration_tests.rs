//! Integration tests for the full posting pipeline.
//!
//! Tests: Document → VendorBillPosting → RequestPipeline → AfipSession → TransactionBoundary
//!
//! Verifies:
//! - Notes without a related invoice report their associated period
//! - Notes linked through sale-order lines report the original invoice instead
//! - Settings drive the sale-order lookup and per-bill commits

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use afipedi_core::{CompanyId, DocumentId, JournalId, PartnerId, SaleLineId};
    use afipedi_invoicing::{
        AfipEnvironment, AfipResult, AuthMode, Company, Document, DocumentLine, DocumentType,
        InMemoryDirectory, InternalType, Journal, JournalKind, MoveType, NewDocument, Partner,
        WebService,
    };
    use afipedi_wsclient::ScriptedConnector;

    use crate::config::EdiSettings;
    use crate::posting::VendorBillPosting;
    use crate::transaction::InMemoryTransaction;

    fn company() -> Company {
        Company {
            id: CompanyId::new(),
            name: "Compradora SA".to_string(),
            vat: "30712345674".to_string(),
            environment: AfipEnvironment::Production,
            has_certificate: true,
            has_private_key: true,
        }
    }

    fn journal() -> Journal {
        Journal {
            id: JournalId::new(),
            name: "Compras POS".to_string(),
            kind: JournalKind::Purchase,
            is_pos: true,
            point_of_sale: 4,
            afip_ws: Some(WebService::Wsfe),
        }
    }

    fn document(
        company: &Company,
        name: &str,
        move_type: MoveType,
        code: &str,
        internal_type: InternalType,
        sale_line: SaleLineId,
    ) -> Document {
        Document::new(NewDocument {
            id: DocumentId::new(),
            name: Some(name.to_string()),
            move_type,
            partner: Partner {
                id: PartnerId::new(),
                name: "Proveedor Integral SRL".to_string(),
                vat: Some("30698765432".to_string()),
            },
            company: company.clone(),
            journal: journal(),
            document_type: Some(DocumentType {
                code: code.to_string(),
                name: format!("type {code}"),
                internal_type,
                country_code: "AR".to_string(),
            }),
            sequence_number: Some(12),
            invoice_date: NaiveDate::from_ymd_opt(2024, 2, 5),
            amount_total_signed: -50_000,
            lines: vec![DocumentLine {
                description: "Flete".to_string(),
                quantity: 1,
                price_subtotal: 50_000,
                sale_lines: vec![sale_line],
            }],
            afip_concept: Some("2".to_string()),
            reversed_entry: None,
            debit_origin: None,
        })
    }

    #[test]
    fn credit_note_without_original_sends_associated_period() {
        afipedi_observability::init_for_tests();
        let company = company();
        let mut note = document(
            &company,
            "NC-A 00004-00000012",
            MoveType::InRefund,
            "3",
            InternalType::CreditNote,
            SaleLineId::new(),
        );
        note.set_associated_period(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        )
        .unwrap();

        let directory = InMemoryDirectory::new();
        let connector = ScriptedConnector::new();
        connector.approve_next("74555555555555");
        let mut transaction = InMemoryTransaction::new();
        let settings = EdiSettings::default();

        let mut documents = vec![note];
        let report = VendorBillPosting::new(&connector, &mut transaction, &directory, settings.lookup())
            .post(&mut documents, settings.posting_context())
            .unwrap();

        assert_eq!(report.committed_count(), 1);
        let sent = connector.sent_requests();
        assert_eq!(
            sent[0]["FeDetReq"][0]["FECAEDetRequest"]["PeriodoAsoc"],
            json!({ "FchDesde": "20240101", "FchHasta": "20240131" })
        );
    }

    #[test]
    fn credit_note_linked_through_sale_line_sends_original_invoice() {
        afipedi_observability::init_for_tests();
        let company = company();
        let sale_line = SaleLineId::new();

        let mut original = document(
            &company,
            "FA-A 00004-00000011",
            MoveType::InInvoice,
            "1",
            InternalType::Invoice,
            sale_line,
        );
        original.record_authorization(AfipResult::Approved, AuthMode::Cae, "74444444444444", None);
        let mut directory = InMemoryDirectory::new();
        directory.upsert_document(original);

        let mut note = document(
            &company,
            "NC-A 00004-00000013",
            MoveType::InRefund,
            "3",
            InternalType::CreditNote,
            sale_line,
        );
        note.set_associated_period(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        )
        .unwrap();
        directory.upsert_document(note.clone());

        let connector = ScriptedConnector::new();
        connector.approve_next("74666666666666");
        let mut transaction = InMemoryTransaction::new();
        let settings = EdiSettings::default();

        let mut documents = vec![note];
        VendorBillPosting::new(&connector, &mut transaction, &directory, settings.lookup())
            .post(&mut documents, settings.posting_context())
            .unwrap();

        let detail = &connector.sent_requests()[0]["FeDetReq"][0]["FECAEDetRequest"];
        assert!(detail.get("PeriodoAsoc").is_none());
        assert_eq!(
            detail["CbtesAsoc"]["CbteAsoc"][0],
            json!({
                "Tipo": 1,
                "PtoVta": 4,
                "Nro": 12,
                "Cuit": "30712345674",
                "CbteFch": "20240205",
            })
        );
        assert_eq!(transaction.committed().unwrap()[0].afip_auth_code(), Some("74666666666666"));
    }

    #[test]
    fn without_sale_integration_the_period_is_sent_again() {
        let company = company();
        let sale_line = SaleLineId::new();
        let mut original = document(
            &company,
            "FA-A 00004-00000014",
            MoveType::InInvoice,
            "1",
            InternalType::Invoice,
            sale_line,
        );
        original.record_authorization(AfipResult::Approved, AuthMode::Cae, "74777777777777", None);
        let mut directory = InMemoryDirectory::new();
        directory.upsert_document(original);

        let mut note = document(
            &company,
            "NC-A 00004-00000015",
            MoveType::InRefund,
            "3",
            InternalType::CreditNote,
            sale_line,
        );
        note.set_associated_period(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        )
        .unwrap();

        let connector = ScriptedConnector::new();
        connector.approve_next("74888888888888");
        let mut transaction = InMemoryTransaction::new();
        let settings = EdiSettings {
            sale_integration: false,
            skip_commit: true,
        };

        let mut documents = vec![note];
        let report = VendorBillPosting::new(&connector, &mut transaction, &directory, settings.lookup())
            .post(&mut documents, settings.posting_context())
            .unwrap();

        assert_eq!(report.committed_count(), 0);
        let detail = &connector.sent_requests()[0]["FeDetReq"][0]["FECAEDetRequest"];
        assert!(detail.get("PeriodoAsoc").is_some());
        assert!(detail.get("CbtesAsoc").is_none());
    }
}
