//! Export invoicing (`wsfex`) requests.

use serde_json::{Value as JsonValue, json};

use afipedi_invoicing::{Document, WebService};

use crate::error::RequestError;
use crate::permits::permit_entries;
use crate::pipeline::{BaseRequest, RequestPipeline, RequestStage, StageContext, amount, require};
use crate::webservice::format_ws_date;

/// "Facturas de Exportación" document type.
pub const EXPORT_INVOICE_CODE: u32 = 19;
/// "Exportación definitiva de bienes" concept.
pub const EXPORT_GOODS_CONCEPT: u32 = 1;

/// `wsfex` request with the boarding-permit stage.
pub fn wsfex_pipeline() -> RequestPipeline {
    RequestPipeline::new(WsfexBase).with_stage(BoardingPermits)
}

/// `FEXAuthorize` request body. Asks the session for the next request id.
pub struct WsfexBase;

impl BaseRequest for WsfexBase {
    fn build(
        &self,
        document: &Document,
        ctx: &mut StageContext<'_>,
    ) -> Result<JsonValue, RequestError> {
        let doc_type = require(document.document_type(), "document type", document)?;
        let cbte_tipo = require(doc_type.code_number(), "numeric document type code", document)?;
        let number = require(document.sequence_number(), "document number", document)?;
        let date = require(document.invoice_date(), "invoice date", document)?;
        let concept = require(document.afip_concept_number(), "AFIP concept", document)?;
        let last_id = ctx.session.next_request_id()?;

        let items: Vec<JsonValue> = document
            .lines()
            .iter()
            .map(|line| {
                json!({
                    "Pro_ds": line.description,
                    "Pro_qty": line.quantity,
                    "Pro_total_item": amount(line.price_subtotal),
                })
            })
            .collect();

        Ok(json!({
            "Id": last_id,
            "Cbte_Tipo": cbte_tipo,
            "Fecha_cbte": format_ws_date(WebService::Wsfex, date),
            "Punto_vta": document.journal().point_of_sale,
            "Cbte_nro": number,
            "Tipo_expo": concept,
            "Cliente": document.partner().name,
            "Id_impositivo": document.partner().vat.clone().unwrap_or_default(),
            "Moneda_Id": "PES",
            "Moneda_ctz": 1,
            "Imp_total": amount(document.amount_total_signed()),
            "Idioma_cbte": 1,
            "Items": { "Item": items },
        }))
    }
}

/// Sends the linked boarding permits with export invoices of goods.
pub struct BoardingPermits;

impl RequestStage for BoardingPermits {
    fn name(&self) -> &'static str {
        "boarding_permits"
    }

    fn applies(&self, document: &Document) -> bool {
        document.document_type().and_then(|t| t.code_number()) == Some(EXPORT_INVOICE_CODE)
            && document.afip_concept_number() == Some(EXPORT_GOODS_CONCEPT)
    }

    fn apply(
        &self,
        document: &mut Document,
        payload: &mut JsonValue,
        ctx: &mut StageContext<'_>,
    ) -> Result<(), RequestError> {
        let entries = permit_entries(document, ctx)?;
        let request = payload
            .as_object_mut()
            .ok_or_else(|| RequestError::MalformedRequest("wsfex request is not an object".to_string()))?;

        let existing = if entries.is_empty() { "N" } else { "S" };
        let permisos = if entries.is_empty() {
            JsonValue::Null
        } else {
            json!({ "Permiso": entries })
        };
        request.insert("Permisos".to_string(), permisos);
        request.insert("Permiso_existente".to_string(), json!(existing));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cae::request_cae;
    use crate::scripted::ScriptedConnector;
    use crate::test_support::{company, doc_type, new_document, permit};
    use afipedi_invoicing::{InMemoryDirectory, InternalType, RelatedLookup};

    struct Fixture {
        directory: InMemoryDirectory,
        connector: ScriptedConnector,
        document: Document,
    }

    fn export_invoice(concept: &str, permits: &[(&str, &str)]) -> Fixture {
        let company = company();
        let mut new = new_document(
            &company,
            "E 00002-00000011",
            doc_type("19", InternalType::Invoice),
            WebService::Wsfex,
        );
        new.afip_concept = Some(concept.to_string());
        let mut document = Document::new(new);

        let mut directory = InMemoryDirectory::new();
        let connector = ScriptedConnector::new();
        for (number, status) in permits {
            let permit = permit(&company, number, "225");
            document.link_boarding_permit(&permit).unwrap();
            directory.upsert_permit(permit);
            connector.set_permit_status(number, status);
        }
        Fixture {
            directory,
            connector,
            document,
        }
    }

    fn build(fx: &mut Fixture) -> Result<JsonValue, RequestError> {
        let mut session = fx.connector.session(WebService::Wsfex);
        let mut ctx = StageContext {
            directory: &fx.directory,
            session: &mut session,
            lookup: RelatedLookup::default(),
        };
        wsfex_pipeline().build(&mut fx.document, &mut ctx)
    }

    #[test]
    fn valid_permits_are_sent_with_existence_flag() {
        let mut fx = export_invoice("1", &[("24001EC01000001A", "OK"), ("24001EC01000002B", "OK")]);
        let payload = build(&mut fx).unwrap();

        assert_eq!(
            payload["Permisos"],
            json!({ "Permiso": [
                { "Id_permiso": "24001EC01000001A", "Dst_merc": "225" },
                { "Id_permiso": "24001EC01000002B", "Dst_merc": "225" },
            ]})
        );
        assert_eq!(payload["Permiso_existente"], json!("S"));
        assert_eq!(payload["Id"], json!(1));
        assert_eq!(fx.connector.permit_checks().len(), 2);
    }

    #[test]
    fn no_permits_sends_null_and_n() {
        let mut fx = export_invoice("1", &[]);
        let payload = build(&mut fx).unwrap();
        assert_eq!(payload["Permisos"], JsonValue::Null);
        assert_eq!(payload["Permiso_existente"], json!("N"));
    }

    #[test]
    fn other_concepts_skip_the_permit_stage() {
        let mut fx = export_invoice("2", &[("24001EC01000001A", "OK")]);
        let payload = build(&mut fx).unwrap();
        assert!(payload.get("Permisos").is_none());
        assert!(payload.get("Permiso_existente").is_none());
        assert!(fx.connector.permit_checks().is_empty());
    }

    #[test]
    fn invalid_permit_aborts_before_contacting_the_export_service() {
        let mut fx = export_invoice("1", &[("24001EC01000001A", "OK"), ("24001EC01000009Z", "ERR")]);
        let mut session = fx.connector.session(WebService::Wsfex);
        let mut ctx = StageContext {
            directory: &fx.directory,
            session: &mut session,
            lookup: RelatedLookup::default(),
        };
        let err = request_cae(&mut fx.document, &mut ctx).unwrap_err();

        match &err {
            RequestError::InvalidBoardingPermits(names) => {
                assert_eq!(names, &vec!["24001EC01000009Z".to_string()]);
            }
            other => panic!("expected InvalidBoardingPermits, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Invalid boarding permissions:\n 24001EC01000009Z"
        );
        assert!(fx.connector.sent_requests().is_empty());
    }
}
