//! Domestic electronic invoicing (`wsfe`) requests.

use serde_json::{Value as JsonValue, json};

use afipedi_invoicing::{Document, WebService, found_related_invoice, related_invoice_data};

use crate::error::RequestError;
use crate::pipeline::{BaseRequest, RequestPipeline, RequestStage, StageContext, amount, require};
use crate::webservice::format_ws_date;

/// Document type AFIP uses for a CUIT.
const DOC_TIPO_CUIT: u32 = 80;
/// "Sin identificar" document type.
const DOC_TIPO_OTHER: u32 = 99;

/// `wsfe` request with the associated-period stage.
pub fn wsfe_pipeline() -> RequestPipeline {
    RequestPipeline::new(WsfeBase).with_stage(AssociatedPeriod)
}

/// `FECAESolicitar` request body.
pub struct WsfeBase;

impl BaseRequest for WsfeBase {
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

        let (doc_tipo, doc_nro) = match document.partner().vat.as_deref() {
            Some(vat) if !vat.is_empty() => (DOC_TIPO_CUIT, vat.to_string()),
            _ => (DOC_TIPO_OTHER, "0".to_string()),
        };

        let mut detail = json!({
            "Concepto": concept,
            "DocTipo": doc_tipo,
            "DocNro": doc_nro,
            "CbteDesde": number,
            "CbteHasta": number,
            "CbteFch": format_ws_date(WebService::Wsfe, date),
            "ImpTotal": amount(document.amount_total_signed()),
            "ImpNeto": amount(document.lines().iter().map(|l| l.price_subtotal).sum()),
            "MonId": "PES",
            "MonCotiz": 1,
        });

        if let Some(related) = related_invoice_data(document, ctx.directory, ctx.lookup)? {
            let tipo = require(
                related.doc_type_number(),
                "numeric document type code of the related invoice",
                document,
            )?;
            let mut asoc = json!({
                "Tipo": tipo,
                "PtoVta": related.point_of_sale,
                "Nro": related.number,
                "Cuit": related.cuit,
            });
            if let Some(date) = related.date {
                asoc["CbteFch"] = json!(format_ws_date(WebService::Wsfe, date));
            }
            detail["CbtesAsoc"] = json!({ "CbteAsoc": [asoc] });
        }

        Ok(json!({
            "FeCabReq": {
                "CantReg": 1,
                "PtoVta": document.journal().point_of_sale,
                "CbteTipo": cbte_tipo,
            },
            "FeDetReq": [{ "FECAEDetRequest": detail }],
        }))
    }
}

/// Reports the associated period of credit/debit notes that have no related
/// invoice.
pub struct AssociatedPeriod;

impl RequestStage for AssociatedPeriod {
    fn name(&self) -> &'static str {
        "associated_period"
    }

    fn applies(&self, document: &Document) -> bool {
        document.is_note()
    }

    fn apply(
        &self,
        document: &mut Document,
        payload: &mut JsonValue,
        ctx: &mut StageContext<'_>,
    ) -> Result<(), RequestError> {
        if found_related_invoice(document, ctx.directory, ctx.lookup).is_some() {
            return Ok(());
        }
        let Some(period) = document.associated_period() else {
            return Ok(());
        };

        let detail = payload
            .get_mut("FeDetReq")
            .and_then(|d| d.get_mut(0))
            .and_then(|d| d.get_mut("FECAEDetRequest"))
            .and_then(JsonValue::as_object_mut)
            .ok_or_else(|| {
                RequestError::MalformedRequest("FeDetReq[0].FECAEDetRequest missing".to_string())
            })?;
        detail.insert(
            "PeriodoAsoc".to_string(),
            json!({
                "FchDesde": format_ws_date(WebService::Wsfe, period.start),
                "FchHasta": format_ws_date(WebService::Wsfe, period.end),
            }),
        );
        Ok(())
    }
}
