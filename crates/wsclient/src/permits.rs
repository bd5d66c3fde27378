//! Boarding permit ("permiso de embarque") validation.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use afipedi_core::{Entity, ValueObject};
use afipedi_invoicing::{BoardingPermit, Document};

use crate::error::RequestError;
use crate::pipeline::StageContext;
use crate::session::AfipSession;

/// Permit as reported in the export request (`ArrayOfPermiso`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitEntry {
    #[serde(rename = "Id_permiso")]
    pub id_permiso: String,
    #[serde(rename = "Dst_merc")]
    pub dst_merc: String,
}

impl ValueObject for PermitEntry {}

/// Check every permit with `FEXCheck_Permiso` and record the outcome on the
/// document's activity log.
///
/// Returns the display names of the permits AFIP did not accept.
pub fn check_valid_boarding_permission(
    document: &mut Document,
    permits: &[BoardingPermit],
    session: &mut dyn AfipSession,
) -> Result<Vec<String>, RequestError> {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for permit in permits {
        let destination = permit.destination_code_number()?;
        let response = session.check_permit(&permit.number, destination)?;
        if response.is_ok() {
            valid.push(permit.display_name());
        } else {
            warn!(permit = %permit.number, status = %response.status, "boarding permit rejected");
            invalid.push(permit.display_name());
        }
    }

    document.post_message(format!(
        "Valid boarding permissions: {}. Invalid boarding permissions: {}",
        valid.join(", "),
        invalid.join(", ")
    ));
    info!(
        document = ?document.name(),
        valid = valid.len(),
        invalid = invalid.len(),
        "boarding permits checked"
    );
    Ok(invalid)
}

/// Validated permit entries for the export request.
///
/// Fails with [`RequestError::InvalidBoardingPermits`] before anything is
/// sent if any linked permit is invalid.
pub fn permit_entries(
    document: &mut Document,
    ctx: &mut StageContext<'_>,
) -> Result<Vec<PermitEntry>, RequestError> {
    let permits = ctx.directory.linked_permits(document)?;
    let invalid = check_valid_boarding_permission(document, &permits, &mut *ctx.session)?;
    if !invalid.is_empty() {
        return Err(RequestError::InvalidBoardingPermits(invalid));
    }
    permits
        .iter()
        .map(|permit| -> Result<PermitEntry, RequestError> {
            Ok(PermitEntry {
                id_permiso: permit.number.clone(),
                dst_merc: permit.destination_code()?.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedConnector;
    use crate::test_support::{company, doc_type, new_document, permit};
    use afipedi_invoicing::{InternalType, WebService};

    #[test]
    fn returns_invalid_names_and_logs_summary() {
        let company = company();
        let mut document = Document::new(new_document(
            &company,
            "E 00002-00000012",
            doc_type("19", InternalType::Invoice),
            WebService::Wsfex,
        ));
        let good = permit(&company, "24001EC01000001A", "203");
        let bad = permit(&company, "24001EC01000002B", "225");

        let connector = ScriptedConnector::new();
        connector.set_permit_status("24001EC01000001A", "OK");
        connector.set_permit_status("24001EC01000002B", "ERR");
        let mut session = connector.session(WebService::Wsfex);

        let invalid =
            check_valid_boarding_permission(&mut document, &[good, bad], &mut session).unwrap();
        assert_eq!(invalid, vec!["24001EC01000002B".to_string()]);
        assert_eq!(
            connector.permit_checks(),
            vec![
                ("24001EC01000001A".to_string(), 203),
                ("24001EC01000002B".to_string(), 225),
            ]
        );
        assert_eq!(
            document.messages().last().unwrap().body,
            "Valid boarding permissions: 24001EC01000001A. Invalid boarding permissions: 24001EC01000002B"
        );
    }

    #[test]
    fn destination_without_numeric_code_fails_before_calling_afip() {
        let company = company();
        let mut document = Document::new(new_document(
            &company,
            "E 00002-00000013",
            doc_type("19", InternalType::Invoice),
            WebService::Wsfex,
        ));
        let odd = permit(&company, "24001EC01000003C", "UY");
        let connector = ScriptedConnector::new();
        let mut session = connector.session(WebService::Wsfex);

        let err = check_valid_boarding_permission(&mut document, &[odd], &mut session).unwrap_err();
        assert!(matches!(err, RequestError::Domain(_)));
        assert!(connector.permit_checks().is_empty());
        assert!(document.messages().is_empty());
    }
}
