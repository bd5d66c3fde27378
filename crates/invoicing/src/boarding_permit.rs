use serde::{Deserialize, Serialize};

use afipedi_core::{BoardingPermitId, CompanyId, DomainError, DomainResult, Entity};

/// Destination country of exported goods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// Country code in AFIP's own table (e.g. `"208"` for Chile).
    pub afip_code: Option<String>,
}

/// Export clearance ("permiso de embarque") reported on export invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingPermit {
    pub id: BoardingPermitId,
    pub company: CompanyId,
    pub number: String,
    pub destination: Country,
}

impl BoardingPermit {
    /// AFIP destination code as sent in the export request.
    pub fn destination_code(&self) -> DomainResult<&str> {
        self.destination
            .afip_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "destination country {} of boarding permit {} has no AFIP code",
                    self.destination.name, self.number
                ))
            })
    }

    /// AFIP destination code as the numeric value the permit check expects.
    pub fn destination_code_number(&self) -> DomainResult<u32> {
        let code = self.destination_code()?;
        code.trim().parse().map_err(|_| {
            DomainError::validation(format!(
                "AFIP code {code:?} of {} is not numeric",
                self.destination.name
            ))
        })
    }
}

impl Entity for BoardingPermit {
    type Id = BoardingPermitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> String {
        self.number.clone()
    }
}
