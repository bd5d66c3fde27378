//! Seams to the remote AFIP services.
//!
//! A [`Connector`] opens an authenticated [`AfipSession`] (client, auth
//! ticket and transport) for one company and one web-service family.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use afipedi_invoicing::{AfipResult, Company, WebService};

use crate::error::WsError;

/// Answer of a CAE request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaeResponse {
    pub result: AfipResult,
    pub auth_code: Option<String>,
    pub auth_code_due: Option<NaiveDate>,
    #[serde(default)]
    pub observations: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Answer of `FEXCheck_Permiso` (`FEXResultGet`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitCheckResponse {
    #[serde(rename = "Status")]
    pub status: String,
}

impl PermitCheckResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Authenticated session with one AFIP web service.
pub trait AfipSession {
    fn web_service(&self) -> WebService;

    /// Next free request id (export service only uses it).
    fn next_request_id(&mut self) -> Result<u64, WsError>;

    /// Submit a CAE request payload.
    fn send_cae_request(&mut self, payload: &JsonValue) -> Result<CaeResponse, WsError>;

    /// Check a boarding permit against the customs database.
    fn check_permit(
        &mut self,
        permit_number: &str,
        destination_code: u32,
    ) -> Result<PermitCheckResponse, WsError>;
}

/// Factory of sessions scoped to a company and web service.
pub trait Connector {
    fn connect(&self, company: &Company, ws: WebService) -> Result<Box<dyn AfipSession>, WsError>;
}
