//! In-memory connector answering from a script.
//!
//! Used for tests and dry runs: CAE answers are consumed in order, permit
//! checks answer from a status table, and every request is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value as JsonValue;

use afipedi_core::CompanyId;
use afipedi_invoicing::{AfipResult, Company, WebService};

use crate::error::WsError;
use crate::session::{AfipSession, CaeResponse, Connector, PermitCheckResponse};

#[derive(Debug, Default)]
struct Script {
    cae_answers: VecDeque<Result<CaeResponse, String>>,
    permit_status: HashMap<String, String>,
    refuse_connections: bool,
    last_request_id: u64,
    sent_requests: Vec<JsonValue>,
    permit_checks: Vec<(String, u32)>,
    connections: Vec<(CompanyId, WebService)>,
}

/// Connector whose sessions share one script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

fn poisoned() -> WsError {
    WsError::Transport(anyhow::anyhow!("scripted connector lock poisoned"))
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> Option<MutexGuard<'_, Script>> {
        self.script.lock().ok()
    }

    /// Queue the answer of the next CAE request.
    pub fn push_cae_response(&self, response: CaeResponse) {
        if let Some(mut script) = self.script() {
            script.cae_answers.push_back(Ok(response));
        }
    }

    /// Queue an approval with `auth_code`.
    pub fn approve_next(&self, auth_code: &str) {
        self.push_cae_response(CaeResponse {
            result: AfipResult::Approved,
            auth_code: Some(auth_code.to_string()),
            auth_code_due: None,
            observations: Vec::new(),
            errors: Vec::new(),
        });
    }

    /// Queue a rejection carrying `errors`.
    pub fn reject_next(&self, errors: &[&str]) {
        self.push_cae_response(CaeResponse {
            result: AfipResult::Rejected,
            auth_code: None,
            auth_code_due: None,
            observations: Vec::new(),
            errors: errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    /// Queue a transport failure for the next CAE request.
    pub fn fail_next(&self, message: &str) {
        if let Some(mut script) = self.script() {
            script.cae_answers.push_back(Err(message.to_string()));
        }
    }

    /// Status returned by the permit check for `number` (unknown permits
    /// answer `"ERR"`).
    pub fn set_permit_status(&self, number: &str, status: &str) {
        if let Some(mut script) = self.script() {
            script
                .permit_status
                .insert(number.to_string(), status.to_string());
        }
    }

    pub fn refuse_connections(&self) {
        if let Some(mut script) = self.script() {
            script.refuse_connections = true;
        }
    }

    pub fn sent_requests(&self) -> Vec<JsonValue> {
        self.script()
            .map(|s| s.sent_requests.clone())
            .unwrap_or_default()
    }

    pub fn permit_checks(&self) -> Vec<(String, u32)> {
        self.script()
            .map(|s| s.permit_checks.clone())
            .unwrap_or_default()
    }

    pub fn connections(&self) -> Vec<(CompanyId, WebService)> {
        self.script()
            .map(|s| s.connections.clone())
            .unwrap_or_default()
    }

    /// Session on `ws` without going through [`Connector::connect`].
    pub fn session(&self, ws: WebService) -> ScriptedSession {
        ScriptedSession {
            ws,
            script: Arc::clone(&self.script),
        }
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, company: &Company, ws: WebService) -> Result<Box<dyn AfipSession>, WsError> {
        let mut script = self.script.lock().map_err(|_| poisoned())?;
        if script.refuse_connections {
            return Err(WsError::Connection {
                ws,
                message: format!("no credentials for {}", company.name),
            });
        }
        script.connections.push((company.id, ws));
        drop(script);
        Ok(Box::new(self.session(ws)))
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    ws: WebService,
    script: Arc<Mutex<Script>>,
}

impl AfipSession for ScriptedSession {
    fn web_service(&self) -> WebService {
        self.ws
    }

    fn next_request_id(&mut self) -> Result<u64, WsError> {
        let mut script = self.script.lock().map_err(|_| poisoned())?;
        script.last_request_id += 1;
        Ok(script.last_request_id)
    }

    fn send_cae_request(&mut self, payload: &JsonValue) -> Result<CaeResponse, WsError> {
        let mut script = self.script.lock().map_err(|_| poisoned())?;
        script.sent_requests.push(payload.clone());
        match script.cae_answers.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(WsError::Transport(anyhow::anyhow!(message))),
            None => Err(WsError::InvalidResponse(format!(
                "no scripted {} answer left",
                self.ws
            ))),
        }
    }

    fn check_permit(
        &mut self,
        permit_number: &str,
        destination_code: u32,
    ) -> Result<PermitCheckResponse, WsError> {
        let mut script = self.script.lock().map_err(|_| poisoned())?;
        script
            .permit_checks
            .push((permit_number.to_string(), destination_code));
        let status = script
            .permit_status
            .get(permit_number)
            .cloned()
            .unwrap_or_else(|| "ERR".to_string());
        Ok(PermitCheckResponse { status })
    }
}
