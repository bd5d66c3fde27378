//! CAE (authorization code) requests.

use tracing::{info, warn};

use afipedi_invoicing::{AfipResult, AuthMode, Document, WebService};

use crate::error::RequestError;
use crate::pipeline::{RequestPipeline, StageContext};
use crate::session::CaeResponse;
use crate::wsfe::wsfe_pipeline;
use crate::wsfex::wsfex_pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaeOutcome {
    Authorized { auth_code: String },
    /// AFIP answered without granting a CAE; `detail` is what it said.
    Rejected { detail: String },
}

impl CaeOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, CaeOutcome::Authorized { .. })
    }
}

fn pipeline_for(ws: WebService) -> Result<RequestPipeline, RequestError> {
    match ws {
        WebService::Wsfe => Ok(wsfe_pipeline()),
        WebService::Wsfex => Ok(wsfex_pipeline()),
        WebService::Wsbfe => Err(RequestError::Unsupported(ws)),
    }
}

/// Build the request for the session's web service, submit it and store
/// the answer on the document.
pub fn request_cae(
    document: &mut Document,
    ctx: &mut StageContext<'_>,
) -> Result<CaeOutcome, RequestError> {
    let ws = ctx.session.web_service();
    let payload = pipeline_for(ws)?.build(document, ctx)?;
    let response = ctx.session.send_cae_request(&payload)?;
    Ok(apply_response(document, ws, response))
}

fn apply_response(document: &mut Document, ws: WebService, response: CaeResponse) -> CaeOutcome {
    let authorized = matches!(response.result, AfipResult::Approved | AfipResult::Observed);
    match response.auth_code {
        Some(code) if authorized && !code.is_empty() => {
            document.record_authorization(response.result, AuthMode::Cae, code.clone(), response.auth_code_due);
            if !response.observations.is_empty() {
                document.post_message(format!(
                    "AFIP observations:\n{}",
                    response.observations.join("\n")
                ));
            }
            info!(document = ?document.name(), %ws, result = response.result.as_code(), "CAE obtained");
            CaeOutcome::Authorized { auth_code: code }
        }
        _ => {
            document.record_rejection();
            let mut detail: Vec<String> = response.errors;
            detail.extend(response.observations);
            let detail = if detail.is_empty() {
                format!("{ws} answered {} without an authorization code", response.result.as_code())
            } else {
                detail.join("\n")
            };
            warn!(document = ?document.name(), %ws, %detail, "CAE rejected");
            CaeOutcome::Rejected { detail }
        }
    }
}
