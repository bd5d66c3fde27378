use thiserror::Error;

use afipedi_core::DomainError;
use afipedi_invoicing::WebService;

/// Failure talking to an AFIP web service.
#[derive(Debug, Error)]
pub enum WsError {
    #[error("could not connect to {ws}: {message}")]
    Connection { ws: WebService, message: String },

    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Failure building or submitting a request for a document.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Ws(#[from] WsError),

    /// Some linked boarding permits were rejected by the permit check.
    #[error("Invalid boarding permissions:\n {}", .0.join("\n"))]
    InvalidBoardingPermits(Vec<String>),

    #[error("requests for {0} are not supported")]
    Unsupported(WebService),

    /// The base request does not have the shape a stage expects.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}
