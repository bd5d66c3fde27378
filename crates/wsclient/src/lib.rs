//! AFIP web-service request construction and remote checks.
//!
//! The SOAP transport itself is out of scope: remote calls go through the
//! [`Connector`] / [`AfipSession`] traits. This crate builds the request
//! payloads (`serde_json::Value` mirrors of the SOAP dictionaries), applies
//! the Argentine post-processing stages and validates boarding permits.

pub mod cae;
pub mod error;
pub mod permits;
pub mod pipeline;
pub mod scripted;
pub mod session;
pub mod webservice;
pub mod wsfe;
pub mod wsfex;

#[cfg(test)]
pub(crate) mod test_support;

pub use cae::{CaeOutcome, request_cae};
pub use error::{RequestError, WsError};
pub use permits::{PermitEntry, check_valid_boarding_permission, permit_entries};
pub use pipeline::{BaseRequest, RequestPipeline, RequestStage, StageContext};
pub use scripted::{ScriptedConnector, ScriptedSession};
pub use session::{AfipSession, CaeResponse, Connector, PermitCheckResponse};
pub use webservice::{date_format, format_ws_date};
