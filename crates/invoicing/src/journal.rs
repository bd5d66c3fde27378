use serde::{Deserialize, Serialize};

use afipedi_core::JournalId;

/// AFIP web-service family a point-of-sale journal submits through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebService {
    /// Domestic electronic invoicing.
    Wsfe,
    /// Export invoicing.
    Wsfex,
    /// Fiscal bonds invoicing.
    Wsbfe,
}

impl WebService {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebService::Wsfe => "wsfe",
            WebService::Wsfex => "wsfex",
            WebService::Wsbfe => "wsbfe",
        }
    }
}

impl core::fmt::Display for WebService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalKind {
    Sale,
    Purchase,
    General,
}

/// Accounting journal, possibly an AFIP point of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    pub name: String,
    pub kind: JournalKind,
    /// Whether the journal is an AFIP point of sale.
    pub is_pos: bool,
    pub point_of_sale: u32,
    pub afip_ws: Option<WebService>,
}

impl Journal {
    /// Purchase journal that submits vendor bills through a web service.
    pub fn is_electronic_purchase_pos(&self) -> bool {
        self.kind == JournalKind::Purchase && self.is_pos && self.afip_ws.is_some()
    }
}
