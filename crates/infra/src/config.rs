//! Settings read from the environment.

use afipedi_invoicing::RelatedLookup;

/// Process-wide settings of the AR e-invoicing flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdiSettings {
    /// Resolve original invoices of notes through sale-order lines
    /// (`AFIP_SALE_INTEGRATION`, default `true`).
    pub sale_integration: bool,
    /// Never commit between bills of a batch (`AFIP_SKIP_COMMIT`, default
    /// `false`).
    pub skip_commit: bool,
}

impl Default for EdiSettings {
    fn default() -> Self {
        Self {
            sale_integration: true,
            skip_commit: false,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<bool>()
        .unwrap_or(default)
}

impl EdiSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sale_integration: env_flag("AFIP_SALE_INTEGRATION", defaults.sale_integration),
            skip_commit: env_flag("AFIP_SKIP_COMMIT", defaults.skip_commit),
        }
    }

    pub fn lookup(&self) -> RelatedLookup {
        RelatedLookup {
            sale_integration: self.sale_integration,
        }
    }

    pub fn posting_context(&self) -> PostingContext {
        PostingContext {
            skip_commit: self.skip_commit,
        }
    }
}

/// Per-call options of a posting run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingContext {
    /// Leave commits to the caller (e.g. when the batch runs inside a
    /// larger unit of work).
    pub skip_commit: bool,
}
