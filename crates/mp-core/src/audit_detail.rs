//! Typed audit detail payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    /// `manual` for direct child updates, `rollup` for aggregator writes.
    pub reason: Option<String>,
}

impl StatusChangedDetail {
    pub const REASON_MANUAL: &'static str = "manual";
    pub const REASON_ROLLUP: &'static str = "rollup";

    #[must_use]
    pub fn manual(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            reason: Some(Self::REASON_MANUAL.to_string()),
        }
    }

    #[must_use]
    pub fn rollup(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            reason: Some(Self::REASON_ROLLUP.to_string()),
        }
    }
}
