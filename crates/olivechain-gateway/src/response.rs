//! Service response envelope
//!
//! Every client operation returns
//! `{success, data, count?, source, warning?, timestamp}` where `source`
//! names the store that actually served the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backing store served a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The ledger answered
    Ledger,
    /// The ledger was initialized but failed; the local mirror answered
    Fallback,
    /// The ledger was not initialized or had no data; the local mirror answered
    Temporary,
    /// Assembled client-side from mirror records
    Constructed,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ledger => "ledger",
            Self::Fallback => "fallback",
            Self::Temporary => "temporary",
            Self::Constructed => "constructed",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub source: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T, source: Provenance) -> Self {
        Self {
            success: true,
            data,
            count: None,
            source,
            warning: None,
            timestamp: Utc::now(),
        }
    }

    /// Append a warning, keeping any already present
    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        let warning = warning.into();
        self.warning = Some(match self.warning.take() {
            Some(existing) => format!("{}; {}", existing, warning),
            None => warning,
        });
        self
    }

    pub fn warn_opt(self, warning: Option<String>) -> Self {
        match warning {
            Some(w) => self.warn(w),
            None => self,
        }
    }
}

impl<T> ServiceResponse<Vec<T>> {
    /// Fill in `count` from the current data
    pub fn counted(mut self) -> Self {
        self.count = Some(self.data.len());
        self
    }
}
