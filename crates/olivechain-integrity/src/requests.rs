//! Typed create/update requests
//!
//! Each request is validated in one step that reports every problem at once
//! as `ContractError::Validation`. Nothing touches the store until
//! validation has passed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, FieldError, Result};
use crate::status::WasteStatus;

/// Harvest date format accepted on input
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_ID_LEN: usize = 128;

/// Input for `CreateWaste`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWaste {
    pub id: String,
    #[serde(rename = "type")]
    pub waste_type: String,
    pub quantity: f64,
    /// `YYYY-MM-DD`
    pub harvest_date: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl NewWaste {
    pub fn validate(&self) -> Result<NaiveDate> {
        let mut errors = Vec::new();
        validate_id("id", &self.id, &mut errors);
        require_text("type", &self.waste_type, &mut errors);
        validate_quantity(self.quantity, &mut errors);
        require_text("owner", &self.owner, &mut errors);

        let date = match NaiveDate::parse_from_str(self.harvest_date.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(FieldError::new(
                    "harvestDate",
                    "invalid date format (use YYYY-MM-DD)",
                ));
                None
            }
        };

        match date {
            Some(date) if errors.is_empty() => Ok(date),
            _ => Err(ContractError::Validation { details: errors }),
        }
    }
}

/// Input for `CreateExtraction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExtraction {
    pub id: String,
    pub waste_id: String,
    pub product_type: String,
    pub quantity: f64,
    pub quality: String,
    pub processor: String,
}

impl NewExtraction {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        validate_id("id", &self.id, &mut errors);
        validate_id("wasteId", &self.waste_id, &mut errors);
        require_text("productType", &self.product_type, &mut errors);
        validate_quantity(self.quantity, &mut errors);
        require_text("quality", &self.quality, &mut errors);
        require_text("processor", &self.processor, &mut errors);
        finish(errors)
    }
}

/// Input for `CreateRecycling`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecycling {
    pub id: String,
    pub waste_id: String,
    pub recycled_product: String,
    pub quantity: f64,
    pub method: String,
    pub recycler: String,
}

impl NewRecycling {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        validate_id("id", &self.id, &mut errors);
        validate_id("wasteId", &self.waste_id, &mut errors);
        require_text("recycledProduct", &self.recycled_product, &mut errors);
        validate_quantity(self.quantity, &mut errors);
        require_text("method", &self.method, &mut errors);
        require_text("recycler", &self.recycler, &mut errors);
        finish(errors)
    }
}

/// Input for `UpdateWasteStatus`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub id: String,
    pub new_status: String,
    pub actor: String,
    #[serde(default)]
    pub details: String,
}

impl StatusUpdate {
    pub fn new(
        id: impl Into<String>,
        status: WasteStatus,
        actor: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            new_status: status.to_string(),
            actor: actor.into(),
            details: details.into(),
        }
    }

    pub fn validate(&self) -> Result<WasteStatus> {
        let mut errors = Vec::new();
        validate_id("id", &self.id, &mut errors);
        require_text("actor", &self.actor, &mut errors);

        let status = match self.new_status.parse::<WasteStatus>() {
            Ok(status) => Some(status),
            Err(msg) => {
                errors.push(FieldError::new("newStatus", msg));
                None
            }
        };

        match status {
            Some(status) if errors.is_empty() => Ok(status),
            _ => Err(ContractError::Validation { details: errors }),
        }
    }
}

// =============================================================================
// Field rules
// =============================================================================

/// Ids must sort below the range sentinel `~`, so only a conservative
/// ASCII set is accepted.
pub fn validate_id(field: &str, id: &str, errors: &mut Vec<FieldError>) {
    if id.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
        return;
    }
    if id.len() > MAX_ID_LEN {
        errors.push(FieldError::new(
            field,
            format!("must be at most {} characters", MAX_ID_LEN),
        ));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
    {
        errors.push(FieldError::new(
            field,
            "may only contain letters, digits, '_', '-', '.' and ':'",
        ));
    }
}

fn require_text(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "is required"));
    }
}

fn validate_quantity(quantity: f64, errors: &mut Vec<FieldError>) {
    if !quantity.is_finite() || quantity <= 0.0 {
        errors.push(FieldError::new("quantity", "must be a positive number"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ContractError::Validation { details: errors })
    }
}
