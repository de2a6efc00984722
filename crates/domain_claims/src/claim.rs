//! Claim record

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimantId, ProviderId};

use crate::error::ClaimError;

/// Category of the claimed loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimCategory {
    AutoCollision,
    AutoTheft,
    RentalVehicle,
    PropertyDamage,
    Theft,
    Medical,
    Liability,
    Other,
}

impl ClaimCategory {
    /// Stable lowercase name, used as the configuration key for ceilings
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimCategory::AutoCollision => "auto_collision",
            ClaimCategory::AutoTheft => "auto_theft",
            ClaimCategory::RentalVehicle => "rental_vehicle",
            ClaimCategory::PropertyDamage => "property_damage",
            ClaimCategory::Theft => "theft",
            ClaimCategory::Medical => "medical",
            ClaimCategory::Liability => "liability",
            ClaimCategory::Other => "other",
        }
    }

    pub const ALL: [ClaimCategory; 8] = [
        ClaimCategory::AutoCollision,
        ClaimCategory::AutoTheft,
        ClaimCategory::RentalVehicle,
        ClaimCategory::PropertyDamage,
        ClaimCategory::Theft,
        ClaimCategory::Medical,
        ClaimCategory::Liability,
        ClaimCategory::Other,
    ];
}

impl FromStr for ClaimCategory {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ClaimError::UnknownCategory(s.to_string()))
    }
}

/// Kind of attachment referenced by a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Document,
    Photo,
}

/// A document or photo attached to the claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Reference of the stored object (file name, object key)
    pub reference: String,
    pub media_type: Option<String>,
}

impl Attachment {
    pub fn photo(reference: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Photo,
            reference: reference.into(),
            media_type: None,
        }
    }

    pub fn document(reference: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Document,
            reference: reference.into(),
            media_type: None,
        }
    }
}

/// A structured claim as produced by document extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Claim reference
    pub claim_id: ClaimId,
    /// Claimant party reference
    pub claimant_id: ClaimantId,
    /// Service provider reference (repair shop, clinic, rental company)
    pub provider_id: ProviderId,
    /// Claimant display name
    #[serde(default)]
    pub claimant_name: Option<String>,
    /// Provider display name
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Claimant postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Claimant contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Payout bank account
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Type of loss
    pub category: ClaimCategory,
    /// Date the incident occurred (start of the incident window)
    pub incident_date: NaiveDate,
    /// End of the incident window, when the incident spans several days
    #[serde(default)]
    pub incident_end_date: Option<NaiveDate>,
    /// Date the claim was reported
    pub report_date: NaiveDate,
    /// Claimed amount
    pub claimed_amount: Decimal,
    /// Incident location
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text narrative of the incident
    #[serde(default)]
    pub narrative: String,
    /// Attached documents and photos
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl ClaimRecord {
    /// Returns the inclusive incident window
    pub fn incident_window(&self) -> (NaiveDate, NaiveDate) {
        let end = self
            .incident_end_date
            .filter(|end| *end >= self.incident_date)
            .unwrap_or(self.incident_date);
        (self.incident_date, end)
    }

    /// Returns true if this claim's incident window intersects another claim's
    pub fn incident_overlaps(&self, other: &ClaimRecord) -> bool {
        let (start, end) = self.incident_window();
        let (other_start, other_end) = other.incident_window();
        start <= other_end && other_start <= end
    }

    /// Returns the attached photos
    pub fn photos(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments
            .iter()
            .filter(|a| a.kind == AttachmentKind::Photo)
    }

    /// Text used to query the historical fraud-case index
    pub fn search_text(&self) -> String {
        let mut text = format!("{} claim", self.category.as_str().replace('_', " "));
        if let Some(location) = &self.location {
            text.push_str(" at ");
            text.push_str(location);
        }
        if !self.narrative.trim().is_empty() {
            text.push_str(". ");
            text.push_str(self.narrative.trim());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(incident: NaiveDate, end: Option<NaiveDate>) -> ClaimRecord {
        ClaimRecord {
            claim_id: ClaimId::new("CLM-1"),
            claimant_id: ClaimantId::new("P-1"),
            provider_id: ProviderId::new("PRV-1"),
            claimant_name: None,
            provider_name: None,
            address: None,
            phone: None,
            bank_account: None,
            category: ClaimCategory::AutoCollision,
            incident_date: incident,
            incident_end_date: end,
            report_date: incident,
            claimed_amount: dec!(1000),
            location: None,
            narrative: String::new(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_incident_window_ignores_end_before_start() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(record(d, Some(before)).incident_window(), (d, d));
    }

    #[test]
    fn test_single_day_windows_overlap_only_on_same_day() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert!(record(d1, None).incident_overlaps(&record(d1, None)));
        assert!(!record(d1, None).incident_overlaps(&record(d2, None)));
        assert!(record(d1, Some(d2)).incident_overlaps(&record(d2, None)));
    }

    #[test]
    fn test_category_names_parse_back() {
        for category in ClaimCategory::ALL {
            assert_eq!(category.as_str().parse::<ClaimCategory>().unwrap(), category);
        }
        assert!(matches!(
            "auto_colision".parse::<ClaimCategory>(),
            Err(ClaimError::UnknownCategory(name)) if name == "auto_colision"
        ));
    }
}
