//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, ClaimantId, ProviderId};
use domain_claims::{Attachment, ClaimCategory, ClaimRecord};

use crate::fixtures::DateFixtures;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1000);

/// Builder for constructing claim records
///
/// Every builder gets its own claim, claimant, provider and address, so two
/// default records never share an entity.
pub struct ClaimRecordBuilder {
    record: ClaimRecord,
}

impl Default for ClaimRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRecordBuilder {
    /// Creates a new builder with unique identifiers and a clean claim
    pub fn new() -> Self {
        let n = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let incident = DateFixtures::incident();
        Self {
            record: ClaimRecord {
                claim_id: ClaimId::new(format!("CLM-{}", n)),
                claimant_id: ClaimantId::new(format!("PTY-{}", n)),
                provider_id: ProviderId::new(format!("PRV-{}", n)),
                claimant_name: Some(Name().fake()),
                provider_name: Some(CompanyName().fake()),
                address: Some(format!("{} Builder Way", n)),
                phone: None,
                bank_account: None,
                category: ClaimCategory::AutoCollision,
                incident_date: incident,
                incident_end_date: None,
                report_date: incident + chrono::Duration::days(1),
                claimed_amount: dec!(2500.00),
                location: Some("Springfield".to_string()),
                narrative: "Vehicle was struck from behind while stopped at a red light.".to_string(),
                attachments: Vec::new(),
            },
        }
    }

    pub fn with_claim_id(mut self, id: impl Into<ClaimId>) -> Self {
        self.record.claim_id = id.into();
        self
    }

    pub fn with_claimant(mut self, id: impl Into<ClaimantId>) -> Self {
        self.record.claimant_id = id.into();
        self
    }

    pub fn with_provider(mut self, id: impl Into<ProviderId>) -> Self {
        self.record.provider_id = id.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.record.address = Some(address.into());
        self
    }

    pub fn without_address(mut self) -> Self {
        self.record.address = None;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.record.phone = Some(phone.into());
        self
    }

    pub fn with_bank_account(mut self, account: impl Into<String>) -> Self {
        self.record.bank_account = Some(account.into());
        self
    }

    pub fn with_category(mut self, category: ClaimCategory) -> Self {
        self.record.category = category;
        self
    }

    /// Sets the incident date and reports the claim the next day
    pub fn with_incident_date(mut self, date: NaiveDate) -> Self {
        self.record.incident_date = date;
        self.record.report_date = date + chrono::Duration::days(1);
        self
    }

    pub fn with_incident_end_date(mut self, date: NaiveDate) -> Self {
        self.record.incident_end_date = Some(date);
        self
    }

    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.record.report_date = date;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.record.claimed_amount = amount;
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.record.narrative = narrative.into();
        self
    }

    pub fn with_photo(mut self, reference: impl Into<String>) -> Self {
        self.record.attachments.push(Attachment::photo(reference));
        self
    }

    pub fn build(self) -> ClaimRecord {
        self.record
    }
}
