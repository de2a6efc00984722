//! Unit tests for the Identifiers module
//!
//! Tests cover upstream references (claims, parties, historical cases) and
//! engine-issued run identifiers.

use core_kernel::{CaseId, ClaimId, ClaimantId, ProviderId, RunId};
use proptest::prelude::*;
use std::collections::BTreeSet;
use uuid::Uuid;

mod reference_tests {
    use super::*;

    #[test]
    fn test_reference_round_trips_through_json_as_plain_string() {
        let id = ClaimId::new("CLM-2024-0001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"CLM-2024-0001\"");

        let back: ClaimId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_references_order_lexicographically() {
        let set: BTreeSet<ClaimId> = ["C-3", "C-1", "C-2"].into_iter().map(ClaimId::from).collect();
        let ordered: Vec<&str> = set.iter().map(|c| c.as_str()).collect();
        assert_eq!(ordered, vec!["C-1", "C-2", "C-3"]);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(ClaimId::prefix(), "CLM");
        assert_eq!(ClaimantId::prefix(), "PTY");
        assert_eq!(ProviderId::prefix(), "PRV");
        assert_eq!(CaseId::prefix(), "CASE");
        assert_eq!(RunId::prefix(), "RUN");
    }

    #[test]
    fn test_unassigned_claim_is_not_blank() {
        assert!(!ClaimId::unassigned().is_blank());
    }

    #[test]
    fn test_blank_detection() {
        assert!(ProviderId::new("").is_blank());
        assert!(ProviderId::new(" \t").is_blank());
        assert!(!ProviderId::new("PRV-1").is_blank());
    }
}

mod run_id_tests {
    use super::*;

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = RunId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = RunId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_display_and_parse() {
        let id = RunId::new_v7();
        let display = id.to_string();
        assert!(display.starts_with("RUN-"));
        let parsed: RunId = display.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_without_prefix() {
        let uuid = Uuid::now_v7();
        let parsed: RunId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("RUN-not-a-uuid".parse::<RunId>().is_err());
    }
}

proptest! {
    #[test]
    fn prop_reference_display_is_identity(reference in "[A-Z]{3}-[0-9]{1,8}") {
        let id = ClaimantId::new(reference.clone());
        prop_assert_eq!(id.to_string(), reference.clone());
        let parsed: ClaimantId = reference.parse().unwrap();
        prop_assert_eq!(parsed, id);
    }
}
