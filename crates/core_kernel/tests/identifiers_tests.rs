//! Unit tests for the Identifiers module

use core_kernel::{CarrierId, DraftId, PaymentConditionId, ProductId};
use uuid::Uuid;

mod draft_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(DraftId::new(), DraftId::new());
    }

    #[test]
    fn test_new_v7_is_time_ordered() {
        let first = DraftId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = DraftId::new_v7();

        let a: Uuid = first.into();
        let b: Uuid = second.into();
        assert!(a < b);
    }
}

mod parsing_tests {
    use super::*;

    #[test]
    fn test_display_carries_prefix() {
        assert!(ProductId::new().to_string().starts_with("PRD-"));
        assert!(CarrierId::new().to_string().starts_with("CAR-"));
        assert!(PaymentConditionId::new().to_string().starts_with("PCD-"));
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let carrier = CarrierId::new().to_string();
        assert!(carrier.parse::<ProductId>().is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!("PRD-not-a-uuid".parse::<ProductId>().is_err());
    }
}
