//! Movement engine tests
//!
//! Tests for entry/exit/transfer validation and the adjustment rules:
//! delta computation, origin/destination assignment and note
//! annotation.

use shared::validation::{
    adjustment_outcome, annotate_adjustment_notes, apply_credit, apply_debit, validate_positive,
    StockError,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Entries, exits and transfers all require a positive quantity
    #[test]
    fn test_movement_quantity_must_be_positive() {
        assert!(validate_positive(1).is_ok());
        assert_eq!(validate_positive(0), Err(StockError::NonPositiveQuantity));
        assert_eq!(validate_positive(-10), Err(StockError::NonPositiveQuantity));
    }

    /// Shrinking an adjustment records the place as origin
    #[test]
    fn test_adjustment_shrink() {
        let out = adjustment_outcome(50, 30, 3).unwrap();
        assert_eq!(out.delta, -20);
        assert_eq!(out.magnitude, 20);
        assert_eq!(out.origin_place_id, Some(3));
        assert_eq!(out.destination_place_id, None);
    }

    /// Growing an adjustment records the place as destination
    #[test]
    fn test_adjustment_growth() {
        let out = adjustment_outcome(30, 50, 3).unwrap();
        assert_eq!(out.delta, 20);
        assert_eq!(out.magnitude, 20);
        assert_eq!(out.origin_place_id, None);
        assert_eq!(out.destination_place_id, Some(3));
    }

    /// A count matching the ledger is a recordable no-op
    #[test]
    fn test_adjustment_zero_delta() {
        let out = adjustment_outcome(25, 25, 3).unwrap();
        assert_eq!(out.delta, 0);
        assert_eq!(out.magnitude, 0);
        assert_eq!(out.origin_place_id, None);
        assert_eq!(out.destination_place_id, None);
    }

    /// Negative targets are rejected before anything is written
    #[test]
    fn test_adjustment_rejects_negative_target() {
        assert_eq!(
            adjustment_outcome(25, -5, 3),
            Err(StockError::NegativeQuantity)
        );
    }

    /// Notes carry previous, new and signed delta ahead of the
    /// operator's text
    #[test]
    fn test_adjustment_notes_annotation() {
        assert_eq!(
            annotate_adjustment_notes(50, 30, Some("recuento mensual")),
            "Stock anterior: 50, Stock nuevo: 30, Diferencia: -20. recuento mensual"
        );
        assert_eq!(
            annotate_adjustment_notes(0, 10, None),
            "Stock anterior: 0, Stock nuevo: 10, Diferencia: +10."
        );
        // Blank operator notes collapse to just the header
        assert_eq!(
            annotate_adjustment_notes(10, 10, Some("   ")),
            "Stock anterior: 10, Stock nuevo: 10, Diferencia: +0."
        );
    }

    /// A transfer is a debit and a credit of the same amount
    #[test]
    fn test_transfer_both_legs() {
        let origin = 40;
        let destination = 5;
        let amount = 15;

        let new_origin = apply_debit(origin, amount).unwrap();
        let new_destination = apply_credit(destination, amount).unwrap();

        assert_eq!(new_origin, 25);
        assert_eq!(new_destination, 20);
    }

    /// An exit larger than the available stock fails before any write
    #[test]
    fn test_exit_insufficient() {
        let err = apply_debit(5, 8).unwrap_err();
        assert_eq!(
            err,
            StockError::Insufficient {
                available: 5,
                requested: 8
            }
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        0i32..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Exactly one side of an adjustment is assigned, matching the
        /// sign of the delta
        #[test]
        fn prop_adjustment_assigns_one_side(
            current in quantity_strategy(),
            target in quantity_strategy(),
            place_id in 1i32..=1000
        ) {
            let out = adjustment_outcome(current, target, place_id).unwrap();

            prop_assert_eq!(out.delta, target - current);
            prop_assert_eq!(out.magnitude, (target - current).abs());

            match out.delta.signum() {
                1 => {
                    prop_assert_eq!(out.destination_place_id, Some(place_id));
                    prop_assert_eq!(out.origin_place_id, None);
                }
                -1 => {
                    prop_assert_eq!(out.origin_place_id, Some(place_id));
                    prop_assert_eq!(out.destination_place_id, None);
                }
                _ => {
                    prop_assert_eq!(out.origin_place_id, None);
                    prop_assert_eq!(out.destination_place_id, None);
                }
            }
        }

        /// Applying the outcome's delta to the prior quantity always
        /// lands on the counted target
        #[test]
        fn prop_adjustment_delta_reaches_target(
            current in quantity_strategy(),
            target in quantity_strategy()
        ) {
            let out = adjustment_outcome(current, target, 1).unwrap();
            prop_assert_eq!(current + out.delta, target);
        }

        /// The notes header always starts with the prior quantity and
        /// preserves the operator's text verbatim
        #[test]
        fn prop_notes_preserve_operator_text(
            previous in quantity_strategy(),
            target in quantity_strategy(),
            text in "[a-z][a-z ]{0,39}"
        ) {
            let annotated = annotate_adjustment_notes(previous, target, Some(&text));
            let expected_header = format!("Stock anterior: {}", previous);
            prop_assert!(annotated.starts_with(&expected_header));
            prop_assert!(annotated.ends_with(text.as_str()));
        }
    }
}
