//! Stock ledger tests
//!
//! Tests for the quantity invariants backing the ledger:
//! - quantities never go negative
//! - a failed debit leaves the quantity unchanged
//! - transfers conserve the total across places

use shared::validation::{apply_credit, apply_debit, StockError};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Crediting an empty place starts from zero
    #[test]
    fn test_credit_from_absent_row() {
        assert_eq!(apply_credit(0, 50).unwrap(), 50);
    }

    /// Debits below the available quantity succeed
    #[test]
    fn test_debit_within_available() {
        assert_eq!(apply_debit(50, 20).unwrap(), 30);
    }

    /// Debiting more than available fails and reports both numbers
    #[test]
    fn test_debit_insufficient_reports_numbers() {
        let err = apply_debit(50, 60).unwrap_err();
        assert_eq!(
            err,
            StockError::Insufficient {
                available: 50,
                requested: 60
            }
        );
    }

    /// Debiting an absent row behaves like debiting zero
    #[test]
    fn test_debit_absent_row() {
        let err = apply_debit(0, 1).unwrap_err();
        assert_eq!(
            err,
            StockError::Insufficient {
                available: 0,
                requested: 1
            }
        );
    }

    /// Zero and negative amounts are rejected for both directions
    #[test]
    fn test_non_positive_amounts_rejected() {
        assert_eq!(apply_credit(10, 0), Err(StockError::NonPositiveQuantity));
        assert_eq!(apply_debit(10, 0), Err(StockError::NonPositiveQuantity));
        assert_eq!(apply_credit(10, -3), Err(StockError::NonPositiveQuantity));
        assert_eq!(apply_debit(10, -3), Err(StockError::NonPositiveQuantity));
    }

    /// The CLORO001 scenario: receive 50, fail to issue 60, transfer 20
    #[test]
    fn test_chlorine_scenario() {
        let warehouse = apply_credit(0, 50).unwrap();
        assert_eq!(warehouse, 50);

        // Issuing 60 must fail and change nothing
        assert!(apply_debit(warehouse, 60).is_err());
        assert_eq!(warehouse, 50);

        // Transfer 20 to the treatment plant
        let warehouse = apply_debit(warehouse, 20).unwrap();
        let plant = apply_credit(0, 20).unwrap();
        assert_eq!(warehouse, 30);
        assert_eq!(plant, 20);
        assert_eq!(warehouse + plant, 50);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn amount_strategy() -> impl Strategy<Value = i32> {
        1i32..=10_000
    }

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        0i32..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A successful debit never drives the quantity negative
        #[test]
        fn prop_debit_never_negative(
            current in quantity_strategy(),
            amount in amount_strategy()
        ) {
            match apply_debit(current, amount) {
                Ok(new_quantity) => prop_assert!(new_quantity >= 0),
                Err(StockError::Insufficient { available, requested }) => {
                    prop_assert_eq!(available, current);
                    prop_assert_eq!(requested, amount);
                    prop_assert!(current < amount);
                }
                Err(e) => prop_assert!(false, "unexpected error: {:?}", e),
            }
        }

        /// Credit followed by an equal debit is the identity
        #[test]
        fn prop_credit_debit_roundtrip(
            current in quantity_strategy(),
            amount in amount_strategy()
        ) {
            let credited = apply_credit(current, amount).unwrap();
            let restored = apply_debit(credited, amount).unwrap();
            prop_assert_eq!(restored, current);
        }

        /// A transfer conserves the total across both places
        #[test]
        fn prop_transfer_conserves_total(
            origin in quantity_strategy(),
            destination in quantity_strategy(),
            amount in amount_strategy()
        ) {
            let total_before = origin as i64 + destination as i64;
            match apply_debit(origin, amount) {
                Ok(new_origin) => {
                    let new_destination = apply_credit(destination, amount).unwrap();
                    prop_assert_eq!(
                        new_origin as i64 + new_destination as i64,
                        total_before
                    );
                }
                Err(_) => {
                    // Failed transfers change neither side
                    prop_assert_eq!(origin as i64 + destination as i64, total_before);
                }
            }
        }

        /// Sequential debits succeed exactly while stock remains
        #[test]
        fn prop_sequential_debits_stop_at_zero(
            initial in quantity_strategy(),
            amounts in prop::collection::vec(amount_strategy(), 1..20)
        ) {
            let mut current = initial;
            for amount in amounts {
                match apply_debit(current, amount) {
                    Ok(next) => {
                        prop_assert_eq!(next, current - amount);
                        current = next;
                    }
                    Err(_) => prop_assert!(current < amount),
                }
            }
            prop_assert!(current >= 0);
        }
    }
}
