//! Shipment lifecycle tests
//!
//! Tests for the inter-location shipment rules:
//! - sending debits the origin immediately
//! - receiving credits the destination, cancelling credits the origin
//! - terminal states reject further transitions
//! - the total across all places plus in-transit stock is conserved

use shared::models::ShipmentStatus;
use shared::validation::{apply_credit, apply_debit};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Sent and in-transit shipments can be received or cancelled
    #[test]
    fn test_pending_states_accept_transitions() {
        for status in [ShipmentStatus::Sent, ShipmentStatus::InTransit] {
            assert!(status.can_receive());
            assert!(status.can_cancel());
            assert!(!status.is_terminal());
        }
    }

    /// Received and cancelled shipments accept nothing further
    #[test]
    fn test_terminal_states_reject_transitions() {
        for status in [ShipmentStatus::Received, ShipmentStatus::Cancelled] {
            assert!(status.is_terminal());
            assert!(!status.can_receive());
            assert!(!status.can_cancel());
        }
    }

    /// Dispatching removes the quantity from the origin up front
    #[test]
    fn test_send_debits_origin_immediately() {
        let origin = 50;
        let origin_after = apply_debit(origin, 20).unwrap();
        assert_eq!(origin_after, 30);
        // The 20 units are in transit, held by no place
    }

    /// Sending more than the origin holds fails outright
    #[test]
    fn test_send_insufficient_origin() {
        assert!(apply_debit(10, 20).is_err());
    }

    /// Receiving credits the destination with the shipped quantity
    #[test]
    fn test_receive_credits_destination() {
        let shipped = 20;
        let destination = apply_credit(0, shipped).unwrap();
        assert_eq!(destination, 20);
    }

    /// Cancelling restores the origin to exactly its pre-send quantity
    #[test]
    fn test_cancel_restores_origin_exactly() {
        let origin = 50;
        let shipped = 20;

        let after_send = apply_debit(origin, shipped).unwrap();
        let after_cancel = apply_credit(after_send, shipped).unwrap();

        assert_eq!(after_cancel, origin);
    }

    /// Wire values keep the original Spanish vocabulary
    #[test]
    fn test_status_wire_values() {
        assert_eq!(ShipmentStatus::Sent.as_str(), "enviado");
        assert_eq!(ShipmentStatus::InTransit.as_str(), "en_transito");
        assert_eq!(ShipmentStatus::Received.as_str(), "recibido");
        assert_eq!(ShipmentStatus::Cancelled.as_str(), "cancelado");
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

        /// Send then receive conserves the total across both places
        #[test]
        fn prop_send_receive_conserves_total(
            origin in quantity_strategy(),
            destination in quantity_strategy(),
            shipped in amount_strategy()
        ) {
            let total_before = origin as i64 + destination as i64;
            if let Ok(origin_after) = apply_debit(origin, shipped) {
                // While in transit the quantity is held by no place
                prop_assert_eq!(
                    origin_after as i64 + destination as i64 + shipped as i64,
                    total_before
                );

                let destination_after = apply_credit(destination, shipped).unwrap();
                prop_assert_eq!(
                    origin_after as i64 + destination_after as i64,
                    total_before
                );
            }
        }

        /// Send then cancel is the identity on the origin
        #[test]
        fn prop_send_cancel_is_identity(
            origin in quantity_strategy(),
            shipped in amount_strategy()
        ) {
            if let Ok(after_send) = apply_debit(origin, shipped) {
                let after_cancel = apply_credit(after_send, shipped).unwrap();
                prop_assert_eq!(after_cancel, origin);
            }
        }

        /// Exactly one of receive/cancel can ever run: whichever runs
        /// first moves the shipment to a terminal state
        #[test]
        fn prop_first_transition_wins(receive_first in any::<bool>()) {
            let mut status = ShipmentStatus::Sent;

            let first = if receive_first {
                ShipmentStatus::Received
            } else {
                ShipmentStatus::Cancelled
            };

            prop_assert!(status.can_receive() && status.can_cancel());
            status = first;

            prop_assert!(!status.can_receive());
            prop_assert!(!status.can_cancel());
        }
    }
}

// ============================================================================
// Integration Test Helpers (lifecycle simulation)
// ============================================================================

#[cfg(test)]
mod integration_helpers {
    use super::*;

    /// A shipment's effect on the two ledger sides
    pub struct SimulatedShipment {
        pub quantity: i32,
        pub status: ShipmentStatus,
    }

    pub fn simulate_send(origin: &mut i32, quantity: i32) -> Result<SimulatedShipment, &'static str> {
        *origin = apply_debit(*origin, quantity).map_err(|_| "insufficient stock")?;
        Ok(SimulatedShipment {
            quantity,
            status: ShipmentStatus::Sent,
        })
    }

    pub fn simulate_receive(
        shipment: &mut SimulatedShipment,
        destination: &mut i32,
    ) -> Result<(), &'static str> {
        if !shipment.status.can_receive() {
            return Err("not receivable");
        }
        *destination = apply_credit(*destination, shipment.quantity).map_err(|_| "bad quantity")?;
        shipment.status = ShipmentStatus::Received;
        Ok(())
    }

    pub fn simulate_cancel(
        shipment: &mut SimulatedShipment,
        origin: &mut i32,
    ) -> Result<(), &'static str> {
        if !shipment.status.can_cancel() {
            return Err("not cancellable");
        }
        *origin = apply_credit(*origin, shipment.quantity).map_err(|_| "bad quantity")?;
        shipment.status = ShipmentStatus::Cancelled;
        Ok(())
    }

    #[test]
    fn test_full_lifecycle_receive() {
        let mut origin = 50;
        let mut destination = 0;

        let mut shipment = simulate_send(&mut origin, 20).unwrap();
        assert_eq!(origin, 30);

        simulate_receive(&mut shipment, &mut destination).unwrap();
        assert_eq!(destination, 20);
        assert_eq!(origin + destination, 50);
    }

    #[test]
    fn test_full_lifecycle_cancel() {
        let mut origin = 50;

        let mut shipment = simulate_send(&mut origin, 20).unwrap();
        assert_eq!(origin, 30);

        simulate_cancel(&mut shipment, &mut origin).unwrap();
        assert_eq!(origin, 50);
    }

    #[test]
    fn test_double_receive_rejected() {
        let mut origin = 50;
        let mut destination = 0;

        let mut shipment = simulate_send(&mut origin, 20).unwrap();
        simulate_receive(&mut shipment, &mut destination).unwrap();

        // A second receive must not credit the destination again
        assert!(simulate_receive(&mut shipment, &mut destination).is_err());
        assert_eq!(destination, 20);
    }

    #[test]
    fn test_cancel_after_receive_rejected() {
        let mut origin = 50;
        let mut destination = 0;

        let mut shipment = simulate_send(&mut origin, 20).unwrap();
        simulate_receive(&mut shipment, &mut destination).unwrap();

        assert!(simulate_cancel(&mut shipment, &mut origin).is_err());
        assert_eq!(origin, 30);
    }
}
