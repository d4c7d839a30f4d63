//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating line items and charges that
//! satisfy the draft's entry rules, so properties can focus on allocation
//! and totals.

use core_kernel::{Money, ProductId};
use domain_invoicing::{ChargeSet, LineCandidate, ProductRef};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for unit prices from 0.00 to 999.99
pub fn unit_price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for positive quantities with up to three fractional digits
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..50i64).prop_map(|n| Decimal::new(n, 0)),
        (1i64..50_000i64).prop_map(|n| Decimal::new(n, 3)),
    ]
}

/// Strategy for charge amounts from 0.00 to 499.99
pub fn charge_strategy() -> impl Strategy<Value = Money> {
    (0i64..50_000i64).prop_map(Money::from_minor)
}

/// Strategy for a full set of charges
pub fn charge_set_strategy() -> impl Strategy<Value = ChargeSet> {
    (charge_strategy(), charge_strategy(), charge_strategy())
        .prop_map(|(freight, insurance, other)| ChargeSet::new(freight, insurance, other))
}

/// Strategy for a valid line candidate
///
/// The discount is drawn as a whole percentage of the line value, rounded
/// down to cents, so it never exceeds the value.
pub fn line_candidate_strategy() -> impl Strategy<Value = LineCandidate> {
    (
        quantity_strategy(),
        unit_price_strategy(),
        prop_oneof![3 => Just(0u32), 1 => 0u32..=100u32],
        any::<u128>(),
    )
        .prop_map(|(quantity, price, discount_pct, seed)| {
            let line_value = quantity * price;
            let discount = (line_value * Decimal::new(discount_pct as i64, 2))
                .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::ToZero);
            let product = ProductRef {
                id: ProductId::from_uuid(uuid::Uuid::from_u128(seed)),
                display_name: format!("Generated {}", seed % 1000),
                display_code: format!("GEN-{}", seed % 1000),
                default_unit_price: Money::new(price),
            };
            LineCandidate::for_product(product, quantity).with_discount(Money::new(discount))
        })
}

/// Strategy for 1 to `max` valid line candidates
pub fn line_candidates_strategy(max: usize) -> impl Strategy<Value = Vec<LineCandidate>> {
    proptest::collection::vec(line_candidate_strategy(), 1..=max)
}

/// Strategy for non-negative apportionment weights with a positive sum
pub fn weights_strategy() -> impl Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(0i64..100_000i64, 1..12)
        .prop_filter("weights must not all be zero", |w| w.iter().any(|&x| x > 0))
        .prop_map(|w| w.into_iter().map(|x| Decimal::new(x, 2)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn quantities_are_positive(quantity in quantity_strategy()) {
            prop_assert!(quantity > Decimal::ZERO);
        }

        #[test]
        fn generated_discount_within_line_value(candidate in line_candidate_strategy()) {
            let price = candidate.product.as_ref().map(|p| p.default_unit_price).unwrap_or_default();
            prop_assert!(candidate.discount.amount() <= price.amount() * candidate.quantity);
            prop_assert!(!candidate.discount.is_negative());
        }

        #[test]
        fn charges_are_whole_cents(charges in charge_set_strategy()) {
            prop_assert_eq!(charges.freight.round_for_display(), charges.freight);
            prop_assert!(!charges.total().unwrap().is_negative());
        }
    }
}
