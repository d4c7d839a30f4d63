//! Reference data consumed by the draft
//!
//! These are the resolved shapes of entities owned by external collaborators
//! (product catalogue, party registry, carrier registry, payment conditions).
//! The draft keeps denormalized copies for display; the collaborators remain
//! authoritative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CarrierId, Money, PartyId, PaymentConditionId, ProductId};

/// A product as published by the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub display_name: String,
    pub display_code: String,
    pub default_unit_price: Money,
}

/// A supplier (inbound documents) or customer (outbound documents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyRef {
    pub id: PartyId,
    pub display_name: String,
    #[serde(default)]
    pub default_payment_condition_id: Option<PaymentConditionId>,
}

/// A vehicle operated by a carrier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRef {
    pub plate: String,
    pub model: String,
    pub brand: String,
}

/// A shipping carrier and its fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierRef {
    pub id: CarrierId,
    pub display_name: String,
    #[serde(default)]
    pub vehicles: Vec<VehicleRef>,
}

impl CarrierRef {
    /// Looks up one of this carrier's vehicles by plate (case-insensitive)
    pub fn vehicle(&self, plate: &str) -> Option<&VehicleRef> {
        self.vehicles
            .iter()
            .find(|v| v.plate.eq_ignore_ascii_case(plate.trim()))
    }
}

/// One installment of a payment condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    pub days_after_issue: u32,
    pub percentage: Decimal,
}

/// A payment condition, displayed read-only next to the draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConditionRef {
    pub id: PaymentConditionId,
    pub description: String,
    #[serde(default)]
    pub installments: Vec<Installment>,
}
