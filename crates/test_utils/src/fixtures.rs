//! Pre-built Test Fixtures
//!
//! Provides ready-to-use reference data for the pizzeria back office. These
//! fixtures are consistent and predictable so the worked examples in the
//! test suite can be checked by hand.

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{
    CarrierId, Clock, FixedClock, Money, PartyId, PaymentConditionId, ProductId,
};
use domain_invoicing::ports::mock::MockReferenceDataPort;
use domain_invoicing::{
    CarrierRef, CounterpartyRef, DocumentDirection, Installment, PaymentConditionRef, ProductRef,
    VehicleRef,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for calendar test data
pub struct DateFixtures;

impl DateFixtures {
    /// The "today" every fixture clock is pinned to (Mar 15, 2024)
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    /// Standard issue date, a few days before today
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    /// Standard arrival/departure date, the day after issue
    pub fn movement_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    /// A date after today
    pub fn tomorrow() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
    }

    /// Clock pinned to [`DateFixtures::today`]
    pub fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(Self::today()))
    }
}

/// Fixture for catalogue products
pub struct ProductFixtures;

impl ProductFixtures {
    fn product(seed: u128, name: &str, code: &str, price: Money) -> ProductRef {
        ProductRef {
            id: ProductId::from_uuid(Uuid::from_u128(seed)),
            display_name: name.to_string(),
            display_code: code.to_string(),
            default_unit_price: price,
        }
    }

    /// Pizza dough at 10.50
    pub fn dough() -> ProductRef {
        Self::product(0x101, "Pizza dough 1kg", "DGH-1", Money::new(dec!(10.50)))
    }

    /// Mozzarella at 15.00
    pub fn mozzarella() -> ProductRef {
        Self::product(0x102, "Mozzarella 1kg", "MOZ-1", Money::new(dec!(15.00)))
    }

    /// Tomato sauce at 8.50
    pub fn tomato_sauce() -> ProductRef {
        Self::product(0x103, "Tomato sauce 2L", "TOM-2", Money::new(dec!(8.50)))
    }

    /// Fresh basil at 1.00
    pub fn basil() -> ProductRef {
        Self::product(0x104, "Fresh basil bunch", "BSL", Money::new(dec!(1.00)))
    }

    /// Every product above
    pub fn all() -> Vec<ProductRef> {
        vec![Self::dough(), Self::mozzarella(), Self::tomato_sauce(), Self::basil()]
    }
}

/// Fixture for suppliers and customers
pub struct CounterpartyFixtures;

impl CounterpartyFixtures {
    /// Supplier paying on the standard 30/60 condition
    pub fn supplier() -> CounterpartyRef {
        CounterpartyRef {
            id: PartyId::from_uuid(Uuid::from_u128(0x201)),
            display_name: "Laticinios Serra Ltda".to_string(),
            default_payment_condition_id: Some(PaymentConditionFixtures::split_30_60().id),
        }
    }

    /// Walk-in customer without a default payment condition
    pub fn customer() -> CounterpartyRef {
        CounterpartyRef {
            id: PartyId::from_uuid(Uuid::from_u128(0x202)),
            display_name: "Cantina do Bairro".to_string(),
            default_payment_condition_id: None,
        }
    }

    /// Counterparty for `direction`
    pub fn for_direction(direction: DocumentDirection) -> CounterpartyRef {
        match direction {
            DocumentDirection::Inbound => Self::supplier(),
            DocumentDirection::Outbound => Self::customer(),
        }
    }
}

/// Fixture for carriers
pub struct CarrierFixtures;

impl CarrierFixtures {
    /// Carrier with two vans
    pub fn rapido() -> CarrierRef {
        CarrierRef {
            id: CarrierId::from_uuid(Uuid::from_u128(0x301)),
            display_name: "Rapido Sul Transportes".to_string(),
            vehicles: vec![
                VehicleRef {
                    plate: "ABC1D23".to_string(),
                    model: "Daily".to_string(),
                    brand: "Iveco".to_string(),
                },
                VehicleRef {
                    plate: "XYZ9K88".to_string(),
                    model: "Sprinter".to_string(),
                    brand: "Mercedes-Benz".to_string(),
                },
            ],
        }
    }

    /// Carrier with a single truck
    pub fn norte() -> CarrierRef {
        CarrierRef {
            id: CarrierId::from_uuid(Uuid::from_u128(0x302)),
            display_name: "Norte Cargas".to_string(),
            vehicles: vec![VehicleRef {
                plate: "QRS4T56".to_string(),
                model: "Accelo".to_string(),
                brand: "Mercedes-Benz".to_string(),
            }],
        }
    }
}

/// Fixture for payment conditions
pub struct PaymentConditionFixtures;

impl PaymentConditionFixtures {
    /// Two installments at 30 and 60 days
    pub fn split_30_60() -> PaymentConditionRef {
        PaymentConditionRef {
            id: PaymentConditionId::from_uuid(Uuid::from_u128(0x401)),
            description: "30/60 days".to_string(),
            installments: vec![
                Installment {
                    number: 1,
                    days_after_issue: 30,
                    percentage: dec!(50),
                },
                Installment {
                    number: 2,
                    days_after_issue: 60,
                    percentage: dec!(50),
                },
            ],
        }
    }

    /// Single payment on issue
    pub fn cash() -> PaymentConditionRef {
        PaymentConditionRef {
            id: PaymentConditionId::from_uuid(Uuid::from_u128(0x402)),
            description: "Cash".to_string(),
            installments: vec![Installment {
                number: 1,
                days_after_issue: 0,
                percentage: dec!(100),
            }],
        }
    }
}

/// Mock reference-data port preloaded with every fixture above
pub async fn seeded_reference_port() -> Arc<MockReferenceDataPort> {
    let port = MockReferenceDataPort::new();
    for product in ProductFixtures::all() {
        port.insert_product(product).await;
    }
    port.insert_counterparty(DocumentDirection::Inbound, CounterpartyFixtures::supplier())
        .await;
    port.insert_counterparty(DocumentDirection::Outbound, CounterpartyFixtures::customer())
        .await;
    port.insert_carrier(CarrierFixtures::rapido()).await;
    port.insert_carrier(CarrierFixtures::norte()).await;
    port.insert_payment_condition(PaymentConditionFixtures::split_30_60())
        .await;
    port.insert_payment_condition(PaymentConditionFixtures::cash()).await;
    Arc::new(port)
}
