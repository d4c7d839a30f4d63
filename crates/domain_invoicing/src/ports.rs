//! Reference-data ports
//!
//! The draft never looks anything up itself. Products, counterparties,
//! carriers and payment conditions are resolved through
//! [`ReferenceDataPort`] before they reach an edit, so the engine only ever
//! sees plain values.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_invoicing::ports::ReferenceDataPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ReferenceDataPort> = Arc::new(CatalogueAdapter::new(config));
//! let service = DraftService::new(port);
//! ```

use async_trait::async_trait;

use core_kernel::{CarrierId, DomainPort, PartyId, PaymentConditionId, PortError, ProductId};

use crate::draft::DocumentDirection;
use crate::references::{CarrierRef, CounterpartyRef, PaymentConditionRef, ProductRef};

/// Port to the reference-data collaborators
#[async_trait]
pub trait ReferenceDataPort: DomainPort {
    /// Retrieves a product from the catalogue
    ///
    /// # Returns
    ///
    /// The product if found, or `PortError::NotFound`
    async fn product(&self, id: ProductId) -> Result<ProductRef, PortError>;

    /// Retrieves a counterparty in the role `direction` calls for
    ///
    /// Suppliers are looked up for inbound documents and customers for
    /// outbound ones.
    async fn counterparty(
        &self,
        direction: DocumentDirection,
        id: PartyId,
    ) -> Result<CounterpartyRef, PortError>;

    /// Retrieves a carrier together with its vehicles
    async fn carrier(&self, id: CarrierId) -> Result<CarrierRef, PortError>;

    /// Retrieves a payment condition and its installments
    async fn payment_condition(
        &self,
        id: PaymentConditionId,
    ) -> Result<PaymentConditionRef, PortError>;
}

/// In-memory reference data for tests and local runs
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ReferenceDataPort
    #[derive(Debug, Default)]
    pub struct MockReferenceDataPort {
        products: Arc<RwLock<HashMap<ProductId, ProductRef>>>,
        suppliers: Arc<RwLock<HashMap<PartyId, CounterpartyRef>>>,
        customers: Arc<RwLock<HashMap<PartyId, CounterpartyRef>>>,
        carriers: Arc<RwLock<HashMap<CarrierId, CarrierRef>>>,
        payment_conditions: Arc<RwLock<HashMap<PaymentConditionId, PaymentConditionRef>>>,
        unavailable: AtomicBool,
    }

    impl MockReferenceDataPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert_product(&self, product: ProductRef) {
            self.products.write().await.insert(product.id, product);
        }

        /// Registers a counterparty in the role matching `direction`
        pub async fn insert_counterparty(
            &self,
            direction: DocumentDirection,
            counterparty: CounterpartyRef,
        ) {
            let map = match direction {
                DocumentDirection::Inbound => &self.suppliers,
                DocumentDirection::Outbound => &self.customers,
            };
            map.write().await.insert(counterparty.id, counterparty);
        }

        pub async fn insert_carrier(&self, carrier: CarrierRef) {
            self.carriers.write().await.insert(carrier.id, carrier);
        }

        pub async fn insert_payment_condition(&self, condition: PaymentConditionRef) {
            self.payment_conditions
                .write()
                .await
                .insert(condition.id, condition);
        }

        /// Makes every subsequent lookup fail with `PortError::Unavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                Err(PortError::unavailable("mock-reference-data"))
            } else {
                Ok(())
            }
        }
    }

    impl DomainPort for MockReferenceDataPort {}

    #[async_trait]
    impl ReferenceDataPort for MockReferenceDataPort {
        async fn product(&self, id: ProductId) -> Result<ProductRef, PortError> {
            self.check_available()?;
            self.products
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Product", id))
        }

        async fn counterparty(
            &self,
            direction: DocumentDirection,
            id: PartyId,
        ) -> Result<CounterpartyRef, PortError> {
            self.check_available()?;
            let map = match direction {
                DocumentDirection::Inbound => &self.suppliers,
                DocumentDirection::Outbound => &self.customers,
            };
            map.read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found(direction.counterparty_role(), id))
        }

        async fn carrier(&self, id: CarrierId) -> Result<CarrierRef, PortError> {
            self.check_available()?;
            self.carriers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Carrier", id))
        }

        async fn payment_condition(
            &self,
            id: PaymentConditionId,
        ) -> Result<PaymentConditionRef, PortError> {
            self.check_available()?;
            self.payment_conditions
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("PaymentCondition", id))
        }
    }
}
