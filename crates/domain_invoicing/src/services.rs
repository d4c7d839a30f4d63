//! Draft service
//!
//! Resolves reference ids through a [`ReferenceDataPort`] and turns the
//! resolved values into [`DraftEdit`]s. Lookups are attempted once; a port
//! failure surfaces as `ExternalLookupFailure` and the draft is not touched.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use core_kernel::{CarrierId, Money, PartyId, PaymentConditionId, ProductId};

use crate::draft::DocumentDirection;
use crate::edit::DraftEdit;
use crate::error::DraftError;
use crate::line::LineCandidate;
use crate::ports::ReferenceDataPort;
use crate::references::PaymentConditionRef;

/// Builds reference-bearing edits from ids
#[derive(Clone)]
pub struct DraftService {
    port: Arc<dyn ReferenceDataPort>,
}

impl DraftService {
    pub fn new(port: Arc<dyn ReferenceDataPort>) -> Self {
        Self { port }
    }

    /// Resolves the counterparty and returns the edit selecting it
    #[instrument(skip(self), fields(party_id = %id))]
    pub async fn counterparty_edit(
        &self,
        direction: DocumentDirection,
        id: PartyId,
    ) -> Result<DraftEdit, DraftError> {
        let counterparty = self
            .port
            .counterparty(direction, id)
            .await
            .map_err(|e| DraftError::lookup(format!("{} {}", direction.counterparty_role(), id), e))?;
        debug!(name = %counterparty.display_name, "Resolved counterparty");
        Ok(DraftEdit::SetCounterparty {
            counterparty: Some(counterparty),
        })
    }

    /// Resolves the product and returns a line candidate for it
    ///
    /// Without an explicit `unit_price` the product's default price applies.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn line_candidate(
        &self,
        product_id: ProductId,
        quantity: Decimal,
        unit_price: Option<Money>,
        discount: Money,
    ) -> Result<LineCandidate, DraftError> {
        let product = self
            .port
            .product(product_id)
            .await
            .map_err(|e| DraftError::lookup(format!("product {}", product_id), e))?;
        debug!(code = %product.display_code, "Resolved product");

        let candidate = LineCandidate::for_product(product, quantity).with_discount(discount);
        Ok(match unit_price {
            Some(price) => candidate.with_unit_price(price),
            None => candidate,
        })
    }

    /// Resolves the carrier and returns the edit selecting it
    #[instrument(skip(self), fields(carrier_id = %id))]
    pub async fn carrier_edit(&self, id: CarrierId) -> Result<DraftEdit, DraftError> {
        let carrier = self
            .port
            .carrier(id)
            .await
            .map_err(|e| DraftError::lookup(format!("carrier {}", id), e))?;
        debug!(vehicles = carrier.vehicles.len(), "Resolved carrier");
        Ok(DraftEdit::SetCarrier {
            carrier: Some(carrier),
        })
    }

    /// Resolves a payment condition for read-only display
    #[instrument(skip(self), fields(payment_condition_id = %id))]
    pub async fn payment_condition(
        &self,
        id: PaymentConditionId,
    ) -> Result<PaymentConditionRef, DraftError> {
        self.port
            .payment_condition(id)
            .await
            .map_err(|e| DraftError::lookup(format!("payment condition {}", id), e))
    }

    /// Verifies the payment condition exists and returns the edit selecting it
    pub async fn payment_condition_edit(
        &self,
        id: PaymentConditionId,
    ) -> Result<DraftEdit, DraftError> {
        let condition = self.payment_condition(id).await?;
        Ok(DraftEdit::SetPaymentCondition {
            payment_condition_id: Some(condition.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ports::mock::MockReferenceDataPort;
    use crate::references::ProductRef;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_line_candidate_uses_catalogue_price() {
        let port = Arc::new(MockReferenceDataPort::new());
        let product = ProductRef {
            id: ProductId::new(),
            display_name: "Pepperoni".to_string(),
            display_code: "PEP".to_string(),
            default_unit_price: Money::new(dec!(54.00)),
        };
        port.insert_product(product.clone()).await;
        let service = DraftService::new(port);

        let candidate = service
            .line_candidate(product.id, dec!(2), None, Money::zero())
            .await
            .unwrap();

        assert_eq!(candidate.product, Some(product));
        assert!(candidate.unit_price.is_none());
    }

    #[tokio::test]
    async fn test_port_failure_becomes_lookup_failure() {
        let port = Arc::new(MockReferenceDataPort::new());
        port.set_unavailable(true);
        let service = DraftService::new(port);

        let err = service
            .counterparty_edit(DocumentDirection::Inbound, PartyId::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalLookupFailure);
        assert!(err.to_string().contains("supplier"));
    }

    #[tokio::test]
    async fn test_unknown_carrier_is_not_found() {
        let service = DraftService::new(Arc::new(MockReferenceDataPort::new()));

        match service.carrier_edit(CarrierId::new()).await {
            Err(DraftError::ExternalLookupFailure { source, .. }) => assert!(source.is_not_found()),
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }
}
