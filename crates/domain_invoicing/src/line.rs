//! Line items
//!
//! A [`LineCandidate`] is what the entry form submits; a [`LineItem`] is a
//! validated candidate that has been given a sequence number by the store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ProductId};

use crate::allocation::LineAllocation;
use crate::error::{DraftError, DraftField};
use crate::references::ProductRef;

/// An unvalidated line as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCandidate {
    /// Selected product; `None` while the picker is empty
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub quantity: Decimal,
    /// Explicit unit price; falls back to the product's default price
    #[serde(default)]
    pub unit_price: Option<Money>,
    /// Monetary (not percentage) discount on the whole line
    #[serde(default)]
    pub discount: Money,
}

impl LineCandidate {
    /// Creates a candidate for the given product at its default price
    pub fn for_product(product: ProductRef, quantity: Decimal) -> Self {
        Self {
            product: Some(product),
            quantity,
            unit_price: None,
            discount: Money::zero(),
        }
    }

    /// Overrides the unit price
    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    /// Applies a line discount
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    /// Validates the candidate and turns it into a line with `sequence`
    ///
    /// # Errors
    ///
    /// Returns `ValidationRejected` when no product is selected, the quantity
    /// is not positive, the unit price or discount is negative, or the
    /// discount exceeds the line value.
    pub(crate) fn into_line(self, sequence: u32) -> Result<LineItem, DraftError> {
        let product = self
            .product
            .ok_or_else(|| DraftError::validation(DraftField::Product, "no product selected"))?;

        if self.quantity <= Decimal::ZERO {
            return Err(DraftError::validation(
                DraftField::Quantity,
                format!("quantity must be greater than zero, got {}", self.quantity),
            ));
        }

        let unit_price = self.unit_price.unwrap_or(product.default_unit_price);
        if unit_price.is_negative() {
            return Err(DraftError::validation(
                DraftField::UnitPrice,
                format!("unit price cannot be negative, got {}", unit_price),
            ));
        }

        if self.discount.is_negative() {
            return Err(DraftError::validation(
                DraftField::LineDiscount,
                format!("discount cannot be negative, got {}", self.discount),
            ));
        }

        let line_value = unit_price.checked_mul(self.quantity).map_err(|_| {
            DraftError::validation(
                DraftField::UnitPrice,
                format!(
                    "line value {} x {} exceeds the supported range",
                    unit_price, self.quantity
                ),
            )
        })?;
        if self.discount > line_value {
            return Err(DraftError::validation(
                DraftField::LineDiscount,
                format!("discount {} exceeds line value {}", self.discount, line_value),
            ));
        }
        let gross_amount = line_value - self.discount;

        Ok(LineItem {
            sequence,
            product_id: product.id,
            display_name: product.display_name,
            display_code: product.display_code,
            quantity: self.quantity,
            unit_price,
            discount: self.discount,
            gross_amount,
            allocation: LineAllocation::default(),
        })
    }
}

/// A line item of an invoice draft
///
/// The entered values (quantity, unit price, discount) are fixed once the
/// line is added. The allocation fields are owned by the allocation engine
/// and rewritten on every recomputation of the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    sequence: u32,
    product_id: ProductId,
    display_name: String,
    display_code: String,
    quantity: Decimal,
    unit_price: Money,
    discount: Money,
    gross_amount: Money,
    allocation: LineAllocation,
}

impl LineItem {
    /// 1-based insertion position; never reused
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn display_code(&self) -> &str {
        &self.display_code
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn line_discount(&self) -> Money {
        self.discount
    }

    /// `quantity * unit_price - line_discount`, at full precision
    pub fn gross_amount(&self) -> Money {
        self.gross_amount
    }

    pub fn allocated_freight(&self) -> Money {
        self.allocation.freight
    }

    pub fn allocated_insurance(&self) -> Money {
        self.allocation.insurance
    }

    pub fn allocated_other_expenses(&self) -> Money {
        self.allocation.other_expenses
    }

    /// Gross amount plus every allocated charge
    pub fn landed_total(&self) -> Money {
        self.allocation.landed_total
    }

    /// Landed total divided by quantity
    pub fn landed_unit_cost(&self) -> Money {
        self.allocation.landed_unit_cost
    }

    /// Returns the full derived allocation of this line
    pub fn allocation(&self) -> &LineAllocation {
        &self.allocation
    }

    pub(crate) fn set_allocation(&mut self, allocation: LineAllocation) {
        self.allocation = allocation;
    }
}
