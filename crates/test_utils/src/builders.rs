//! Test Data Builders
//!
//! Builders that produce drafts by replaying real edits, so every draft a
//! test receives went through the same validation as a user's draft. Tests
//! specify only the relevant fields and take defaults for everything else.

use chrono::NaiveDate;
use core_kernel::Money;
use domain_invoicing::{
    ChargeKind, CounterpartyRef, DocumentDirection, DraftEdit, DraftError, InvoiceDraft,
    LineCandidate, ProductRef,
};
use rust_decimal::Decimal;

use crate::fixtures::{CounterpartyFixtures, DateFixtures};

/// Builder for a single line candidate
#[derive(Debug, Clone)]
pub struct LineCandidateBuilder {
    product: ProductRef,
    quantity: Decimal,
    unit_price: Option<Money>,
    discount: Money,
}

impl LineCandidateBuilder {
    /// Starts a candidate for one unit of `product` at its default price
    pub fn new(product: ProductRef) -> Self {
        Self {
            product,
            quantity: Decimal::ONE,
            unit_price: None,
            discount: Money::zero(),
        }
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = Some(Money::new(price));
        self
    }

    pub fn discount(mut self, discount: Decimal) -> Self {
        self.discount = Money::new(discount);
        self
    }

    pub fn build(self) -> LineCandidate {
        let candidate = LineCandidate::for_product(self.product, self.quantity)
            .with_discount(self.discount);
        match self.unit_price {
            Some(price) => candidate.with_unit_price(price),
            None => candidate,
        }
    }
}

/// Builder for an invoice draft
///
/// By default the header is fully populated with fixture values, so the
/// built draft sits at `HeaderComplete` until lines are added.
#[derive(Debug, Clone)]
pub struct DraftBuilder {
    direction: DocumentDirection,
    today: NaiveDate,
    document_number: String,
    document_model: String,
    document_series: String,
    counterparty: Option<CounterpartyRef>,
    issue_date: Option<NaiveDate>,
    movement_date: Option<NaiveDate>,
    lines: Vec<LineCandidate>,
    charges: Vec<(ChargeKind, Money)>,
    extra: Vec<DraftEdit>,
}

impl Default for DraftBuilder {
    fn default() -> Self {
        Self::new(DocumentDirection::Inbound)
    }
}

impl DraftBuilder {
    /// Creates a builder with a complete header for `direction`
    pub fn new(direction: DocumentDirection) -> Self {
        Self {
            direction,
            today: DateFixtures::today(),
            document_number: "000123".to_string(),
            document_model: "55".to_string(),
            document_series: "1".to_string(),
            counterparty: Some(CounterpartyFixtures::for_direction(direction)),
            issue_date: Some(DateFixtures::issue_date()),
            movement_date: Some(DateFixtures::movement_date()),
            lines: Vec::new(),
            charges: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Creates a builder with an empty header
    pub fn blank(direction: DocumentDirection) -> Self {
        Self {
            document_number: String::new(),
            document_model: String::new(),
            document_series: String::new(),
            counterparty: None,
            issue_date: None,
            movement_date: None,
            ..Self::new(direction)
        }
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn document_number(mut self, number: impl Into<String>) -> Self {
        self.document_number = number.into();
        self
    }

    pub fn counterparty(mut self, counterparty: Option<CounterpartyRef>) -> Self {
        self.counterparty = counterparty;
        self
    }

    pub fn issue_date(mut self, date: Option<NaiveDate>) -> Self {
        self.issue_date = date;
        self
    }

    pub fn movement_date(mut self, date: Option<NaiveDate>) -> Self {
        self.movement_date = date;
        self
    }

    /// Adds a line of `quantity` units of `product` at `unit_price` less `discount`
    pub fn line(
        mut self,
        product: ProductRef,
        quantity: Decimal,
        unit_price: Decimal,
        discount: Decimal,
    ) -> Self {
        self.lines.push(
            LineCandidateBuilder::new(product)
                .quantity(quantity)
                .unit_price(unit_price)
                .discount(discount)
                .build(),
        );
        self
    }

    pub fn candidate(mut self, candidate: LineCandidate) -> Self {
        self.lines.push(candidate);
        self
    }

    pub fn charge(mut self, kind: ChargeKind, amount: Decimal) -> Self {
        self.charges.push((kind, Money::new(amount)));
        self
    }

    /// Appends an arbitrary edit, applied after lines and charges
    pub fn edit(mut self, edit: DraftEdit) -> Self {
        self.extra.push(edit);
        self
    }

    /// The edits the builder will replay, in order
    pub fn edits(&self) -> Vec<DraftEdit> {
        let mut edits = Vec::new();
        if !self.document_number.is_empty() {
            edits.push(DraftEdit::SetDocumentNumber {
                value: self.document_number.clone(),
            });
        }
        if !self.document_model.is_empty() {
            edits.push(DraftEdit::SetDocumentModel {
                value: self.document_model.clone(),
            });
        }
        if !self.document_series.is_empty() {
            edits.push(DraftEdit::SetDocumentSeries {
                value: self.document_series.clone(),
            });
        }
        if self.counterparty.is_some() {
            edits.push(DraftEdit::SetCounterparty {
                counterparty: self.counterparty.clone(),
            });
        }
        if self.issue_date.is_some() {
            edits.push(DraftEdit::SetIssueDate { date: self.issue_date });
        }
        if self.movement_date.is_some() {
            edits.push(DraftEdit::SetArrivalOrDepartureDate {
                date: self.movement_date,
            });
        }
        edits.extend(
            self.lines
                .iter()
                .cloned()
                .map(|candidate| DraftEdit::AddLine { candidate }),
        );
        edits.extend(
            self.charges
                .iter()
                .map(|&(kind, amount)| DraftEdit::SetCharge { kind, amount }),
        );
        edits.extend(self.extra.iter().cloned());
        edits
    }

    /// Replays the edits, returning the first rejection
    pub fn try_build(&self) -> Result<InvoiceDraft, DraftError> {
        self.edits()
            .into_iter()
            .try_fold(InvoiceDraft::new(self.direction), |draft, edit| {
                draft.apply(edit, self.today)
            })
    }

    /// Replays the edits, panicking on rejection
    pub fn build(&self) -> InvoiceDraft {
        match self.try_build() {
            Ok(draft) => draft,
            Err(e) => panic!("DraftBuilder edit rejected: {}", e),
        }
    }
}
