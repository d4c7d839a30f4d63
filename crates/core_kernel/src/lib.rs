//! Core Kernel - Foundational types for the back-office invoice engine
//!
//! This crate provides the building blocks shared by the domain and the API:
//! - Money with precise decimal arithmetic and cent-exact apportionment
//! - Strongly-typed identifiers
//! - A clock abstraction for date rules
//! - The port error type used by reference-data adapters

pub mod money;
pub mod identifiers;
pub mod calendar;
pub mod ports;

pub use money::{Money, MoneyError, DISPLAY_SCALE};
pub use identifiers::{CarrierId, DraftId, IdParseError, PartyId, PaymentConditionId, ProductId};
pub use calendar::{Clock, SystemClock, FixedClock};
pub use ports::{PortError, DomainPort};
