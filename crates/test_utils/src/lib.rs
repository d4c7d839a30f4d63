//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! invoice draft test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built reference data and dates
//! - `builders`: Builders that drive drafts through real edits
//! - `assertions`: Custom assertion helpers for money and snapshots
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
