//! Strongly-typed identifiers
//!
//! Each identifier wraps a UUID and displays with a short type prefix
//! (`DRF-…`, `PRD-…`). Parsing accepts either the prefixed form or a bare
//! UUID, and refuses an identifier carrying another type's prefix so a
//! carrier id cannot be passed where a product id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Length of a hyphenated UUID
const UUID_LEN: usize = 36;

/// Error returned when an identifier string cannot be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("expected a {expected} identifier, got prefix {found}")]
    WrongPrefix {
        expected: &'static str,
        found: String,
    },

    #[error("invalid identifier: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

/// Splits `XXX-<uuid>` into prefix and UUID; bare UUIDs have no prefix
fn split_prefixed(s: &str) -> (Option<&str>, &str) {
    match s.split_once('-') {
        Some((prefix, rest))
            if rest.len() == UUID_LEN && prefix.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            (Some(prefix), rest)
        }
        _ => (None, s),
    }
}

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match split_prefixed(s.trim()) {
                    (Some(prefix), _) if prefix != Self::PREFIX => Err(IdParseError::WrongPrefix {
                        expected: Self::PREFIX,
                        found: prefix.to_string(),
                    }),
                    (_, raw) => Ok(Self(Uuid::parse_str(raw)?)),
                }
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(DraftId, "DRF");

// Reference data owned by other systems
define_id!(ProductId, "PRD");
define_id!(PartyId, "PTY");
define_id!(CarrierId, "CAR");
define_id!(PaymentConditionId, "PCD");
