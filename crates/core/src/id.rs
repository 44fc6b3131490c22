//! Strongly-typed identifiers used across the domain.
//!
//! These are validated string newtypes: construction is the only place
//! validation happens, so a held value is always well-formed. Keys coming in
//! from data files go through `TryFrom<String>`, which serde also uses when
//! deserializing.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A candidate identifier was empty (or whitespace-only).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} must not be empty")]
pub struct IdError {
    kind: &'static str,
}

/// Key of a product in the base-stock table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductCode(String);

/// Identifier of a project drawing from base stock.
///
/// Projects are a small fixed set in any given deployment, but the set is a
/// property of the loaded demand tables, not of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

/// The acting principal recorded against every committed mutation.
///
/// Supplied by the hosting session layer; the ledger records it verbatim and
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Validate and wrap a raw string. Surrounding whitespace is
            /// trimmed (spreadsheet cells carry stray spaces).
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(IdError { kind: $name });
                }
                if trimmed.len() == value.len() {
                    Ok(Self(value))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_newtype!(ProductCode, "ProductCode");
impl_string_newtype!(ProjectId, "ProjectId");
impl_string_newtype!(Actor, "Actor");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_code_trims_and_keeps_content() {
        let code = ProductCode::new("  C-1001 ").unwrap();
        assert_eq!(code.as_str(), "C-1001");
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(ProductCode::new("").is_err());
        assert!(ProjectId::new("   ").is_err());
        assert!(Actor::new("\t").is_err());
    }

    #[test]
    fn parse_round_trips_through_display() {
        let project: ProjectId = "LFP EV".parse().unwrap();
        assert_eq!(project.to_string(), "LFP EV");
    }
}
