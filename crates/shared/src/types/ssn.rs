//! Social Security Number value type.
//!
//! SSNs are stored as integers by the upstream data model. This type keeps
//! the raw value away from logs: both `Debug` and `Display` render the masked
//! form (`xxx-xx-1234`). Use [`Ssn::to_fixed_width`] where the full nine
//! digits are genuinely required (print files).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_SSN: i32 = 999_999_999;

/// Error returned when an integer cannot be an SSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("SSN must be between 0 and 999999999")]
pub struct SsnError;

/// A nine-digit Social Security Number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Ssn(i32);

impl Ssn {
    /// Creates an SSN from its integer value.
    ///
    /// # Errors
    ///
    /// Returns `SsnError` if the value is negative or has more than nine digits.
    pub const fn new(value: i32) -> Result<Self, SsnError> {
        if value < 0 || value > MAX_SSN {
            return Err(SsnError);
        }
        Ok(Self(value))
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Renders all nine digits, zero-padded.
    #[must_use]
    pub fn to_fixed_width(self) -> String {
        format!("{:09}", self.0)
    }

    /// Renders the SSN with everything but the last four digits hidden.
    #[must_use]
    pub fn masked(self) -> String {
        format!("xxx-xx-{:04}", self.0 % 10_000)
    }
}

impl TryFrom<i32> for Ssn {
    type Error = SsnError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ssn> for i32 {
    fn from(ssn: Ssn) -> Self {
        ssn.0
    }
}

impl fmt::Debug for Ssn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssn({})", self.masked())
    }
}

impl fmt::Display for Ssn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}
