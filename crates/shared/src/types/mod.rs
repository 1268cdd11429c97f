//! Common types used across the application.

pub mod id;
pub mod ssn;

pub use id::*;
pub use ssn::{Ssn, SsnError};
