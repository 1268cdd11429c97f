//! Check issuance: number allocation, identity resolution, payee rules and
//! the batch generator that ties them together.

pub mod allocator;
pub mod demographic;
pub mod generator;
pub mod payee;
pub mod policy;
pub mod request;
pub mod types;

#[cfg(test)]
mod props;

pub use allocator::CheckNumberAllocator;
pub use demographic::{DEMOGRAPHICS_FIELD, DemographicResolver, select_current};
pub use generator::{CheckBatchGenerator, CheckRunCollaborators, DISTRIBUTION_IDS_FIELD};
pub use payee::{PayableName, check_amount, payable_name};
pub use policy::CheckRunPolicy;
pub use request::{CheckPrintRequest, CheckPrintResult, PRINT_FILE_CONTENT_TYPE, PrinterType};
pub use types::{CheckLineItem, Demographic, Distribution, ProfitShareCheck};

pub use crate::workflow::IS_REPRINT_FIELD;
