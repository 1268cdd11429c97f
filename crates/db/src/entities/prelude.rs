//! Entity re-exports.

pub use super::check_run_workflows::Entity as CheckRunWorkflows;
pub use super::demographics::Entity as Demographics;
pub use super::distribution_payees::Entity as DistributionPayees;
pub use super::distributions::Entity as Distributions;
pub use super::profit_share_checks::Entity as ProfitShareChecks;
