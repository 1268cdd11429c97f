//! Fixed policy values for a check run.

use checkrun_shared::CheckRunConfig;

/// Policy values shared by every run of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRunPolicy {
    /// Bank routing number the MICR line is bound to.
    pub bank_routing_number: String,
    /// Reprint limit assigned to new runs.
    pub max_reprint_count: i32,
    /// Payable name field width, in characters.
    pub max_payable_name_length: usize,
    /// Placeholder for a blank payable name.
    pub default_payable_name: String,
}

impl Default for CheckRunPolicy {
    fn default() -> Self {
        Self::from(&CheckRunConfig::default())
    }
}

impl From<&CheckRunConfig> for CheckRunPolicy {
    fn from(config: &CheckRunConfig) -> Self {
        Self {
            bank_routing_number: config.bank_routing_number.clone(),
            max_reprint_count: config.max_reprint_count,
            max_payable_name_length: config.max_payable_name_length,
            default_payable_name: config.default_payable_name.clone(),
        }
    }
}
