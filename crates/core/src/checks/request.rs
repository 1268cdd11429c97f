//! Input and output of a check run.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use checkrun_shared::CheckRunId;

use crate::error::CheckRunError;

/// Content type of every generated print file.
pub const PRINT_FILE_CONTENT_TYPE: &str = "text/plain";

/// Printer the output is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrinterType {
    /// Human-readable blocks with a MICR line per check.
    Standard,
    /// Xerox DJDE directive stream for check-stock printers.
    XeroxDjde,
}

impl PrinterType {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::XeroxDjde => "XeroxDjde",
        }
    }

    /// Name of the file the output is delivered as.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Standard => "PROFCHKS.txt",
            Self::XeroxDjde => "PROFCHKS_DJDE.txt",
        }
    }
}

impl fmt::Display for PrinterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrinterType {
    type Err = CheckRunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "standard" => Ok(Self::Standard),
            "xeroxdjde" => Ok(Self::XeroxDjde),
            _ => Err(CheckRunError::UnsupportedPrinterType(s.to_string())),
        }
    }
}

impl TryFrom<String> for PrinterType {
    type Error = CheckRunError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrinterType> for String {
    fn from(printer: PrinterType) -> Self {
        printer.as_str().to_string()
    }
}

/// Request to print (or reprint) checks for a batch of distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPrintRequest {
    /// Distributions to pay. Non-positive and duplicate ids are ignored.
    pub distribution_ids: Vec<i64>,
    /// Profit year of the run.
    pub profit_year: i32,
    /// Date of the run; printed as the check date.
    pub check_run_date: NaiveDate,
    /// Identity of the caller.
    pub user_name: String,
    /// Void and reissue the active run's checks instead of starting a run.
    #[serde(default)]
    pub is_reprint: bool,
    /// Output format.
    pub printer_type: PrinterType,
}

impl CheckPrintRequest {
    /// Positive ids, duplicates removed, first occurrence order kept.
    #[must_use]
    pub fn normalized_distribution_ids(&self) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        self.distribution_ids
            .iter()
            .copied()
            .filter(|id| *id > 0 && seen.insert(*id))
            .collect()
    }
}

/// The generated print file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPrintResult {
    /// Run the checks belong to.
    pub run_id: CheckRunId,
    /// File name derived from the printer type.
    pub file_name: String,
    /// Always `text/plain`.
    pub content_type: String,
    /// Formatted print content.
    pub content: String,
    /// Number of checks issued.
    pub check_count: usize,
}
