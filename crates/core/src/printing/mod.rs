//! Print file rendering.
//!
//! # Modules
//!
//! - `micr` - MICR line formatter trait and the E-13B implementation
//! - `djde` - Xerox DJDE template trait and the profit-sharing check template
//! - `standard` - Human-readable check blocks

pub mod djde;
pub mod micr;
pub mod standard;

use std::sync::Arc;

use crate::checks::request::PrinterType;
use crate::checks::types::CheckLineItem;

pub use djde::{DjdeTemplate, ProfitShareCheckTemplate};
pub use micr::{E13bMicrFormatter, MicrFormatter};
pub use standard::{format_amount, render_block};

/// Separator between consecutive checks in a print file.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Renders line items into print file content for a printer type.
#[derive(Clone)]
pub struct PrintFileRenderer {
    micr: Arc<dyn MicrFormatter>,
    djde: Arc<dyn DjdeTemplate>,
}

impl PrintFileRenderer {
    /// Creates a renderer from the two formatters.
    #[must_use]
    pub fn new(micr: Arc<dyn MicrFormatter>, djde: Arc<dyn DjdeTemplate>) -> Self {
        Self { micr, djde }
    }

    /// E-13B MICR lines for `routing_number` and the default check template.
    #[must_use]
    pub fn with_routing_number(routing_number: &str) -> Self {
        Self::new(
            Arc::new(E13bMicrFormatter::new(routing_number)),
            Arc::new(ProfitShareCheckTemplate::default()),
        )
    }

    /// One rendered block per item, in order, separated by a blank line.
    #[must_use]
    pub fn render(&self, printer_type: PrinterType, items: &[CheckLineItem]) -> String {
        let blocks: Vec<String> = match printer_type {
            PrinterType::XeroxDjde => items
                .iter()
                .map(|item| self.djde.generate_directives(item))
                .collect(),
            PrinterType::Standard => items
                .iter()
                .map(|item| render_block(item, self.micr.as_ref()))
                .collect(),
        };
        blocks.join(BLOCK_SEPARATOR)
    }
}
