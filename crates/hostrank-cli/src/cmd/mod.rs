pub mod analyze;
pub mod batch;
pub mod completions;
pub mod config;

use clap::Args;

use crate::config::{ColumnRef, InputConfig};

/// CSV layout flags shared by `analyze` and `batch`.
#[derive(Args, Debug, Default, Clone)]
pub struct InputArgs {
    /// Source host column, by header name or zero-based index.
    #[arg(long, value_name = "COLUMN")]
    pub source_column: Option<ColumnRef>,

    /// Destination host column, by header name or zero-based index.
    #[arg(long, value_name = "COLUMN")]
    pub dest_column: Option<ColumnRef>,

    /// Field separator (single ASCII character).
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,
}

impl InputArgs {
    pub fn apply(&self, input: &mut InputConfig) {
        if let Some(column) = &self.source_column {
            input.source_column = column.clone();
        }
        if let Some(column) = &self.dest_column {
            input.dest_column = column.clone();
        }
        if let Some(delimiter) = self.delimiter {
            input.delimiter = delimiter;
        }
    }
}
