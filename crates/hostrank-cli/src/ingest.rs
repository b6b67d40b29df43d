//! Flow capture ingestion: delimited text with a header row.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use hostrank_core::FlowRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::{ColumnRef, InputConfig};

/// Read every flow record from the capture at `path`.
pub fn read_flows(path: &Path, input: &InputConfig) -> Result<Vec<FlowRecord>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let flows = read_flows_from(file, input)
        .with_context(|| format!("Failed to read flows from {}", path.display()))?;
    debug!(path = %path.display(), flows = flows.len(), "capture loaded");
    Ok(flows)
}

/// Read flow records from any reader. Host fields are trimmed; an empty one
/// is passed through so graph construction can reject it with its position.
pub fn read_flows_from<R: Read>(reader: R, input: &InputConfig) -> Result<Vec<FlowRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(input.delimiter_byte()?)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let src = resolve_column(&headers, &input.source_column)?;
    let dst = resolve_column(&headers, &input.dest_column)?;

    let mut flows = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse data row {}", row + 1))?;
        flows.push(FlowRecord::new(
            record.get(src).unwrap_or_default(),
            record.get(dst).unwrap_or_default(),
        ));
    }
    Ok(flows)
}

fn resolve_column(headers: &StringRecord, column: &ColumnRef) -> Result<usize> {
    match column {
        ColumnRef::Name(name) => headers
            .iter()
            .position(|h| h == name.as_str())
            .with_context(|| format!("column `{name}` not found in header")),
        ColumnRef::Index(i) if *i < headers.len() => Ok(*i),
        ColumnRef::Index(i) => bail!(
            "column index {i} out of range (header has {} columns)",
            headers.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = "\
StartTime,Dur,Proto,SrcAddr,Sport,Dir,DstAddr,Dport
2011/08/10 09:46:53,1.0,tcp,147.32.84.165,1025,->,147.32.80.9,53
2011/08/10 09:46:54,0.2,udp, 147.32.80.9 ,53,<-,147.32.84.165,1025
";

    #[test]
    fn reads_named_columns() {
        let flows = read_flows_from(CAPTURE.as_bytes(), &InputConfig::default()).expect("read");
        assert_eq!(
            flows,
            vec![
                FlowRecord::new("147.32.84.165", "147.32.80.9"),
                FlowRecord::new("147.32.80.9", "147.32.84.165"),
            ]
        );
    }

    #[test]
    fn reads_indexed_columns_with_custom_delimiter() {
        let input = InputConfig {
            source_column: ColumnRef::Index(0),
            dest_column: ColumnRef::Index(1),
            delimiter: '\t',
        };
        let flows = read_flows_from("a\tb\nx\ty\n".as_bytes(), &input).expect("read");
        assert_eq!(flows, vec![FlowRecord::new("x", "y")]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let input = InputConfig {
            dest_column: ColumnRef::Name("Target".into()),
            ..InputConfig::default()
        };
        let err = read_flows_from(CAPTURE.as_bytes(), &input).expect_err("missing");
        assert!(err.to_string().contains("Target"));
    }

    #[test]
    fn short_row_yields_empty_host() {
        let flows = read_flows_from("SrcAddr,DstAddr\n10.0.0.1\n".as_bytes(), &InputConfig::default())
            .expect("read");
        assert_eq!(flows, vec![FlowRecord::new("10.0.0.1", "")]);
    }

    #[test]
    fn header_only_is_empty() {
        let flows =
            read_flows_from("SrcAddr,DstAddr\n".as_bytes(), &InputConfig::default()).expect("read");
        assert!(flows.is_empty());
    }
}
