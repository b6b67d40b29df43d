//! Attribute CSV export.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use hostrank_core::CentralityResultTable;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Attribute file path for `input`: `<file name><suffix>`, beside the input
/// or inside `output_dir`.
pub fn attribute_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Write one row per host. Missing scores become empty cells.
pub fn write_table<W: Write>(writer: W, table: &CentralityResultTable) -> Result<()> {
    // Header is written explicitly so an empty table still has one.
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(CentralityResultTable::COLUMNS)?;
    for row in table.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_table_file(path: &Path, table: &CentralityResultTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_table(file, table).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostrank_core::HostScores;

    fn sample() -> CentralityResultTable {
        CentralityResultTable::from_rows(vec![
            HostScores {
                host: "10.0.0.1".into(),
                degree: 2.0,
                in_degree: 1.0,
                out_degree: 1.0,
                closeness: Some(0.5),
                eigenvector: None,
                pagerank: Some(0.1),
                alpha_centrality: Some(1.0 / 0.9),
            },
        ])
    }

    #[test]
    fn header_and_empty_cells() {
        let mut buf = Vec::new();
        write_table(&mut buf, &sample()).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("host,degree,in_degree,out_degree,closeness,eigenvector,pagerank,alpha_centrality")
        );
        let row: Vec<&str> = lines.next().expect("row").split(',').collect();
        assert_eq!(row[0], "10.0.0.1");
        assert_eq!(row[5], "");
        assert_eq!(row[7].parse::<f64>().expect("float"), 1.0 / 0.9);
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_table_still_has_header() {
        let mut buf = Vec::new();
        write_table(&mut buf, &CentralityResultTable::default()).expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8").lines().count(), 1);
    }

    #[test]
    fn attribute_path_keeps_full_file_name() {
        let input = Path::new("/data/CTU-13/5/capture.binetflow");
        assert_eq!(
            attribute_path(input, None, "_attributes.csv"),
            PathBuf::from("/data/CTU-13/5/capture.binetflow_attributes.csv")
        );
        assert_eq!(
            attribute_path(input, Some(Path::new("/out")), "_attributes.csv"),
            PathBuf::from("/out/capture.binetflow_attributes.csv")
        );
    }
}
