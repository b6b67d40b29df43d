#![no_main]

use hostrank_core::{AnalysisConfig, AnalysisError, FlowRecord, analyze_flows};
use libfuzzer_sys::fuzz_target;

// Each input line is `src,dst`. Hosts come from arbitrary bytes, so empty
// fields, loops and heavy multiplicity all show up.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let records: Vec<FlowRecord> = text
        .lines()
        .take(512)
        .map(|line| {
            let (src, dst) = line.split_once(',').unwrap_or((line, ""));
            FlowRecord::new(src, dst)
        })
        .collect();

    let mut config = AnalysisConfig::default();
    config.eigenvector.max_iter = 200;
    config.pagerank.max_iter = 200;

    match analyze_flows(&records, &config) {
        Ok(report) => {
            assert!(report.table.len() <= records.len() * 2);
            for row in report.table.rows() {
                assert!((row.in_degree + row.out_degree - row.degree).abs() < 1e-9);
                for value in row.values().into_iter().flatten() {
                    assert!(value.is_finite());
                }
            }
        }
        Err(AnalysisError::MalformedInput { record, .. }) => assert!(record < records.len()),
        Err(other) => panic!("unexpected error: {other}"),
    }
});
