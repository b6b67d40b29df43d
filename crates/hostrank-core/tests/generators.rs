//! Shared proptest strategies and seeded fixtures for hostrank-core tests.

#![allow(dead_code)]

use hostrank_core::flow::FlowRecord;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Host identifier drawn from a small pool so flows collide and form
/// parallel edges, loops and cycles.
pub fn arb_host() -> impl Strategy<Value = String> {
    (0u8..8).prop_map(|i| format!("10.0.0.{i}"))
}

pub fn arb_flow() -> impl Strategy<Value = FlowRecord> {
    (arb_host(), arb_host()).prop_map(|(src, dst)| FlowRecord::new(src, dst))
}

pub fn arb_flows(max: usize) -> impl Strategy<Value = Vec<FlowRecord>> {
    prop::collection::vec(arb_flow(), 0..max)
}

/// Deterministic pseudo-random capture of `flows` records over `hosts` hosts.
pub fn seeded_flows(seed: u64, hosts: usize, flows: usize) -> Vec<FlowRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..flows)
        .map(|_| {
            let src = rng.gen_range(0..hosts);
            let dst = rng.gen_range(0..hosts);
            FlowRecord::new(format!("h{src}"), format!("h{dst}"))
        })
        .collect()
}

pub fn flows(pairs: &[(&str, &str)]) -> Vec<FlowRecord> {
    pairs.iter().map(|&p| p.into()).collect()
}
