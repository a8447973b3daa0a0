// SPDX-License-Identifier: MIT

//! Random small-DAG generation for property tests. Gated behind
//! `test-support` so other crates can pull it in as a dev-dependency
//! feature instead of depending on `proptest` directly for their own
//! trail-shaped fixtures.
//!
//! This module is test-support code even when the `test-support` feature
//! (rather than `cfg(test)`) is what compiles it in, so its `expect()`
//! calls on constructions that are correct by construction are exempted
//! from the workspace's deny-by-default clippy lints here directly.
#![allow(clippy::expect_used)]

use proptest::prelude::*;

use crate::trail::{Step, Trail};

/// A DAG of 2-8 steps named `s0..sN`, edges only from a lower index to a
/// higher one. Acyclic by construction, so `build()` always succeeds —
/// tests built on this strategy exercise the invariants that follow from a
/// *valid* trail, not cycle rejection (which `trail_tests.rs` covers
/// directly).
pub fn small_dag() -> impl Strategy<Item = Trail> {
    (2usize..=8)
        .prop_flat_map(|n| {
            let mut possible_edges = Vec::new();
            for i in 0..n {
                for j in (i + 1)..n {
                    possible_edges.push((i, j));
                }
            }
            let edge_flags = prop::collection::vec(prop::bool::ANY, possible_edges.len());
            (Just(n), Just(possible_edges), edge_flags)
        })
        .prop_map(|(n, possible_edges, flags)| {
            let names: Vec<String> = (0..n).map(|i| format!("s{i}")).collect();
            let mut builder = Trail::builder();
            for name in &names {
                builder = builder.add_step(Step::new(name.as_str(), name.as_str())).expect("unique name");
            }
            for (&(i, j), &include) in possible_edges.iter().zip(flags.iter()) {
                if include {
                    builder = builder.add_edge(names[i].as_str(), names[j].as_str()).expect("valid edge");
                }
            }
            builder.build().expect("acyclic by construction")
        })
}
