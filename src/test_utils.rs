// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch, clippy::unused_trait_names)]

//! Shared helpers for YAML-driven snapshot tests.

use crate::NodeDescriptor;
use anyhow::{bail, Result};
use std::collections::BTreeSet;

/// Diff-friendly equality helper for whole snapshots.
pub fn match_snapshots(computed: &NodeDescriptor, expected: &NodeDescriptor) -> Result<()> {
    if computed != expected {
        let expected_yaml = serde_yaml::to_string(expected)?;
        let computed_yaml = serde_yaml::to_string(computed)?;
        bail!(
            "snapshots differ:\n{}",
            prettydiff::diff_lines(&expected_yaml, &computed_yaml)
        );
    }
    Ok(())
}

/// Checks the id and seen-flag invariants every snapshot must satisfy.
///
/// Walking the tree in pre-order, fully expanded nodes carry ids 1, 2, 3, ...
/// and stubs only refer to ids already expanded.
pub fn check_identity_invariants(snapshot: &NodeDescriptor) -> Result<()> {
    let mut expanded = BTreeSet::new();
    let mut next = 1;
    for node in snapshot.iter() {
        if node.seen {
            if !expanded.contains(&node.id) {
                bail!("stub for id {} appears before its expansion", node.id);
            }
            if !node.children.is_empty() {
                bail!("stub for id {} has children", node.id);
            }
        } else {
            if node.id != next {
                bail!("expected id {next} in pre-order, found {}", node.id);
            }
            expanded.insert(node.id);
            next += 1;
        }

        if node.true_length.is_some() && !node.kind.is_vector_like() {
            bail!("id {} is a {} but reports a true length", node.id, node.kind);
        }
        if node.true_length == Some(0) {
            bail!("id {} reports a zero true length", node.id);
        }
    }
    Ok(())
}
