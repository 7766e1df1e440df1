// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use objinspect::heap::Heap;
use objinspect::*;

fn ids(snapshot: &NodeDescriptor) -> Vec<(u32, bool)> {
    snapshot.iter().map(|d| (d.id, d.seen)).collect()
}

#[test]
fn ids_follow_first_visit_order() -> Result<()> {
    let mut heap = Heap::new();
    let x = heap.atomic(NodeKind::Integer, 1)?;
    let y = heap.atomic(NodeKind::Real, 1)?;
    let inner = heap.list(&[y, x])?;
    let outer = heap.list(&[x, inner, y])?;

    let snapshot = inspect(&heap, &heap, outer, ExpansionPolicy::new())?;
    assert_eq!(
        ids(&snapshot),
        vec![(1, false), (2, false), (3, false), (4, false), (2, true), (4, true)]
    );
    assert_eq!(snapshot.distinct_count(), 4);
    assert_eq!(snapshot.find(3).map(|d| d.kind.clone()), Some(NodeKind::List));
    Ok(())
}

#[test]
fn cyclic_environments_terminate() -> Result<()> {
    let mut heap = Heap::new();
    let outer = heap.env(heap.global_env())?;
    let inner = heap.env(outer)?;
    heap.bind(outer, "child", inner)?;
    heap.bind(inner, "parent", outer)?;
    heap.bind(inner, "me", inner)?;

    let snapshot = Inspector::new(&heap, &heap).inspect(inner)?;
    assert_eq!(snapshot.child_names(), vec![Some("me"), Some("parent"), Some("_enclos")]);

    let me = &snapshot.children[0].node;
    assert!(me.seen);
    assert_eq!(me.id, 1);

    let parent = &snapshot.children[1].node;
    assert_eq!(parent.id, 2);
    assert!(!parent.seen);
    assert_eq!(parent.child_names(), vec![Some("child"), Some("_enclos")]);
    assert!(parent.children[0].node.seen);
    assert_eq!(parent.child("_enclos").map(|d| d.id), Some(3));

    let enclos = &snapshot.children[2].node;
    assert_eq!((enclos.id, enclos.seen), (2, true));
    assert_eq!(snapshot.distinct_count(), 3);
    Ok(())
}

#[test]
fn deep_nesting_does_not_exhaust_the_stack() -> Result<()> {
    const DEPTH: usize = 200_000;

    let mut heap = Heap::new();
    let mut node = heap.atomic(NodeKind::Logical, 1)?;
    for _ in 0..DEPTH {
        node = heap.list(&[node])?;
    }

    let snapshot = inspect(&heap, &heap, node, ExpansionPolicy::new())?;
    assert_eq!(snapshot.distinct_count(), DEPTH + 1);

    let mut current = &snapshot;
    let mut depth = 0;
    while let Some(child) = current.children.first() {
        assert_eq!(child.node.id, current.id + 1);
        current = &child.node;
        depth += 1;
    }
    assert_eq!(depth, DEPTH);
    assert_eq!(current.kind, NodeKind::Logical);
    Ok(())
}

#[test]
fn compact_length_is_the_materialized_length() -> Result<()> {
    let mut heap = Heap::new();
    let seq = heap.atomic(NodeKind::Integer, 1_000_000)?;
    let class = heap.atomic(NodeKind::Raw, 0)?;
    let info = heap.atomic(NodeKind::Real, 3)?;
    let nil = heap.nil();
    heap.set_compact(seq, class, "compact_intseq", info, nil)?;

    for policy in [
        ExpansionPolicy::new(),
        ExpansionPolicy::new().with_expand_compact(true),
    ] {
        let snapshot = inspect(&heap, &heap, seq, policy)?;
        assert_eq!(snapshot.kind, NodeKind::Integer);
        assert_eq!(snapshot.length, 1_000_000);
        assert!(snapshot.compact);
    }
    Ok(())
}

#[test]
fn true_length_reported_only_when_tracked() -> Result<()> {
    let mut heap = Heap::new();
    let grown = heap.atomic(NodeKind::Real, 3)?;
    heap.set_capacity(grown, 16)?;
    let plain = heap.atomic(NodeKind::Real, 3)?;
    let list = heap.list(&[grown, plain])?;
    heap.set_capacity(list, 2)?;

    let snapshot = inspect(&heap, &heap, list, ExpansionPolicy::new())?;
    assert_eq!(snapshot.true_length, Some(2));
    assert_eq!(snapshot.children[0].node.true_length, Some(16));
    assert_eq!(snapshot.children[1].node.true_length, None);
    Ok(())
}

#[test]
fn inspection_leaves_reference_counts_alone() -> Result<()> {
    let mut heap = Heap::new();
    let shared = heap.atomic(NodeKind::Integer, 1)?;
    let a = heap.list(&[shared])?;
    let b = heap.list(&[shared, a])?;
    let before: Vec<u32> = [shared, a, b].iter().map(|n| heap.ref_count(*n)).collect();

    let first = inspect(&heap, &heap, b, ExpansionPolicy::new())?;
    let second = inspect(&heap, &heap, b, ExpansionPolicy::new())?;

    let after: Vec<u32> = [shared, a, b].iter().map(|n| heap.ref_count(*n)).collect();
    assert_eq!(before, after);
    assert_eq!(first, second);
    assert_eq!(first.children[0].node.ref_count.get(), 2);
    assert!(first.children[0].node.ref_count.is_shared());
    Ok(())
}

#[test]
fn unrecognized_kind_aborts_inspection() -> Result<()> {
    let mut heap = Heap::new();
    let odd = heap.unrecognized("altfloat")?;
    let ok = heap.atomic(NodeKind::Integer, 1)?;
    let list = heap.list(&[ok, odd])?;

    let err = match inspect(&heap, &heap, list, ExpansionPolicy::new()) {
        Ok(snapshot) => panic!("expected failure, got {snapshot:?}"),
        Err(err) => err,
    };
    match err.downcast_ref::<InspectError>() {
        Some(InspectError::UnrecognizedKind { kind }) => assert_eq!(kind, "altfloat"),
        None => panic!("unexpected error {err}"),
    }
    Ok(())
}

#[test]
fn resolver_decides_which_environments_are_leaves() -> Result<()> {
    let mut heap = Heap::new();
    let ns = heap.namespace("stats", heap.base_env())?;
    let x = heap.atomic(NodeKind::Integer, 1)?;
    heap.bind(ns, "x", x)?;

    let with_packages = inspect(&heap, &heap, ns, ExpansionPolicy::new())?;
    assert_eq!(with_packages.value.as_deref(), Some("stats"));
    assert!(with_packages.children.is_empty());

    let without_packages = Inspector::new(&heap, &NoNamespaces).inspect(ns)?;
    assert_eq!(without_packages.value, None);
    assert_eq!(without_packages.child_names(), vec![Some("x"), Some("_enclos")]);
    assert_eq!(
        without_packages
            .child("_enclos")
            .and_then(|d| d.value.as_deref()),
        Some("base")
    );
    Ok(())
}

#[test]
fn policy_applies_per_inspection() -> Result<()> {
    let mut heap = Heap::new();
    let text = heap.strings(&["a", "b"])?;

    let mut inspector = Inspector::new(&heap, &heap);
    assert!(inspector.inspect(text)?.children.is_empty());

    inspector.set_policy(ExpansionPolicy::new().with_expand_atomic_text(true));
    let expanded = inspector.inspect(text)?;
    assert_eq!(expanded.child_names(), vec![None, None]);
    assert!(expanded.children.iter().all(|c| c.node.kind == NodeKind::Char));
    Ok(())
}
