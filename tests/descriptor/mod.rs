// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use objinspect::heap::Heap;
use objinspect::*;

fn sample() -> Result<(Heap, NodeDescriptor)> {
    let mut heap = Heap::new();
    let x = heap.atomic(NodeKind::Integer, 2)?;
    let names = heap.strings(&["x", "y"])?;
    let list = heap.list(&[x, heap.nil()])?;
    heap.set_names(list, &[Some("x"), Some("y")])?;
    let attrs = heap.pairlist(&[(Some("names"), names)])?;
    heap.set_attributes(list, attrs)?;
    let env = heap.env(heap.global_env())?;
    heap.bind(env, "lst", list)?;
    heap.bind(env, "alias", list)?;

    let snapshot = inspect(&heap, &heap, env, ExpansionPolicy::new())?;
    Ok((heap, snapshot))
}

#[test]
fn json_round_trip() -> Result<()> {
    let (_, snapshot) = sample()?;
    let json = snapshot.to_json_str()?;
    let parsed = NodeDescriptor::from_json_str(&json)?;
    assert_eq!(parsed, snapshot);
    Ok(())
}

#[test]
fn json_shape() -> Result<()> {
    let (heap, snapshot) = sample()?;
    let json: serde_json::Value = serde_json::from_str(&snapshot.to_json_str()?)?;

    assert_eq!(json["id"], 1);
    assert_eq!(json["kind"], "environment");
    assert_eq!(json["seen"], false);
    assert!(json.get("value").is_none());
    assert!(json.get("true_length").is_none());

    let alias = &json["children"][0];
    assert_eq!(alias["name"], "alias");
    assert_eq!(alias["kind"], "list");
    assert_eq!(alias["children"][1]["name"], "y");
    assert_eq!(alias["children"][1]["kind"], "nil");
    assert_eq!(alias["children"][1]["address"], heap.address(heap.nil()).to_string());

    let lst = &json["children"][1];
    assert_eq!(lst["seen"], true);
    assert!(lst.get("children").is_none());

    let enclos = &json["children"][2];
    assert_eq!(enclos["name"], "_enclos");
    assert_eq!(enclos["value"], "global");
    Ok(())
}

#[test]
fn addresses_serialize_as_hex() -> Result<()> {
    let address = Address(0x5581_2a0c_3f28);
    assert_eq!(address.to_string(), "0x55812a0c3f28");
    assert_eq!(serde_json::to_string(&address)?, "\"0x55812a0c3f28\"");
    assert_eq!(serde_json::from_str::<Address>("\"0x55812a0c3f28\"")?, address);
    assert_eq!(serde_json::from_str::<Address>("4096")?, Address(4096));
    assert!(serde_json::from_str::<Address>("\"0xnothex\"").is_err());
    Ok(())
}

#[test]
fn lookup_helpers() -> Result<()> {
    let (_, snapshot) = sample()?;
    assert_eq!(snapshot.child_names(), vec![Some("alias"), Some("lst"), Some("_enclos")]);

    let alias = snapshot.child("alias").map(|d| d.id);
    assert_eq!(alias, Some(2));
    assert_eq!(snapshot.child("lst").map(|d| (d.id, d.seen)), Some((2, true)));
    assert!(snapshot.child("missing").is_none());

    let list = snapshot.find(2).map(|d| d.child_names());
    assert_eq!(list, Some(vec![Some("x"), Some("y"), Some("_attrib")]));
    assert!(snapshot.find(99).is_none());
    Ok(())
}

#[test]
fn policy_deserializes_with_defaults() -> Result<()> {
    let policy: ExpansionPolicy = serde_json::from_str(r#"{"expand_frames": true}"#)?;
    assert_eq!(policy, ExpansionPolicy::new().with_expand_frames(true));
    let policy: ExpansionPolicy = serde_json::from_str("{}")?;
    assert_eq!(policy, ExpansionPolicy::default());
    Ok(())
}

#[test]
fn kinds_serialize_by_name() -> Result<()> {
    assert_eq!(serde_json::to_string(&NodeKind::ExternalPtr)?, "\"externalptr\"");
    assert_eq!(serde_json::from_str::<NodeKind>("\"closure\"")?, NodeKind::Closure);
    assert_eq!(
        serde_json::from_str::<NodeKind>("\"altrep_wrapper\"")?,
        NodeKind::Unrecognized("altrep_wrapper".to_string())
    );
    Ok(())
}

#[test]
fn deep_json_round_trip() -> Result<()> {
    const DEPTH: usize = 500;

    let mut heap = Heap::new();
    let mut node = heap.atomic(NodeKind::Raw, 1)?;
    for _ in 0..DEPTH {
        node = heap.list(&[node])?;
    }
    let snapshot = inspect(&heap, &heap, node, ExpansionPolicy::new())?;

    let parsed = NodeDescriptor::from_json_str(&snapshot.to_json_str()?)?;
    assert_eq!(parsed.distinct_count(), DEPTH + 1);
    for (got, want) in parsed.iter().zip(snapshot.iter()) {
        assert_eq!((got.id, got.address, &got.kind), (want.id, want.address, &want.kind));
    }
    Ok(())
}
