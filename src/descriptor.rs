// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::kind::NodeKind;

use core::fmt;

use anyhow::{anyhow, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Identity of a heap node: its address in the host heap.
///
/// Only ever compared and displayed, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub usize);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct AddressVisitor;

impl Visitor<'_> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a hexadecimal address such as 0x1f40")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let digits = v
            .strip_prefix("0x")
            .or_else(|| v.strip_prefix("0X"))
            .unwrap_or(v);
        usize::from_str_radix(digits, 16)
            .map(Address)
            .map_err(|e| E::custom(format!("invalid address {v}: {e}")))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        usize::try_from(v)
            .map(Address)
            .map_err(|_| E::custom(format!("address {v} does not fit in usize")))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AddressVisitor)
    }
}

/// Bucketed reference-count indicator.
///
/// Hosts report how many references a node has in whatever precision they
/// track; the inspector only keeps a saturating bucket so the number is never
/// mistaken for an exact count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefCountHint(u8);

impl RefCountHint {
    pub const MAX: RefCountHint = RefCountHint(7);

    pub fn saturating(raw: u32) -> Self {
        match u8::try_from(raw) {
            Ok(n) if n < Self::MAX.0 => RefCountHint(n),
            _ => Self::MAX,
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_shared(self) -> bool {
        self.0 > 1
    }
}

impl fmt::Display for RefCountHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MAX {
            write!(f, "{}+", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Everything known about one node without looking at its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorMetadata {
    pub address: Address,
    pub kind: NodeKind,
    pub length: usize,
    pub true_length: Option<usize>,
    pub compact: bool,
    pub ref_count: RefCountHint,
    pub object: bool,
    pub value: Option<String>,
}

/// One node of an inspection snapshot.
///
/// Serialized as a map; `true_length`, `value` and empty `children` are
/// omitted. A child edge is the child's map with a leading `name` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub id: u32,
    pub address: Address,
    pub kind: NodeKind,
    pub length: usize,
    pub true_length: Option<usize>,
    pub compact: bool,
    pub ref_count: RefCountHint,
    pub object: bool,
    pub value: Option<String>,
    pub seen: bool,
    pub children: Vec<Child>,
}

/// A child edge. Anonymous children (list elements without names, unnamed
/// pair-list cells, text atoms) carry no name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: Option<String>,
    pub node: NodeDescriptor,
}

// Snapshot trees can be as deep as the heap graph, so they are torn down
// iteratively.
impl Drop for NodeDescriptor {
    fn drop(&mut self) {
        let mut pending = core::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.node.children);
        }
    }
}

impl NodeDescriptor {
    fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("address", &self.address)?;
        map.serialize_entry("kind", &self.kind)?;
        map.serialize_entry("length", &self.length)?;
        if let Some(true_length) = &self.true_length {
            map.serialize_entry("true_length", true_length)?;
        }
        map.serialize_entry("compact", &self.compact)?;
        map.serialize_entry("ref_count", &self.ref_count)?;
        map.serialize_entry("object", &self.object)?;
        if let Some(value) = &self.value {
            map.serialize_entry("value", value)?;
        }
        map.serialize_entry("seen", &self.seen)?;
        if !self.children.is_empty() {
            map.serialize_entry("children", &self.children)?;
        }
        Ok(())
    }
}

impl Serialize for NodeDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for Child {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = &self.name {
            map.serialize_entry("name", name)?;
        }
        self.node.serialize_entries(&mut map)?;
        map.end()
    }
}

fn required<T, E: de::Error>(field: Option<T>, name: &'static str) -> Result<T, E> {
    field.ok_or_else(|| E::missing_field(name))
}

// Reads one descriptor map, with the edge name if present.
struct DescriptorVisitor;

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = (Option<String>, NodeDescriptor);

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a node descriptor")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut name = None;
        let mut id = None;
        let mut address = None;
        let mut kind = None;
        let mut length = None;
        let mut true_length = None;
        let mut compact = None;
        let mut ref_count = None;
        let mut object = None;
        let mut value = None;
        let mut seen = None;
        let mut children = vec![];

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "name" => name = map.next_value()?,
                "id" => id = Some(map.next_value()?),
                "address" => address = Some(map.next_value()?),
                "kind" => kind = Some(map.next_value()?),
                "length" => length = Some(map.next_value()?),
                "true_length" => true_length = map.next_value()?,
                "compact" => compact = Some(map.next_value()?),
                "ref_count" => ref_count = Some(map.next_value()?),
                "object" => object = Some(map.next_value()?),
                "value" => value = map.next_value()?,
                "seen" => seen = Some(map.next_value()?),
                "children" => children = map.next_value()?,
                _ => {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
        }

        let node = NodeDescriptor {
            id: required(id, "id")?,
            address: required(address, "address")?,
            kind: required(kind, "kind")?,
            length: required(length, "length")?,
            true_length,
            compact: required(compact, "compact")?,
            ref_count: required(ref_count, "ref_count")?,
            object: required(object, "object")?,
            value,
            seen: required(seen, "seen")?,
            children,
        };
        Ok((name, node))
    }
}

impl<'de> Deserialize<'de> for NodeDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (_, node) = deserializer.deserialize_map(DescriptorVisitor)?;
        Ok(node)
    }
}

impl<'de> Deserialize<'de> for Child {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (name, node) = deserializer.deserialize_map(DescriptorVisitor)?;
        Ok(Child { name, node })
    }
}

impl NodeDescriptor {
    pub fn new(id: u32, seen: bool, metadata: DescriptorMetadata, children: Vec<Child>) -> Self {
        let DescriptorMetadata {
            address,
            kind,
            length,
            true_length,
            compact,
            ref_count,
            object,
            value,
        } = metadata;
        Self {
            id,
            address,
            kind,
            length,
            true_length,
            compact,
            ref_count,
            object,
            value,
            seen,
            children,
        }
    }

    /// First direct child carrying `name`.
    pub fn child(&self, name: &str) -> Option<&NodeDescriptor> {
        self.children
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
            .map(|c| &c.node)
    }

    pub fn child_names(&self) -> Vec<Option<&str>> {
        self.children.iter().map(|c| c.name.as_deref()).collect()
    }

    /// Pre-order walk over this descriptor and every descendant, stubs included.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Number of distinct identities in the snapshot.
    pub fn distinct_count(&self) -> usize {
        self.iter().filter(|d| !d.seen).count()
    }

    /// The fully expanded descriptor assigned `id`.
    pub fn find(&self, id: u32) -> Option<&NodeDescriptor> {
        self.iter().find(|d| d.id == id && !d.seen)
    }

    /// Parses a snapshot written by [`NodeDescriptor::to_json_str`], at any depth.
    pub fn from_json_str(json: &str) -> Result<NodeDescriptor> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let node =
            NodeDescriptor::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(node)
    }

    pub fn to_json_str(&self) -> Result<String> {
        let mut out = vec![];
        {
            let mut serializer = serde_json::Serializer::pretty(&mut out);
            self.serialize(serde_stacker::Serializer::new(&mut serializer))
                .map_err(|e| anyhow!("could not serialize snapshot: {e}"))?;
        }
        Ok(String::from_utf8(out)?)
    }

    #[cfg(feature = "yaml")]
    pub fn to_yaml_str(&self) -> Result<String> {
        let mut out = vec![];
        {
            // The emitter flushes when dropped.
            let mut serializer = serde_yaml::Serializer::new(&mut out);
            self.serialize(serde_stacker::Serializer::new(&mut serializer))?;
        }
        Ok(String::from_utf8(out)?)
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a NodeDescriptor>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a NodeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev().map(|c| &c.node));
        Some(node)
    }
}
