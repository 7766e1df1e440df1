// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Structural category of a heap node.
///
/// The taxonomy is closed. A host that reports a category outside of it
/// produces [`NodeKind::Unrecognized`], which the inspector refuses to expand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Nil,
    Logical,
    Integer,
    Real,
    Complex,
    Raw,
    // Interned text atom.
    Char,
    Symbol,
    Special,
    Builtin,
    // Container of text atoms.
    Character,
    List,
    Expression,
    WeakRef,
    Dots,
    PairList,
    Call,
    ByteCode,
    Environment,
    Closure,
    Promise,
    ExternalPtr,
    FormalObject,

    // Host kind unknown to this inspector, carrying the host's name for it.
    Unrecognized(String),
}

const KIND_NAMES: &[(&str, NodeKind)] = &[
    ("nil", NodeKind::Nil),
    ("logical", NodeKind::Logical),
    ("integer", NodeKind::Integer),
    ("real", NodeKind::Real),
    ("complex", NodeKind::Complex),
    ("raw", NodeKind::Raw),
    ("char", NodeKind::Char),
    ("symbol", NodeKind::Symbol),
    ("special", NodeKind::Special),
    ("builtin", NodeKind::Builtin),
    ("character", NodeKind::Character),
    ("list", NodeKind::List),
    ("expression", NodeKind::Expression),
    ("weakref", NodeKind::WeakRef),
    ("dots", NodeKind::Dots),
    ("pairlist", NodeKind::PairList),
    ("call", NodeKind::Call),
    ("bytecode", NodeKind::ByteCode),
    ("environment", NodeKind::Environment),
    ("closure", NodeKind::Closure),
    ("promise", NodeKind::Promise),
    ("externalptr", NodeKind::ExternalPtr),
    ("object", NodeKind::FormalObject),
];

impl NodeKind {
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Nil => "nil",
            NodeKind::Logical => "logical",
            NodeKind::Integer => "integer",
            NodeKind::Real => "real",
            NodeKind::Complex => "complex",
            NodeKind::Raw => "raw",
            NodeKind::Char => "char",
            NodeKind::Symbol => "symbol",
            NodeKind::Special => "special",
            NodeKind::Builtin => "builtin",
            NodeKind::Character => "character",
            NodeKind::List => "list",
            NodeKind::Expression => "expression",
            NodeKind::WeakRef => "weakref",
            NodeKind::Dots => "dots",
            NodeKind::PairList => "pairlist",
            NodeKind::Call => "call",
            NodeKind::ByteCode => "bytecode",
            NodeKind::Environment => "environment",
            NodeKind::Closure => "closure",
            NodeKind::Promise => "promise",
            NodeKind::ExternalPtr => "externalptr",
            NodeKind::FormalObject => "object",
            NodeKind::Unrecognized(name) => name.as_str(),
        }
    }

    /// Kinds whose storage is a contiguous vector with a capacity slot.
    pub fn is_vector_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Logical
                | NodeKind::Integer
                | NodeKind::Real
                | NodeKind::Complex
                | NodeKind::Raw
                | NodeKind::Character
                | NodeKind::List
                | NodeKind::Expression
        )
    }

    /// Scalar and vector kinds that never hold references to other nodes.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            NodeKind::Logical
                | NodeKind::Integer
                | NodeKind::Real
                | NodeKind::Complex
                | NodeKind::Raw
        )
    }

    /// Cons-style kinds walked as linked chains.
    pub fn is_pair_list(&self) -> bool {
        matches!(self, NodeKind::Dots | NodeKind::PairList | NodeKind::Call)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, NodeKind::Unrecognized(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(KIND_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| NodeKind::Unrecognized(s.to_string())))
    }
}

impl Serialize for NodeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

struct NodeKindVisitor;

impl Visitor<'_> for NodeKindVisitor {
    type Value = NodeKind;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a node kind name")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match NodeKind::from_str(v) {
            Ok(kind) => Ok(kind),
            Err(never) => match never {},
        }
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(NodeKindVisitor)
    }
}
