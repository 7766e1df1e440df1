// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod children;
mod describe;
mod descriptor;
mod error;
pub mod heap;
mod identity;
mod inspector;
mod kind;
mod policy;
mod port;

pub use children::{ChildEnumerator, Edges, DEFERRED_STRING_CLASS};
pub use describe::describe;
pub use descriptor::{Address, Child, DescriptorMetadata, Iter, NodeDescriptor, RefCountHint};
pub use error::InspectError;
pub use identity::IdentityTracker;
pub use inspector::{inspect, Inspector};
pub use kind::NodeKind;
pub use policy::ExpansionPolicy;
pub use port::{NamespaceResolver, NoNamespaces, RuntimeIntrospection};

#[cfg(test)]
mod test_utils;
