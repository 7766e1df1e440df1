// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Collaborator interfaces supplied by the host runtime.
//!
//! The inspector only ever reads through these traits. All methods take
//! `&self`, so a traversal holding shared borrows cannot mutate the host heap.
//! Passing a node that does not belong to the host, or calling a
//! kind-specific accessor on a node of another kind, is a precondition
//! violation that implementations are free to panic on.

use crate::descriptor::Address;
use crate::kind::NodeKind;

/// Read-only primitive operations on host heap nodes.
pub trait RuntimeIntrospection {
    /// Non-owning handle to a node. Holding one must not keep the node alive.
    type Node: Copy;

    fn address(&self, node: Self::Node) -> Address;
    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Logical element count.
    fn length(&self, node: Self::Node) -> usize;

    /// Allocated capacity of vector-like nodes, 0 when not tracked.
    fn true_length(&self, node: Self::Node) -> usize;

    /// Whether the host can report compact representations at all.
    fn supports_compact(&self) -> bool {
        true
    }

    fn is_compact(&self, node: Self::Node) -> bool;
    fn compact_class(&self, node: Self::Node) -> Self::Node;
    fn compact_class_name(&self, node: Self::Node) -> Option<String>;
    fn compact_data1(&self, node: Self::Node) -> Self::Node;
    fn compact_data2(&self, node: Self::Node) -> Self::Node;

    /// Reads the host's reference count for `node`.
    ///
    /// Must not change the count being read, or the reported value describes
    /// the inspection instead of the program.
    fn ref_count(&self, node: Self::Node) -> u32;

    fn is_object(&self, node: Self::Node) -> bool;

    /// Text of a symbol node.
    fn symbol_text(&self, node: Self::Node) -> String;

    /// Element `index` of a list, expression, weak reference or character container.
    fn element(&self, node: Self::Node, index: usize) -> Self::Node;

    /// Parallel name vector of a container, if it has one.
    fn names(&self, node: Self::Node) -> Option<Vec<Option<String>>>;

    fn car(&self, node: Self::Node) -> Self::Node;
    fn cdr(&self, node: Self::Node) -> Self::Node;
    fn tag(&self, node: Self::Node) -> Self::Node;

    fn frame(&self, env: Self::Node) -> Self::Node;
    fn hashtab(&self, env: Self::Node) -> Self::Node;
    fn enclos(&self, env: Self::Node) -> Self::Node;

    /// Bindings made directly in `env`, excluding inherited ones.
    fn local_bindings(&self, env: Self::Node) -> Vec<(String, Self::Node)>;

    fn formals(&self, closure: Self::Node) -> Self::Node;
    fn body(&self, closure: Self::Node) -> Self::Node;
    fn closure_env(&self, closure: Self::Node) -> Self::Node;

    fn promise_value(&self, promise: Self::Node) -> Self::Node;
    fn promise_code(&self, promise: Self::Node) -> Self::Node;
    fn promise_env(&self, promise: Self::Node) -> Self::Node;

    fn extptr_prot(&self, ptr: Self::Node) -> Self::Node;
    fn extptr_tag(&self, ptr: Self::Node) -> Self::Node;

    /// Attribute structure of any node; nil when absent.
    fn attributes(&self, node: Self::Node) -> Self::Node;

    fn nil(&self) -> Self::Node;
    fn missing_arg(&self) -> Self::Node;
    fn global_env(&self) -> Self::Node;
    fn base_env(&self) -> Self::Node;
    fn empty_env(&self) -> Self::Node;

    /// Identity comparison.
    fn same(&self, a: Self::Node, b: Self::Node) -> bool {
        self.address(a) == self.address(b)
    }

    fn is_nil(&self, node: Self::Node) -> bool {
        self.same(node, self.nil())
    }
}

/// Recognizes environments that are the top-level scope of a loaded package.
pub trait NamespaceResolver<N> {
    fn is_namespace(&self, env: N) -> bool;

    /// Display name of a package-like environment.
    fn package_name(&self, env: N) -> Option<String>;
}

/// Resolver for hosts without packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNamespaces;

impl<N> NamespaceResolver<N> for NoNamespaces {
    fn is_namespace(&self, _env: N) -> bool {
        false
    }

    fn package_name(&self, _env: N) -> Option<String> {
        None
    }
}
