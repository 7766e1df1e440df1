// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::descriptor::{DescriptorMetadata, RefCountHint};
use crate::kind::NodeKind;
use crate::port::{NamespaceResolver, RuntimeIntrospection};

/// Non-recursive metadata of one node.
pub fn describe<P, R>(port: &P, resolver: &R, node: P::Node) -> DescriptorMetadata
where
    P: RuntimeIntrospection + ?Sized,
    R: NamespaceResolver<P::Node> + ?Sized,
{
    let kind = port.kind(node);

    let true_length = match port.true_length(node) {
        capacity if capacity > 0 && kind.is_vector_like() => Some(capacity),
        _ => None,
    };

    let value = match kind {
        NodeKind::Symbol => Some(port.symbol_text(node)),
        NodeKind::Environment => environment_label(port, resolver, node),
        _ => None,
    };

    DescriptorMetadata {
        address: port.address(node),
        length: port.length(node),
        true_length,
        compact: port.supports_compact() && port.is_compact(node),
        ref_count: RefCountHint::saturating(port.ref_count(node)),
        object: port.is_object(node),
        value,
        kind,
    }
}

/// Name of one of the process-wide environments, by identity.
pub(crate) fn singleton_env_name<P>(port: &P, env: P::Node) -> Option<&'static str>
where
    P: RuntimeIntrospection + ?Sized,
{
    if port.same(env, port.global_env()) {
        Some("global")
    } else if port.same(env, port.base_env()) {
        Some("base")
    } else if port.same(env, port.empty_env()) {
        Some("empty")
    } else {
        None
    }
}

fn environment_label<P, R>(port: &P, resolver: &R, env: P::Node) -> Option<String>
where
    P: RuntimeIntrospection + ?Sized,
    R: NamespaceResolver<P::Node> + ?Sized,
{
    match singleton_env_name(port, env) {
        Some(name) => Some(name.to_string()),
        None => resolver.package_name(env),
    }
}
