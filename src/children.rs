// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::describe::singleton_env_name;
use crate::error::InspectError;
use crate::kind::NodeKind;
use crate::policy::ExpansionPolicy;
use crate::port::{NamespaceResolver, RuntimeIntrospection};

use std::collections::HashSet;

use anyhow::Result;
use log::debug;

/// Compact representation class whose first payload is a cons cell.
pub const DEFERRED_STRING_CLASS: &str = "deferred_string";

/// Ordered `(name, child)` pairs of one node.
pub type Edges<N> = Vec<(Option<String>, N)>;

/// Lists the direct children of a node according to its kind and the
/// expansion policy.
pub struct ChildEnumerator<'a, P: ?Sized, R: ?Sized> {
    port: &'a P,
    resolver: &'a R,
    policy: ExpansionPolicy,
}

impl<'a, P, R> ChildEnumerator<'a, P, R>
where
    P: RuntimeIntrospection + ?Sized,
    R: NamespaceResolver<P::Node> + ?Sized,
{
    pub fn new(port: &'a P, resolver: &'a R, policy: ExpansionPolicy) -> Self {
        Self {
            port,
            resolver,
            policy,
        }
    }

    pub fn children(&self, node: P::Node) -> Result<Edges<P::Node>> {
        let port = self.port;
        let kind = port.kind(node);
        let mut edges = Edges::new();

        if self.policy.expand_compact && port.supports_compact() && port.is_compact(node) {
            self.compact_children(node, &mut edges);
        } else {
            match &kind {
                NodeKind::Nil
                | NodeKind::Special
                | NodeKind::Builtin
                | NodeKind::Logical
                | NodeKind::Integer
                | NodeKind::Real
                | NodeKind::Complex
                | NodeKind::Raw
                | NodeKind::Char
                | NodeKind::Symbol => (),

                NodeKind::Character => {
                    if self.policy.expand_atomic_text {
                        for i in 0..port.length(node) {
                            edges.push((None, port.element(node, i)));
                        }
                    }
                }

                NodeKind::List | NodeKind::Expression | NodeKind::WeakRef => {
                    self.element_children(node, &mut edges)
                }

                NodeKind::Dots | NodeKind::PairList | NodeKind::Call => {
                    self.chain_children(node, &mut edges)
                }

                NodeKind::ByteCode => {
                    push(&mut edges, "_tag", port.tag(node));
                    push(&mut edges, "_car", port.car(node));
                    push(&mut edges, "_cdr", port.cdr(node));
                }

                NodeKind::Environment => self.environment_children(node, &mut edges),

                NodeKind::Closure => {
                    push(&mut edges, "_formals", port.formals(node));
                    push(&mut edges, "_body", port.body(node));
                    push(&mut edges, "_env", port.closure_env(node));
                }

                NodeKind::Promise => {
                    push(&mut edges, "_value", port.promise_value(node));
                    push(&mut edges, "_code", port.promise_code(node));
                    push(&mut edges, "_env", port.promise_env(node));
                }

                NodeKind::ExternalPtr => {
                    push(&mut edges, "_prot", port.extptr_prot(node));
                    push(&mut edges, "_tag", port.extptr_tag(node));
                }

                NodeKind::FormalObject => push(&mut edges, "_tag", port.tag(node)),

                NodeKind::Unrecognized(name) => {
                    return Err(InspectError::UnrecognizedKind { kind: name.clone() }.into())
                }
            }
        }

        // Text atoms reuse the attribute slot for bookkeeping.
        if kind != NodeKind::Char {
            let attributes = port.attributes(node);
            if !port.is_nil(attributes) {
                push(&mut edges, "_attrib", attributes);
            }
        }

        Ok(edges)
    }

    fn compact_children(&self, node: P::Node, edges: &mut Edges<P::Node>) {
        let port = self.port;
        push(edges, "_class", port.compact_class(node));

        let data1 = port.compact_data1(node);
        if port.compact_class_name(node).as_deref() == Some(DEFERRED_STRING_CLASS) {
            // Payload is a cons cell; expose both halves.
            push(edges, "_data1_car", port.car(data1));
            push(edges, "_data1_cdr", port.cdr(data1));
        } else {
            push(edges, "_data1", data1);
        }

        push(edges, "_data2", port.compact_data2(node));
    }

    fn element_children(&self, node: P::Node, edges: &mut Edges<P::Node>) {
        let port = self.port;
        let len = port.length(node);
        let names = port.names(node).filter(|names| names.len() == len);

        for i in 0..len {
            let name = names
                .as_ref()
                .and_then(|names| names[i].clone())
                .filter(|name| !name.is_empty());
            edges.push((name, port.element(node, i)));
        }
    }

    fn chain_children(&self, node: P::Node, edges: &mut Edges<P::Node>) {
        let port = self.port;

        // The sentinel is a one-cell chain pointing at itself.
        if port.same(node, port.missing_arg()) {
            return;
        }

        let mut visited = HashSet::new();
        let mut cell = node;
        while !port.is_nil(cell) {
            if !port.kind(cell).is_pair_list() {
                debug!("chain at {} ends in a {} cell", port.address(node), port.kind(cell));
                break;
            }
            if !visited.insert(port.address(cell)) {
                debug!("chain at {} loops back to {}", port.address(node), port.address(cell));
                break;
            }

            let tag = port.tag(cell);
            let car = port.car(cell);
            match port.kind(tag) {
                NodeKind::Nil => edges.push((None, car)),
                NodeKind::Symbol => edges.push((Some(port.symbol_text(tag)), car)),
                _ => {
                    push(edges, "_tag", tag);
                    push(edges, "_car", car);
                }
            }

            cell = port.cdr(cell);
        }
    }

    fn environment_children(&self, env: P::Node, edges: &mut Edges<P::Node>) {
        let port = self.port;
        if singleton_env_name(port, env).is_some() || self.resolver.is_namespace(env) {
            return;
        }

        if self.policy.expand_frames {
            push(edges, "_frame", port.frame(env));
            push(edges, "_hashtab", port.hashtab(env));
        } else {
            let mut bindings = port.local_bindings(env);
            bindings.sort_by(|a, b| a.0.cmp(&b.0));
            edges.extend(bindings.into_iter().map(|(name, value)| (Some(name), value)));
        }

        push(edges, "_enclos", port.enclos(env));
    }
}

fn push<N>(edges: &mut Edges<N>, name: &str, node: N) {
    edges.push((Some(name.to_string()), node));
}
