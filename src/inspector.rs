// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::children::ChildEnumerator;
use crate::describe::describe;
use crate::descriptor::{Child, DescriptorMetadata, NodeDescriptor};
use crate::identity::IdentityTracker;
use crate::policy::ExpansionPolicy;
use crate::port::{NamespaceResolver, RuntimeIntrospection};

use anyhow::{bail, Result};
use log::{debug, trace};

/// Builds inspection snapshots of a host heap.
///
/// ```ignore
/// let inspector = Inspector::new(&heap, &heap).with_policy(policy);
/// let snapshot = inspector.inspect(root)?;
/// println!("{}", snapshot.to_json_str()?);
/// ```
pub struct Inspector<'a, P: ?Sized, R: ?Sized> {
    port: &'a P,
    resolver: &'a R,
    policy: ExpansionPolicy,
}

// A node whose children are still being visited.
struct Frame<N> {
    name: Option<String>,
    id: u32,
    seen: bool,
    metadata: DescriptorMetadata,
    pending: std::vec::IntoIter<(Option<String>, N)>,
    children: Vec<Child>,
}

impl<N> Frame<N> {
    fn finish(self) -> Child {
        Child {
            name: self.name,
            node: NodeDescriptor::new(self.id, self.seen, self.metadata, self.children),
        }
    }
}

impl<'a, P, R> Inspector<'a, P, R>
where
    P: RuntimeIntrospection + ?Sized,
    R: NamespaceResolver<P::Node> + ?Sized,
{
    pub fn new(port: &'a P, resolver: &'a R) -> Self {
        Self {
            port,
            resolver,
            policy: ExpansionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExpansionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: ExpansionPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &ExpansionPolicy {
        &self.policy
    }

    /// Snapshot of `root` and everything reachable from it.
    ///
    /// Each distinct node is expanded once, on first visit in pre-order;
    /// later visits produce stubs with `seen` set. Nodes are walked with an
    /// explicit stack, so the depth of the graph does not consume call stack.
    pub fn inspect(&self, root: P::Node) -> Result<NodeDescriptor> {
        debug!("inspecting {} with {:?}", self.port.address(root), self.policy);

        let enumerator = ChildEnumerator::new(self.port, self.resolver, self.policy);
        let mut tracker = IdentityTracker::new();
        let mut stack = vec![self.visit(&enumerator, &mut tracker, None, root)?];

        while let Some(top) = stack.last_mut() {
            if let Some((name, child)) = top.pending.next() {
                let frame = self.visit(&enumerator, &mut tracker, name, child)?;
                stack.push(frame);
                continue;
            }

            let Some(frame) = stack.pop() else {
                break;
            };
            let finished = frame.finish();
            match stack.last_mut() {
                Some(parent) => parent.children.push(finished),
                None => {
                    debug!(
                        "inspected {} distinct nodes from {}",
                        tracker.len(),
                        finished.node.address
                    );
                    return Ok(finished.node);
                }
            }
        }

        bail!("internal error: inspection stack emptied before the root was finished")
    }

    fn visit(
        &self,
        enumerator: &ChildEnumerator<'_, P, R>,
        tracker: &mut IdentityTracker,
        name: Option<String>,
        node: P::Node,
    ) -> Result<Frame<P::Node>> {
        let metadata = describe(self.port, self.resolver, node);

        let (id, seen, pending) = match tracker.lookup(metadata.address) {
            Some(id) => (id, true, vec![]),
            None => {
                let id = tracker.assign(metadata.address);
                let edges = enumerator.children(node)?;
                trace!(
                    "node {id} at {} is a {} with {} children",
                    metadata.address,
                    metadata.kind,
                    edges.len()
                );
                (id, false, edges)
            }
        };

        Ok(Frame {
            name,
            id,
            seen,
            metadata,
            pending: pending.into_iter(),
            children: vec![],
        })
    }
}

/// Snapshot of `root` under `policy`.
pub fn inspect<P, R>(
    port: &P,
    resolver: &R,
    root: P::Node,
    policy: ExpansionPolicy,
) -> Result<NodeDescriptor>
where
    P: RuntimeIntrospection + ?Sized,
    R: NamespaceResolver<P::Node> + ?Sized,
{
    Inspector::new(port, resolver).with_policy(policy).inspect(root)
}
