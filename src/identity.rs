// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::descriptor::Address;

use std::collections::{hash_map::Entry, HashMap};

/// Assigns ids to node identities in first-visit order.
///
/// Keys are addresses, so structurally equal nodes stay distinct and aliases
/// are recognized whatever their content.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    ids: HashMap<Address, u32>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, address: Address) -> Option<u32> {
        self.ids.get(&address).copied()
    }

    /// Assigns the next id to `address`. An address that already has an id keeps it.
    pub fn assign(&mut self, address: Address) -> u32 {
        let next = self.next_id();
        match self.ids.entry(address) {
            Entry::Occupied(o) => *o.get(),
            Entry::Vacant(v) => *v.insert(next),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn next_id(&self) -> u32 {
        u32::try_from(self.ids.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }
}
