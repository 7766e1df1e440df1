// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

/// Which node classes expose their internal representation instead of
/// appearing as opaque leaves. Every switch is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionPolicy {
    /// Show the representation class and backing payloads of compact nodes.
    pub expand_compact: bool,
    /// Show the text atoms held by character containers.
    pub expand_atomic_text: bool,
    /// Show the raw frame and hash table of environments instead of their bindings.
    pub expand_frames: bool,
}

impl ExpansionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expand_compact(mut self, b: bool) -> Self {
        self.expand_compact = b;
        self
    }

    pub fn with_expand_atomic_text(mut self, b: bool) -> Self {
        self.expand_atomic_text = b;
        self
    }

    pub fn with_expand_frames(mut self, b: bool) -> Self {
        self.expand_frames = b;
        self
    }
}
