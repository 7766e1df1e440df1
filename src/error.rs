// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Errors that abort an inspection.
///
/// The node taxonomy is closed, so the only failure is meeting a kind the
/// inspector was not built for. That points at an inspector that is stale
/// relative to its host rather than at bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InspectError {
    /// Reported when a node's kind falls outside the known taxonomy.
    #[error("don't know how to handle node kind {kind}")]
    UnrecognizedKind {
        /// Host name of the offending kind.
        kind: String,
    },
}
