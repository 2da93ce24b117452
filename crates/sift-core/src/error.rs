//! Errors surfaced by the core.

use std::error::Error as StdError;

use thiserror::Error;

/// Failure of a core operation.
///
/// `E` is the host query engine's error, which passes through unchanged.
/// "No common selector" is not an error; see
/// [`generalize`](crate::generalize::generalize).
#[derive(Debug, Error)]
pub enum Error<E: StdError + 'static> {
    /// Generalization was asked for with no recorded selection.
    #[error("the selection store is empty")]
    EmptySelectionStore,

    /// A recorded candidate list whose last selector matched nothing.
    #[error("selector `{0}` matched no node")]
    Unresolvable(String),

    /// Recording was asked for with an empty candidate list.
    #[error("cannot record an empty candidate list")]
    NoCandidates,

    /// The query engine failed.
    #[error("query evaluation failed: {0}")]
    Query(#[source] E),
}
