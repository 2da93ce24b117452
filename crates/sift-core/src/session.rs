//! A host's selection session.
//!
//! The session borrows the host's tree and engine, and owns the descriptor
//! set and the selection store. A host keeps one per interactive run:
//!
//! ```text
//! point at node -> synthesize -> record -> current_general_selector
//!                                  ^                 |
//!                                  +------ repeat ---+
//! ```

use tracing::debug;

use crate::descriptor::DescriptorSet;
use crate::error::Error;
use crate::generalize::{GeneralSelector, generalize};
use crate::generator::generate;
use crate::host::QueryEngine;
use crate::selector::Candidate;
use crate::store::{SelectionRecord, SelectionStore};
use crate::truncate::{Synthesis, truncate};

/// Recorded selections over one host tree.
#[derive(Debug)]
pub struct Session<'h, H: QueryEngine + ?Sized> {
    host: &'h H,
    descriptors: DescriptorSet,
    store: SelectionStore<H::Node>,
}

impl<'h, H: QueryEngine + ?Sized> Session<'h, H> {
    /// An empty session using `descriptors`.
    #[must_use]
    pub fn new(host: &'h H, descriptors: DescriptorSet) -> Self {
        Self {
            host,
            descriptors,
            store: SelectionStore::new(),
        }
    }

    /// An empty session with [`DescriptorSet::default`].
    #[must_use]
    pub fn with_defaults(host: &'h H) -> Self {
        Self::new(host, DescriptorSet::default())
    }

    /// The host this session reads.
    #[must_use]
    pub const fn host(&self) -> &'h H {
        self.host
    }

    /// The active descriptor set.
    #[must_use]
    pub const fn descriptors(&self) -> &DescriptorSet {
        &self.descriptors
    }

    /// The recorded selections.
    #[must_use]
    pub const fn store(&self) -> &SelectionStore<H::Node> {
        &self.store
    }

    /// Every candidate for `node`, before truncation.
    #[must_use]
    pub fn candidates(&self, node: H::Node) -> Vec<Candidate> {
        generate(self.host, node, &self.descriptors)
    }

    /// Candidates for `node`, cut at the first unique one.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when a candidate cannot be evaluated.
    pub fn synthesize(&self, node: H::Node) -> Result<Synthesis, H::Error> {
        truncate(self.candidates(node), |selector| {
            self.host.resolve_count(selector)
        })
    }

    /// Synthesize for `node` and record the result.
    ///
    /// # Errors
    ///
    /// See [`Session::record_candidates`].
    pub fn record(&mut self, node: H::Node) -> Result<&SelectionRecord<H::Node>, Error<H::Error>> {
        let synthesis = self.synthesize(node).map_err(Error::Query)?;
        self.record_candidates(synthesis)
    }

    /// Record a synthesis produced earlier, resolving its last candidate to
    /// find the target.
    ///
    /// # Errors
    ///
    /// [`Error::NoCandidates`] for an empty list, [`Error::Unresolvable`]
    /// when the last candidate matches nothing, [`Error::Query`] when it
    /// cannot be evaluated.
    pub fn record_candidates(
        &mut self,
        synthesis: Synthesis,
    ) -> Result<&SelectionRecord<H::Node>, Error<H::Error>> {
        let Some(last) = synthesis.most_specific() else {
            return Err(Error::NoCandidates);
        };
        let resolution = self
            .host
            .resolve_count(last.as_str())
            .map_err(Error::Query)?;
        let Some(node) = resolution.first else {
            return Err(Error::Unresolvable(last.to_string()));
        };
        debug!(
            selector = last.as_str(),
            node = ?node,
            guaranteed_unique = synthesis.guaranteed_unique,
            records = self.store.len() + 1,
            "recorded selection"
        );
        Ok(self.store.push(SelectionRecord::new(
            synthesis.candidates,
            node,
            synthesis.guaranteed_unique,
        )))
    }

    /// Forget every recorded selection.
    pub fn clear(&mut self) {
        debug!(records = self.store.len(), "cleared selections");
        self.store.clear();
    }

    /// The selector shared by every recorded target, if any.
    ///
    /// # Errors
    ///
    /// [`Error::EmptySelectionStore`] before anything is recorded, and
    /// [`Error::Query`] when the engine fails.
    pub fn current_general_selector(&self) -> Result<Option<GeneralSelector>, Error<H::Error>> {
        generalize(self.host, &self.store)
    }

    /// Whether enough selections exist for the general selector to mean
    /// more than the single recorded target.
    #[must_use]
    pub fn is_generalizable(&self) -> bool {
        self.store.len() >= 2
    }

    /// Every node `selector` matches, in document order.
    ///
    /// # Errors
    ///
    /// [`Error::Query`] when the engine fails.
    pub fn matches(&self, selector: &str) -> Result<Vec<H::Node>, Error<H::Error>> {
        self.host.resolve_all(selector).map_err(Error::Query)
    }
}
