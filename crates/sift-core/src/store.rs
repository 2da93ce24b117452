//! Recorded selections.

use crate::selector::Candidate;

/// One recorded target: its candidate list and the node the most specific
/// candidate resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRecord<N> {
    candidates: Vec<Candidate>,
    resolved_node: N,
    guaranteed_unique: bool,
}

impl<N: Copy> SelectionRecord<N> {
    /// Create a record. `candidates` should be non-empty and `resolved_node`
    /// a match of its last entry.
    #[must_use]
    pub const fn new(candidates: Vec<Candidate>, resolved_node: N, guaranteed_unique: bool) -> Self {
        Self {
            candidates,
            resolved_node,
            guaranteed_unique,
        }
    }

    /// Candidates, least specific first.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The node the last candidate resolved to.
    #[must_use]
    pub const fn resolved_node(&self) -> N {
        self.resolved_node
    }

    /// Whether the last candidate was verified to match only this node.
    #[must_use]
    pub const fn guaranteed_unique(&self) -> bool {
        self.guaranteed_unique
    }
}

/// Records in insertion order. Order is the generalizer's tie-break key, so
/// the store only ever grows or is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore<N> {
    records: Vec<SelectionRecord<N>>,
}

impl<N> Default for SelectionStore<N> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<N: Copy> SelectionStore<N> {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return it.
    pub fn push(&mut self, record: SelectionRecord<N>) -> &SelectionRecord<N> {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Drop every record along with the node handles they hold.
    pub fn clear(&mut self) {
        self.records.clear();
        self.records.shrink_to_fit();
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[SelectionRecord<N>] {
        &self.records
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SelectionRecord<N>> {
        self.records.iter()
    }

    /// Every recorded target, in insertion order.
    pub fn resolved_nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.records.iter().map(SelectionRecord::resolved_node)
    }
}

impl<'a, N: Copy> IntoIterator for &'a SelectionStore<N> {
    type Item = &'a SelectionRecord<N>;
    type IntoIter = std::slice::Iter<'a, SelectionRecord<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
