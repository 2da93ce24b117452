//! Capabilities the host supplies to the core.
//!
//! The core never owns a tree. It reads node properties through
//! [`TreeAccess`] and evaluates the selectors it emits through
//! [`QueryEngine`].

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::hash::Hash;

/// Read-only access to the nodes of a rendered document tree.
pub trait TreeAccess {
    /// Handle to one element. Cheap to copy and compare.
    type Node: Copy + Eq + Hash + Debug;

    /// The element's tag name, in any case.
    fn tag_name(&self, node: Self::Node) -> Cow<'_, str>;

    /// The named attribute, `None` when absent or empty.
    ///
    /// `class` must return the element's class-name string.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<Cow<'_, str>>;

    /// 1-based index among the parent's children with the same tag name.
    /// `None` at the root.
    fn same_tag_position(&self, node: Self::Node) -> Option<usize>;

    /// 1-based index among all of the parent's element children.
    /// `None` at the root.
    fn element_position(&self, node: Self::Node) -> Option<usize>;

    /// The element's rendered text.
    fn text_content(&self, node: Self::Node) -> String;

    /// The parent element, `None` for the root element.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
}

/// First match of a selector and whether a second one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<N> {
    /// The first match in document order.
    pub first: Option<N>,
    /// Whether at least one more match follows.
    pub has_second: bool,
}

impl<N> Resolution<N> {
    /// Exactly one node matched.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.first.is_some() && !self.has_second
    }
}

/// Evaluates selector text against the same tree [`TreeAccess`] reads.
pub trait QueryEngine: TreeAccess {
    /// Evaluation failure, passed through the core unchanged.
    type Error: StdError + Send + Sync + 'static;

    /// The first match and whether a second exists, in document order.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the selector cannot be evaluated.
    fn resolve_count(&self, selector: &str) -> Result<Resolution<Self::Node>, Self::Error>;

    /// All matches in document order.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the selector cannot be evaluated.
    fn resolve_all(&self, selector: &str) -> Result<Vec<Self::Node>, Self::Error>;
}
