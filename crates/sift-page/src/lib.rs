//! Document host for Sift.
//!
//! A [`Page`] owns a loaded [`DomTree`] and supplies the two capabilities the
//! selector core needs: node accessors ([`TreeAccess`]) and selector
//! evaluation ([`QueryEngine`], backed by `sift-query`).
//!
//! ```text
//! JSON file --parse_document--> DomTree --Page--> Session (sift-core)
//!                                            \--> Query   (sift-query)
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use sift_core::{QueryEngine, Resolution, TreeAccess};
use sift_dom::json::{DocumentError, parse_document};
use sift_dom::{DomTree, NodeId};
use sift_query::{QueryError, select};

pub use sift_core as core;
pub use sift_dom as dom;
pub use sift_query as query;

/// Error type for document loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the file.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        /// The path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file was read but is not a valid document.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A loaded document.
#[derive(Debug, Clone)]
pub struct Page {
    /// Source path, when loaded from a file.
    pub source_path: Option<PathBuf>,

    /// Parsed document tree.
    pub dom: DomTree,
}

impl Page {
    /// Wrap an already built tree.
    #[must_use]
    pub const fn new(dom: DomTree) -> Self {
        Self {
            source_path: None,
            dom,
        }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] for malformed input.
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        Ok(Self::new(parse_document(source)?))
    }

    /// Read and parse a JSON document file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] if the file cannot be read and
    /// [`LoadError::Document`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut page = Self::from_json(&source)?;
        page.source_path = Some(path.to_path_buf());
        Ok(page)
    }

    /// The root element, `None` for an empty tree.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.dom.document_element()
    }

    /// Point at a node: the first match of `selector` in document order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the selector does not parse.
    pub fn point(&self, selector: &str) -> Result<Option<NodeId>, QueryError> {
        Ok(select(&self.dom, selector)?.into_iter().next())
    }
}

impl TreeAccess for Page {
    type Node = NodeId;

    fn tag_name(&self, node: NodeId) -> Cow<'_, str> {
        self.dom
            .as_element(node)
            .map_or(Cow::Borrowed(""), |e| Cow::Borrowed(e.tag_name.as_str()))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<Cow<'_, str>> {
        self.dom
            .as_element(node)?
            .attribute(name)
            .map(Cow::Borrowed)
    }

    // The document element has no parent element, so it has no position.
    fn same_tag_position(&self, node: NodeId) -> Option<usize> {
        let _ = self.dom.parent_element(node)?;
        self.dom.same_tag_position(node)
    }

    fn element_position(&self, node: NodeId) -> Option<usize> {
        let _ = self.dom.parent_element(node)?;
        self.dom.element_position(node)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.dom.text_content(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom.parent_element(node)
    }
}

impl QueryEngine for Page {
    type Error = QueryError;

    fn resolve_count(&self, selector: &str) -> Result<Resolution<NodeId>, QueryError> {
        let mut matches = select(&self.dom, selector)?.into_iter();
        Ok(Resolution {
            first: matches.next(),
            has_second: matches.next().is_some(),
        })
    }

    fn resolve_all(&self, selector: &str) -> Result<Vec<NodeId>, QueryError> {
        select(&self.dom, selector)
    }
}
