//! JSON document format.
//!
//! A document is one JSON object for the document element. Elements are
//! objects with a `tag`, optional `attributes` and optional `children`;
//! bare strings are text nodes:
//!
//! ```json
//! {"tag": "ul", "attributes": {"id": "menu"},
//!  "children": [{"tag": "li", "children": ["Home"]}]}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

/// Errors raised while loading or dumping a JSON document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input was not valid JSON for the document format.
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value was a text node instead of an element.
    #[error("the document element must be an element, not text")]
    TextRoot,

    /// An element was declared with an empty tag name.
    #[error("element with an empty tag name")]
    EmptyTag,

    /// The tree has no document element to dump.
    #[error("the tree has no document element")]
    NoDocumentElement,
}

/// Serialized form of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonNode {
    /// A text node.
    Text(String),
    /// An element node.
    Element(JsonElement),
}

/// Serialized form of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonElement {
    /// Local name.
    pub tag: String,
    /// Attribute list.
    #[serde(default, skip_serializing_if = "AttributesMap::is_empty")]
    pub attributes: AttributesMap,
    /// Child nodes in tree order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

/// Parse a JSON document into a fresh tree, with the document element
/// appended under the Document node.
///
/// # Errors
///
/// Returns [`DocumentError`] when the JSON is malformed, the top-level value
/// is text, or an element has an empty tag.
pub fn parse_document(source: &str) -> Result<DomTree, DocumentError> {
    let root: JsonNode = serde_json::from_str(source)?;
    build_tree(root)
}

/// Build a tree from an already-deserialized document element.
///
/// # Errors
///
/// See [`parse_document`].
pub fn build_tree(root: JsonNode) -> Result<DomTree, DocumentError> {
    if matches!(root, JsonNode::Text(_)) {
        return Err(DocumentError::TextRoot);
    }

    let mut tree = DomTree::new();
    // Explicit work list instead of recursion: deeply nested documents are common.
    let mut pending = vec![(NodeId::ROOT, root)];
    while let Some((parent, node)) = pending.pop() {
        match node {
            JsonNode::Text(text) => {
                let _ = tree.append_text(parent, text);
            }
            JsonNode::Element(element) => {
                if element.tag.is_empty() {
                    return Err(DocumentError::EmptyTag);
                }
                let id = tree.append_element(
                    parent,
                    ElementData {
                        tag_name: element.tag,
                        attrs: element.attributes,
                    },
                );
                // Reversed so the stack pops children in tree order.
                pending.extend(element.children.into_iter().rev().map(|c| (id, c)));
            }
        }
    }
    Ok(tree)
}

/// Convert the subtree at `id` back to its serialized form.
///
/// Returns `None` for the Document node itself.
#[must_use]
pub fn to_json_node(tree: &DomTree, id: NodeId) -> Option<JsonNode> {
    let element = match shallow(tree, id)? {
        JsonNode::Element(element) => element,
        text => return Some(text),
    };
    // Open elements with the index of their next unvisited child.
    let mut open = vec![(id, element, 0_usize)];
    loop {
        let (parent, element, next) = open.last_mut()?;
        if let Some(&child) = tree.children(*parent).get(*next) {
            *next += 1;
            match shallow(tree, child) {
                Some(JsonNode::Element(nested)) => open.push((child, nested, 0)),
                Some(text) => element.children.push(text),
                None => {}
            }
            continue;
        }
        let (_, done, _) = open.pop()?;
        match open.last_mut() {
            Some((_, element, _)) => element.children.push(JsonNode::Element(done)),
            None => return Some(JsonNode::Element(done)),
        }
    }
}

/// A node without its children.
fn shallow(tree: &DomTree, id: NodeId) -> Option<JsonNode> {
    match &tree.get(id)?.node_type {
        NodeType::Document => None,
        NodeType::Text(text) => Some(JsonNode::Text(text.clone())),
        NodeType::Element(data) => Some(JsonNode::Element(JsonElement {
            tag: data.tag_name.clone(),
            attributes: data.attrs.clone(),
            children: Vec::new(),
        })),
    }
}

/// Dump the whole document as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`DocumentError::NoDocumentElement`] for an empty tree.
pub fn to_json(tree: &DomTree) -> Result<String, DocumentError> {
    let root = tree
        .document_element()
        .and_then(|id| to_json_node(tree, id))
        .ok_or(DocumentError::NoDocumentElement)?;
    Ok(serde_json::to_string_pretty(&root)?)
}
