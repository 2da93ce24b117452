//! In-memory host used by the unit tests.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::host::{QueryEngine, Resolution, TreeAccess};

#[derive(Debug, Default)]
struct MockNode {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
}

/// Flat node list plus a canned selector table standing in for a query engine.
#[derive(Debug, Default)]
pub(crate) struct MockTree {
    nodes: Vec<MockNode>,
    answers: HashMap<String, Vec<usize>>,
    failing: HashSet<String>,
    /// How often each selector was resolved.
    resolved: RefCell<HashMap<String, usize>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("mock engine rejected `{0}`")]
pub(crate) struct MockError(pub String);

impl MockTree {
    pub(crate) fn add(
        &mut self,
        parent: Option<usize>,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> usize {
        self.nodes.push(MockNode {
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            text: text.to_string(),
            parent,
        });
        self.nodes.len() - 1
    }

    /// Make `selector` resolve to `nodes`. Unlisted selectors match nothing.
    pub(crate) fn answer(&mut self, selector: &str, nodes: &[usize]) {
        let _ = self.answers.insert(selector.to_string(), nodes.to_vec());
    }

    /// Make `selector` fail to evaluate.
    pub(crate) fn fail(&mut self, selector: &str) {
        let _ = self.failing.insert(selector.to_string());
    }

    /// Number of times `selector` was resolved.
    pub(crate) fn resolutions(&self, selector: &str) -> usize {
        self.resolved.borrow().get(selector).copied().unwrap_or(0)
    }

    /// Number of resolutions of any selector containing `fragment`.
    pub(crate) fn resolutions_containing(&self, fragment: &str) -> usize {
        self.resolved
            .borrow()
            .iter()
            .filter(|(selector, _)| selector.contains(fragment))
            .map(|(_, count)| count)
            .sum()
    }

    fn siblings(&self, node: usize) -> Option<impl Iterator<Item = usize> + '_> {
        let parent = self.nodes[node].parent?;
        Some((0..self.nodes.len()).filter(move |&i| self.nodes[i].parent == Some(parent)))
    }
}

impl TreeAccess for MockTree {
    type Node = usize;

    fn tag_name(&self, node: usize) -> Cow<'_, str> {
        Cow::Borrowed(&self.nodes[node].tag)
    }

    fn attribute(&self, node: usize, name: &str) -> Option<Cow<'_, str>> {
        self.nodes[node]
            .attrs
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| Cow::Borrowed(v.as_str()))
    }

    fn same_tag_position(&self, node: usize) -> Option<usize> {
        let tag = self.nodes[node].tag.to_ascii_lowercase();
        let before = self
            .siblings(node)?
            .take_while(|&i| i != node)
            .filter(|&i| self.nodes[i].tag.to_ascii_lowercase() == tag)
            .count();
        Some(before + 1)
    }

    fn element_position(&self, node: usize) -> Option<usize> {
        Some(self.siblings(node)?.take_while(|&i| i != node).count() + 1)
    }

    fn text_content(&self, node: usize) -> String {
        self.nodes[node].text.clone()
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }
}

impl QueryEngine for MockTree {
    type Error = MockError;

    fn resolve_count(&self, selector: &str) -> Result<Resolution<usize>, MockError> {
        let all = self.resolve_all(selector)?;
        Ok(Resolution {
            first: all.first().copied(),
            has_second: all.len() > 1,
        })
    }

    fn resolve_all(&self, selector: &str) -> Result<Vec<usize>, MockError> {
        *self
            .resolved
            .borrow_mut()
            .entry(selector.to_string())
            .or_default() += 1;
        if self.failing.contains(selector) {
            return Err(MockError(selector.to_string()));
        }
        Ok(self.answers.get(selector).cloned().unwrap_or_default())
    }
}
