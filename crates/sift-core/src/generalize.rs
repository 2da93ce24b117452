//! One selector for every recorded target.
//!
//! Each record's candidates are tried in order against the whole store. A
//! candidate is eligible when its matches include every recorded target;
//! the eligible candidate with the fewest matches wins, earliest record and
//! then earliest candidate breaking ties.
//!
//! Before a candidate is tried, an exact `@class='...'` test on its target
//! step is relaxed to the class tokens shared by the other records' targets
//! it would match:
//!
//! ```text
//! //li[@class='item active']
//! //li[contains(concat(' ', normalize-space(@class), ' '), ' item ')]
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::Error;
use crate::host::QueryEngine;
use crate::selector::{Predicate, Selector};
use crate::store::SelectionStore;

/// The winning selector and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralSelector {
    /// Rendered selector, after class relaxation.
    pub selector: String,
    /// Position of the contributing record in the store.
    pub record_index: usize,
    /// Position of the candidate within that record.
    pub candidate_index: usize,
    /// Number of nodes the selector matches.
    pub match_count: usize,
}

/// Find the most specific selector matching every recorded target.
///
/// Returns `Ok(None)` when no candidate of any record matches them all.
///
/// # Errors
///
/// [`Error::EmptySelectionStore`] for an empty store, and [`Error::Query`]
/// when the engine fails on a candidate.
pub fn generalize<Q: QueryEngine + ?Sized>(
    engine: &Q,
    store: &SelectionStore<Q::Node>,
) -> Result<Option<GeneralSelector>, Error<Q::Error>> {
    if store.is_empty() {
        return Err(Error::EmptySelectionStore);
    }
    let targets: HashSet<Q::Node> = store.resolved_nodes().collect();

    let mut best: Option<GeneralSelector> = None;
    for (record_index, record) in store.iter().enumerate() {
        let mut relaxer = ClassRelaxer::new(engine, &targets, record.resolved_node());

        for candidate in record.candidates() {
            let selector = relaxer.relax(candidate.selector())?.to_string();
            let matches: HashSet<Q::Node> = engine
                .resolve_all(&selector)
                .map_err(Error::Query)?
                .into_iter()
                .collect();
            let eligible = targets.iter().all(|t| matches.contains(t));
            trace!(
                record = record_index,
                candidate = candidate.index(),
                selector = selector.as_str(),
                matches = matches.len(),
                eligible,
                "tried candidate"
            );
            if !eligible {
                continue;
            }
            let match_count = matches.len();
            if best.as_ref().is_none_or(|b| match_count < b.match_count) {
                best = Some(GeneralSelector {
                    selector,
                    record_index,
                    candidate_index: candidate.index(),
                    match_count,
                });
            }
        }
    }

    match &best {
        Some(general) => debug!(
            selector = general.selector.as_str(),
            record = general.record_index,
            candidate = general.candidate_index,
            matches = general.match_count,
            "general selector"
        ),
        None => debug!(records = store.len(), "no common selector"),
    }
    Ok(best)
}

/// Rewrites exact class tests for one record, memoized by class string.
struct ClassRelaxer<'a, Q: QueryEngine + ?Sized> {
    engine: &'a Q,
    targets: &'a HashSet<Q::Node>,
    /// The record's own target, which never contributes tokens.
    own: Q::Node,
    /// Class string to shared tokens; `None` when nothing is shared.
    memo: HashMap<String, Option<Vec<String>>>,
}

impl<'a, Q: QueryEngine + ?Sized> ClassRelaxer<'a, Q> {
    fn new(engine: &'a Q, targets: &'a HashSet<Q::Node>, own: Q::Node) -> Self {
        Self {
            engine,
            targets,
            own,
            memo: HashMap::new(),
        }
    }

    fn relax(&mut self, selector: &Selector) -> Result<Selector, Error<Q::Error>> {
        let Some(step) = selector.target_step() else {
            return Ok(selector.clone());
        };
        let Some((slot, class)) = step
            .predicates
            .iter()
            .enumerate()
            .find_map(|(i, p)| p.exact_class().map(|c| (i, c.to_string())))
        else {
            return Ok(selector.clone());
        };

        let tokens = match self.memo.get(&class) {
            Some(tokens) => tokens.clone(),
            None => {
                let mut probe = selector.clone();
                if let Some(step) = probe.target_step_mut() {
                    step.predicates[slot] = Predicate::Always;
                }
                let matched = self
                    .engine
                    .resolve_all(&probe.to_string())
                    .map_err(Error::Query)?;
                let tokens = self.shared_tokens(&matched);
                debug!(
                    class = class.as_str(),
                    probe = %probe,
                    shared = ?tokens,
                    "class relaxation"
                );
                let _ = self.memo.insert(class, tokens.clone());
                tokens
            }
        };

        let mut relaxed = selector.clone();
        if let (Some(tokens), Some(step)) = (tokens, relaxed.target_step_mut()) {
            step.predicates[slot] = Predicate::ClassContains(tokens);
        }
        Ok(relaxed)
    }

    /// Tokens common to every matched node that is another record's target,
    /// in the order of the first such node.
    fn shared_tokens(&self, matched: &[Q::Node]) -> Option<Vec<String>> {
        let mut shared: Option<Vec<String>> = None;
        let others = matched
            .iter()
            .filter(|&&n| n != self.own && self.targets.contains(&n));
        for node in others {
            let class = self.engine.attribute(*node, "class").unwrap_or_default();
            let mut tokens: Vec<String> = Vec::new();
            for token in class.split_ascii_whitespace() {
                if !tokens.iter().any(|t| t == token) {
                    tokens.push(token.to_string());
                }
            }
            shared = Some(match shared {
                None => tokens,
                Some(prev) => prev.into_iter().filter(|t| tokens.contains(t)).collect(),
            });
        }
        shared.filter(|tokens| !tokens.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorSet;
    use crate::generator::generate;
    use crate::store::SelectionRecord;
    use crate::testing::{MockError, MockTree};

    const ITEM: &str = "contains(concat(' ', normalize-space(@class), ' '), ' item ')";
    const ACTIVE: &str = "contains(concat(' ', normalize-space(@class), ' '), ' active ')";

    /// ul > li.item.active, li.item, li.other
    fn list() -> (MockTree, [usize; 3]) {
        let mut tree = MockTree::default();
        let ul = tree.add(None, "ul", &[], "");
        let a = tree.add(Some(ul), "li", &[("class", "item active")], "One");
        let b = tree.add(Some(ul), "li", &[("class", "item")], "Two");
        let c = tree.add(Some(ul), "li", &[("class", "other")], "Three");
        tree.answer("//li", &[a, b, c]);
        tree.answer("//li[true()]", &[a, b, c]);
        tree.answer("//li[@class='item active']", &[a]);
        tree.answer("//li[@class='item']", &[b]);
        tree.answer(&format!("//li[{ITEM}]"), &[a, b]);
        tree.answer(&format!("//li[{ITEM} and {ACTIVE}]"), &[a]);
        (tree, [a, b, c])
    }

    fn record(tree: &MockTree, node: usize, keep: usize) -> SelectionRecord<usize> {
        let mut candidates = generate(tree, node, &DescriptorSet::default());
        candidates.truncate(keep);
        SelectionRecord::new(candidates, node, true)
    }

    #[test]
    fn test_empty_store_is_an_error() {
        let (tree, _) = list();
        let store = SelectionStore::new();
        assert!(matches!(
            generalize(&tree, &store),
            Err(Error::EmptySelectionStore)
        ));
    }

    #[test]
    fn test_class_tokens_are_relaxed_to_intersection() {
        let (tree, [a, b, _]) = list();
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, a, 2));
        let _ = store.push(record(&tree, b, 2));
        let general = generalize(&tree, &store).unwrap().unwrap();
        assert_eq!(general.selector, format!("//li[{ITEM}]"));
        assert_eq!(general.match_count, 2);
        assert_eq!(general.record_index, 0);
        assert_eq!(general.candidate_index, 1);
    }

    #[test]
    fn test_single_record_keeps_exact_class() {
        let (tree, [a, _, _]) = list();
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, a, 2));
        let general = generalize(&tree, &store).unwrap().unwrap();
        assert_eq!(general.selector, "//li[@class='item active']");
        assert_eq!(general.match_count, 1);
        assert_eq!(general.candidate_index, 1);
    }

    #[test]
    fn test_own_target_does_not_contribute_tokens() {
        let (tree, [a, b, _]) = list();
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, b, 2));
        let _ = store.push(record(&tree, a, 2));
        // Record 0 takes {item, active} from record 1's target and no longer
        // matches its own; record 1 takes {item} alone and covers both.
        let general = generalize(&tree, &store).unwrap().unwrap();
        assert_eq!(general.selector, format!("//li[{ITEM}]"));
        assert_eq!(general.record_index, 1);
        assert_eq!(general.candidate_index, 1);
        assert_eq!(general.match_count, 2);
        assert_eq!(tree.resolutions(&format!("//li[{ITEM} and {ACTIVE}]")), 1);
    }

    #[test]
    fn test_relaxation_is_resolved_once_per_record() {
        let (tree, [a, _, _]) = list();
        let candidates = generate(&tree, a, &DescriptorSet::default());
        let with_class = candidates
            .iter()
            .filter(|c| {
                c.selector()
                    .target_step()
                    .is_some_and(|s| s.predicates.iter().any(|p| p.exact_class().is_some()))
            })
            .count();
        assert!(with_class > 1);

        let mut store = SelectionStore::new();
        let _ = store.push(SelectionRecord::new(candidates.clone(), a, true));
        let _ = generalize(&tree, &store).unwrap();
        assert_eq!(tree.resolutions("//li[true()]"), 1);
        assert_eq!(tree.resolutions_containing("true()"), 1);

        // A second record starts with an empty memo.
        let _ = store.push(SelectionRecord::new(candidates, a, true));
        let _ = generalize(&tree, &store).unwrap();
        assert_eq!(tree.resolutions("//li[true()]"), 3);
        assert_eq!(tree.resolutions_containing("true()"), 3);
    }

    #[test]
    fn test_no_shared_token_leaves_predicate() {
        let (tree, [_, b, c]) = list();
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, b, 2));
        let _ = store.push(record(&tree, c, 2));
        // Each record relaxes to the other's token, which excludes its own
        // target, so only the bare tag covers both.
        let general = generalize(&tree, &store).unwrap().unwrap();
        assert_eq!(general.selector, "//li");
        assert_eq!(general.match_count, 3);
    }

    #[test]
    fn test_no_common_selector() {
        let mut tree = MockTree::default();
        let root = tree.add(None, "div", &[], "");
        let span = tree.add(Some(root), "span", &[], "");
        let link = tree.add(Some(root), "a", &[], "");
        tree.answer("//span", &[span]);
        tree.answer("//a", &[link]);
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, span, 1));
        let _ = store.push(record(&tree, link, 1));
        assert_eq!(generalize(&tree, &store).unwrap(), None);
    }

    #[test]
    fn test_ties_go_to_earliest_record() {
        let (tree, [a, b, _]) = list();
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, b, 1));
        let _ = store.push(record(&tree, a, 1));
        let general = generalize(&tree, &store).unwrap().unwrap();
        assert_eq!(general.record_index, 0);
        assert_eq!(general.candidate_index, 0);
    }

    #[test]
    fn test_engine_error_propagates() {
        let (mut tree, [a, b, _]) = list();
        tree.fail("//li");
        let mut store = SelectionStore::new();
        let _ = store.push(record(&tree, a, 1));
        let _ = store.push(record(&tree, b, 1));
        assert!(matches!(
            generalize(&tree, &store),
            Err(Error::Query(MockError(s))) if s == "//li"
        ));
    }
}
