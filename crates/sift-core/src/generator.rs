//! Candidate selector generation.
//!
//! For one node, every subset of its optional applicable descriptors gives
//! one step, ordered from least to most specific. The full candidate list is
//! then assembled walking up the ancestors:
//!
//! ```text
//! own(target)
//! own(parent)      / max(target)
//! own(grandparent) / max(parent) / max(target)
//! ...
//! own(root)        / max(..)     / max(target)
//! ```
//!
//! where `max(n)` is the most specific step of `n`. Specificity therefore
//! grows along the list, cheapest context first.

use tracing::{debug, trace};

use crate::descriptor::{DescriptorSet, PropertyKind};
use crate::host::TreeAccess;
use crate::selector::{Candidate, Predicate, Selector, Step};

/// Every candidate selector for `node`, least specific first.
///
/// Never empty and deterministic for a given tree state. The last candidate
/// uses every applicable descriptor at every level.
#[must_use]
pub fn generate<T: TreeAccess + ?Sized>(
    tree: &T,
    node: T::Node,
    descriptors: &DescriptorSet,
) -> Vec<Candidate> {
    let mut selectors: Vec<Selector> = Vec::new();
    // Most specific steps of the levels already visited, outermost first.
    let mut suffix: Vec<Step> = Vec::new();
    let mut level = Some(node);

    while let Some(current) = level {
        let own = own_level_steps(tree, current, descriptors);
        trace!(node = ?current, steps = own.len(), "own-level steps");
        for step in &own {
            let mut steps = Vec::with_capacity(suffix.len() + 1);
            steps.push(step.clone());
            steps.extend_from_slice(&suffix);
            selectors.push(Selector { steps });
        }
        if let Some(most_specific) = own.into_iter().last() {
            suffix.insert(0, most_specific);
        }
        level = tree.parent(current);
    }

    debug!(node = ?node, candidates = selectors.len(), depth = suffix.len(), "generated candidates");
    selectors
        .into_iter()
        .enumerate()
        .map(|(index, selector)| Candidate::new(index, selector))
        .collect()
}

/// The steps describing `node` alone, one per subset of its optional
/// applicable descriptors.
///
/// Bit `b` of the subset mask selects the `b`-th optional applicable
/// descriptor, and masks ascend, so the first step has only the locked
/// descriptors and the last has all of them. Never empty.
#[must_use]
pub fn own_level_steps<T: TreeAccess + ?Sized>(
    tree: &T,
    node: T::Node,
    descriptors: &DescriptorSet,
) -> Vec<Step> {
    let mut locked = Vec::new();
    let mut optional = Vec::new();
    for (i, descriptor) in descriptors.descriptors().iter().enumerate() {
        if !descriptor.is_applicable(tree, node) {
            continue;
        }
        if descriptor.locked {
            locked.push(i);
        } else {
            optional.push(i);
        }
    }

    // At most MAX_OPTIONAL_DESCRIPTORS bits.
    let subsets = 1_usize << optional.len();
    let mut steps = Vec::with_capacity(subsets);
    let mut included = vec![false; descriptors.len()];
    for mask in 0..subsets {
        included.fill(false);
        for &i in &locked {
            included[i] = true;
        }
        for (bit, &i) in optional.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                included[i] = true;
            }
        }
        steps.push(render_step(tree, node, descriptors, &included));
    }
    steps
}

/// Tag test, then position, text, and attribute predicates in descriptor order.
fn render_step<T: TreeAccess + ?Sized>(
    tree: &T,
    node: T::Node,
    descriptors: &DescriptorSet,
    included: &[bool],
) -> Step {
    let selected = || {
        descriptors
            .descriptors()
            .iter()
            .zip(included)
            .filter_map(|(d, &on)| on.then_some(d))
    };
    let has = |kind: PropertyKind| selected().any(|d| d.kind == kind);

    let tag = has(PropertyKind::TagName).then(|| tree.tag_name(node).to_lowercase());

    let mut predicates = Vec::new();
    if has(PropertyKind::ChildPosition) {
        // A wildcard step counts every element sibling, a named one only its own tag.
        let position = if tag.is_some() {
            tree.same_tag_position(node)
        } else {
            tree.element_position(node)
        };
        if let Some(position) = position {
            predicates.push(Predicate::Position(position));
        }
    }
    if has(PropertyKind::InnerText) {
        predicates.push(Predicate::TextEquals(tree.text_content(node)));
    }
    for descriptor in selected().filter(|d| d.kind == PropertyKind::Attribute) {
        let Some(name) = descriptor.attribute_name.as_deref() else {
            continue;
        };
        if let Some(value) = tree.attribute(node, name) {
            predicates.push(Predicate::AttributeEquals {
                name: name.to_string(),
                value: value.into_owned(),
            });
        }
    }

    Step { tag, predicates }
}
