//! Cutting a candidate list at its first unique selector.

use tracing::{debug, trace};

use crate::host::Resolution;
use crate::selector::Candidate;

/// A truncated candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    /// Prefix of the generated list, least specific first. Never empty for
    /// non-empty input.
    pub candidates: Vec<Candidate>,
    /// Whether the last candidate resolved to exactly one node. When false
    /// the whole list was kept and its last entry is only the most specific
    /// fallback.
    pub guaranteed_unique: bool,
}

impl Synthesis {
    /// The last and most specific candidate.
    #[must_use]
    pub fn most_specific(&self) -> Option<&Candidate> {
        self.candidates.last()
    }

    /// Number of candidates kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True for an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Keep candidates up to and including the first that resolves to exactly
/// one node.
///
/// `resolve` reports the first match and whether a second exists. A
/// candidate matching nothing does not stop the scan. When none is unique,
/// the full list is returned with `guaranteed_unique` unset.
///
/// # Errors
///
/// Stops at and returns the first error from `resolve`.
pub fn truncate<N, E, F>(mut candidates: Vec<Candidate>, mut resolve: F) -> Result<Synthesis, E>
where
    F: FnMut(&str) -> Result<Resolution<N>, E>,
{
    let total = candidates.len();
    let mut keep = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let resolution = resolve(candidate.as_str())?;
        trace!(
            selector = candidate.as_str(),
            found = resolution.first.is_some(),
            has_second = resolution.has_second,
            "resolved candidate"
        );
        if resolution.is_unique() {
            keep = Some(i + 1);
            break;
        }
    }

    if let Some(keep) = keep {
        candidates.truncate(keep);
    }
    let guaranteed_unique = keep.is_some();
    debug!(
        kept = candidates.len(),
        total,
        guaranteed_unique,
        "truncated candidates"
    );
    Ok(Synthesis {
        candidates,
        guaranteed_unique,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{Selector, Step};

    fn candidates(tags: &[&str]) -> Vec<Candidate> {
        tags.iter()
            .enumerate()
            .map(|(i, tag)| {
                Candidate::new(
                    i,
                    Selector {
                        steps: vec![Step {
                            tag: Some((*tag).to_string()),
                            predicates: Vec::new(),
                        }],
                    },
                )
            })
            .collect()
    }

    fn counts<'a>(
        table: &'a [(&'a str, usize)],
    ) -> impl FnMut(&str) -> Result<Resolution<usize>, ()> + 'a {
        move |selector| {
            let n = table
                .iter()
                .find(|(s, _)| *s == selector)
                .map_or(0, |(_, n)| *n);
            Ok(Resolution {
                first: (n > 0).then_some(0),
                has_second: n > 1,
            })
        }
    }

    #[test]
    fn test_stops_at_first_unique() {
        let table = [("//a", 3), ("//b", 1), ("//c", 1)];
        let result = truncate(candidates(&["a", "b", "c"]), counts(&table)).unwrap();
        assert!(result.guaranteed_unique);
        assert_eq!(result.len(), 2);
        assert_eq!(result.most_specific().unwrap().as_str(), "//b");
    }

    #[test]
    fn test_zero_matches_do_not_stop() {
        let table = [("//a", 0), ("//b", 1)];
        let result = truncate(candidates(&["a", "b"]), counts(&table)).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.guaranteed_unique);
    }

    #[test]
    fn test_no_unique_keeps_everything() {
        let table = [("//a", 2), ("//b", 2)];
        let result = truncate(candidates(&["a", "b"]), counts(&table)).unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.guaranteed_unique);
    }

    #[test]
    fn test_first_candidate_unique() {
        let table = [("//a", 1)];
        let result = truncate(candidates(&["a", "b", "c"]), counts(&table)).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_error_short_circuits() {
        let mut calls = 0;
        let result = truncate(candidates(&["a", "b"]), |_| -> Result<Resolution<usize>, &str> {
            calls += 1;
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_empty_input() {
        let result = truncate(Vec::new(), counts(&[])).unwrap();
        assert!(result.is_empty());
        assert!(!result.guaranteed_unique);
    }
}
