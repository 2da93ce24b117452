//! Structured selectors and their rendered text.
//!
//! Selectors are built as [`Selector`] values and rendered once, so later
//! stages (token relaxation) can rewrite one predicate without re-parsing.
//!
//! Rendering follows the abbreviated XPath location-path syntax:
//!
//! ```text
//! //ul[@id='menu']/li[position()=2 and @class='item']
//! ```
//!
//! Values are interpolated verbatim. A value containing `'` produces a
//! selector the query engine will reject.

use std::fmt;

/// One test inside a step's brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Sibling index. Renders `n` alone, `position()=n` among others.
    Position(usize),
    /// `text()='value'`
    TextEquals(String),
    /// `@name='value'`
    AttributeEquals {
        /// Attribute name.
        name: String,
        /// Exact value.
        value: String,
    },
    /// One class-token containment test per token, joined with `and`.
    ClassContains(Vec<String>),
    /// `true()`
    Always,
}

impl Predicate {
    /// `@class='...'` equality, as produced for the `class` descriptor.
    #[must_use]
    pub fn exact_class(&self) -> Option<&str> {
        match self {
            Self::AttributeEquals { name, value } if name == "class" => Some(value),
            _ => None,
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, alone: bool) -> fmt::Result {
        match self {
            Self::Position(n) if alone => write!(f, "{n}"),
            Self::Position(n) => write!(f, "position()={n}"),
            Self::TextEquals(text) => write!(f, "text()='{text}'"),
            Self::AttributeEquals { name, value } => write!(f, "@{name}='{value}'"),
            Self::ClassContains(tokens) if tokens.is_empty() => write!(f, "true()"),
            Self::ClassContains(tokens) => {
                for (i, token) in tokens.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    write!(
                        f,
                        "contains(concat(' ', normalize-space(@class), ' '), ' {token} ')"
                    )?;
                }
                Ok(())
            }
            Self::Always => write!(f, "true()"),
        }
    }
}

/// One level of a path: a tag test and its predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    /// Lowercase tag name, or `None` for the `*` wildcard.
    pub tag: Option<String>,
    /// Predicates in rendering order.
    pub predicates: Vec<Predicate>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.as_deref().unwrap_or("*"))?;
        if self.predicates.is_empty() {
            return Ok(());
        }
        let alone = self.predicates.len() == 1;
        f.write_str("[")?;
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            predicate.render(f, alone)?;
        }
        f.write_str("]")
    }
}

/// An absolute selector: steps from the outermost ancestor to the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Outermost first; the last step describes the target itself.
    pub steps: Vec<Step>,
}

impl Selector {
    /// The step describing the target node.
    #[must_use]
    pub fn target_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Mutable access to the target step.
    pub fn target_step_mut(&mut self) -> Option<&mut Step> {
        self.steps.last_mut()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("//")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// A generated selector together with its place in the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    index: usize,
    selector: Selector,
    text: String,
}

impl Candidate {
    /// Render `selector` as candidate number `index`.
    #[must_use]
    pub fn new(index: usize, selector: Selector) -> Self {
        let text = selector.to_string();
        Self {
            index,
            selector,
            text,
        }
    }

    /// Position within the list that produced it.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The structured form.
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The rendered selector text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(tag: Option<&str>, predicates: Vec<Predicate>) -> Step {
        Step {
            tag: tag.map(str::to_string),
            predicates,
        }
    }

    #[test]
    fn test_bare_steps() {
        let selector = Selector {
            steps: vec![step(Some("ul"), vec![]), step(None, vec![])],
        };
        assert_eq!(selector.to_string(), "//ul/*");
    }

    #[test]
    fn test_position_alone_is_numeric() {
        assert_eq!(
            step(Some("li"), vec![Predicate::Position(2)]).to_string(),
            "li[2]"
        );
    }

    #[test]
    fn test_position_with_others_uses_function() {
        let s = step(
            Some("li"),
            vec![
                Predicate::Position(2),
                Predicate::TextEquals("Two".into()),
                Predicate::AttributeEquals {
                    name: "id".into(),
                    value: "x".into(),
                },
            ],
        );
        assert_eq!(s.to_string(), "li[position()=2 and text()='Two' and @id='x']");
    }

    #[test]
    fn test_class_contains_renders_one_test_per_token() {
        let s = step(
            Some("li"),
            vec![Predicate::ClassContains(vec!["a".into(), "b".into()])],
        );
        assert_eq!(
            s.to_string(),
            "li[contains(concat(' ', normalize-space(@class), ' '), ' a ') and \
             contains(concat(' ', normalize-space(@class), ' '), ' b ')]"
        );
    }

    #[test]
    fn test_always_placeholder() {
        assert_eq!(
            step(None, vec![Predicate::Always]).to_string(),
            "*[true()]"
        );
    }

    #[test]
    fn test_exact_class_only_matches_class() {
        let class = Predicate::AttributeEquals {
            name: "class".into(),
            value: "a b".into(),
        };
        let id = Predicate::AttributeEquals {
            name: "id".into(),
            value: "a".into(),
        };
        assert_eq!(class.exact_class(), Some("a b"));
        assert_eq!(id.exact_class(), None);
    }

    #[test]
    fn test_candidate_caches_text() {
        let candidate = Candidate::new(
            3,
            Selector {
                steps: vec![step(Some("div"), vec![])],
            },
        );
        assert_eq!(candidate.as_str(), "//div");
        assert_eq!(candidate.index(), 3);
        assert_eq!(candidate.to_string(), "//div");
    }
}
