//! Path-expression evaluation against a [`DomTree`].
//!
//! Results are element [`NodeId`]s in document order without duplicates.

use std::collections::{HashMap, HashSet};

use sift_dom::{DomTree, NodeId};

use crate::QueryError;
use crate::parser::{Axis, Expr, Function, NameTest, Path, Step, parse_path};

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    path: Path,
}

impl Query {
    /// Compile `source`.
    ///
    /// # Errors
    ///
    /// Returns the [`QueryError`] from [`parse_path`].
    pub fn compile(source: &str) -> Result<Self, QueryError> {
        Ok(Self {
            source: source.to_string(),
            path: parse_path(source)?,
        })
    }

    /// The expression text this query was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed path.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Every matching element, in document order.
    #[must_use]
    pub fn select_all(&self, tree: &DomTree) -> Vec<NodeId> {
        Evaluator::new(tree).evaluate(&self.path)
    }
}

/// Compile and evaluate in one step.
///
/// # Errors
///
/// Returns the [`QueryError`] from [`parse_path`].
pub fn select(tree: &DomTree, source: &str) -> Result<Vec<NodeId>, QueryError> {
    Ok(Query::compile(source)?.select_all(tree))
}

/// [§ 3.1 Basics](https://www.w3.org/TR/1999/REC-xpath-19991116/#section-Basics)
///
/// "An expression is evaluated to yield an object, which has one of the
/// following four basic types: node-set, boolean, number, string."
///
/// Node-sets only ever hold attribute, text, or context-element values here,
/// so they are carried as their string-values.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    NodeSet(Vec<String>),
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// [§ 4.3 `boolean()`](https://www.w3.org/TR/1999/REC-xpath-19991116/#function-boolean)
    fn to_boolean(&self) -> bool {
        match self {
            Self::NodeSet(nodes) => !nodes.is_empty(),
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    /// [§ 4.2 `string()`](https://www.w3.org/TR/1999/REC-xpath-19991116/#function-string)
    ///
    /// "A node-set is converted to a string by returning the string-value of
    /// the node in the node-set that is first in document order."
    fn into_string(self) -> String {
        match self {
            Self::NodeSet(nodes) => nodes.into_iter().next().unwrap_or_default(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => number_to_string(n),
            Self::String(s) => s,
        }
    }

    /// [§ 4.4 `number()`](https://www.w3.org/TR/1999/REC-xpath-19991116/#function-number)
    fn to_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::String(s) => string_to_number(s),
            Self::NodeSet(nodes) => nodes.first().map_or(f64::NAN, |s| string_to_number(s)),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

#[allow(clippy::cast_possible_truncation)]
fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// [§ 3.4 Booleans](https://www.w3.org/TR/1999/REC-xpath-19991116/#booleans)
///
/// Comparison of two objects with `=` (or `!=` when `negate`).
#[allow(clippy::float_cmp)]
fn compare(lhs: &Value, rhs: &Value, negate: bool) -> bool {
    let strings_match = |a: &str, b: &str| (a == b) != negate;
    let numbers_match = |a: f64, b: f64| (a == b) != negate;

    match (lhs, rhs) {
        // "If both objects to be compared are node-sets, then the comparison
        // will be true if and only if there is a node in the first node-set and
        // a node in the second node-set such that the result of performing the
        // comparison on the string-values of the two nodes is true."
        (Value::NodeSet(a), Value::NodeSet(b)) => {
            a.iter().any(|x| b.iter().any(|y| strings_match(x, y)))
        }
        (Value::NodeSet(set), Value::Number(n)) | (Value::Number(n), Value::NodeSet(set)) => {
            set.iter().any(|s| numbers_match(string_to_number(s), *n))
        }
        (Value::NodeSet(set), Value::String(s)) | (Value::String(s), Value::NodeSet(set)) => {
            set.iter().any(|x| strings_match(x, s))
        }
        (Value::NodeSet(set), Value::Boolean(b)) | (Value::Boolean(b), Value::NodeSet(set)) => {
            (!set.is_empty() == *b) != negate
        }
        // "if at least one object to be compared is a boolean, then each
        // object to be compared is converted to a boolean"
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
            (lhs.to_boolean() == rhs.to_boolean()) != negate
        }
        // "Otherwise, if at least one object to be compared is a number..."
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            numbers_match(lhs.to_number(), rhs.to_number())
        }
        (Value::String(a), Value::String(b)) => strings_match(a, b),
    }
}

/// "normalize-space: stripping leading and trailing whitespace and replacing
/// sequences of whitespace characters by a single space"
fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [§ 1 Introduction](https://www.w3.org/TR/1999/REC-xpath-19991116/#section-Introduction)
///
/// "the context consists of: a node (the context node), a pair of non-zero
/// positive integers (the context position and the context size)..."
#[derive(Clone, Copy)]
struct Context {
    node: NodeId,
    position: usize,
    size: usize,
}

struct Evaluator<'a> {
    tree: &'a DomTree,
    /// Preorder index of every node, for sorting into document order.
    order: HashMap<NodeId, usize>,
}

impl<'a> Evaluator<'a> {
    fn new(tree: &'a DomTree) -> Self {
        let order = tree
            .descendants(tree.root())
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        Self { tree, order }
    }

    fn evaluate(&self, path: &Path) -> Vec<NodeId> {
        let mut context = vec![self.tree.root()];
        for step in &path.steps {
            context = self.evaluate_step(step, &context);
            if context.is_empty() {
                break;
            }
        }
        context
    }

    /// Apply one step to every node of the context set and merge the results.
    fn evaluate_step(&self, step: &Step, context: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for &origin in context {
            // The child axis is evaluated per parent so that positions count
            // siblings, which is what `//li[2]` means.
            let parents: Vec<NodeId> = match step.axis {
                Axis::Child => vec![origin],
                Axis::Descendant => self.tree.descendants(origin).collect(),
            };
            for parent in parents {
                let mut candidates: Vec<NodeId> = self
                    .tree
                    .element_children(parent)
                    .filter(|&c| self.name_matches(&step.test, c))
                    .collect();
                for predicate in &step.predicates {
                    candidates = self.filter(predicate, &candidates);
                }
                result.extend(candidates.into_iter().filter(|&c| seen.insert(c)));
            }
        }

        result.sort_by_key(|id| self.order.get(id).copied().unwrap_or(usize::MAX));
        result
    }

    fn name_matches(&self, test: &NameTest, id: NodeId) -> bool {
        match test {
            NameTest::Any => self.tree.as_element(id).is_some(),
            NameTest::Name(name) => self
                .tree
                .as_element(id)
                .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(name)),
        }
    }

    /// [§ 2.4 Predicates](https://www.w3.org/TR/1999/REC-xpath-19991116/#predicates)
    ///
    /// "If the result is a number, the result will be converted to true if the
    /// number is equal to the context position and will be converted to false
    /// otherwise; if the result is not a number, then the result will be
    /// converted as if by a call to the boolean function."
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn filter(&self, predicate: &Expr, candidates: &[NodeId]) -> Vec<NodeId> {
        let size = candidates.len();
        candidates
            .iter()
            .enumerate()
            .filter(|&(i, &node)| {
                let ctx = Context {
                    node,
                    position: i + 1,
                    size,
                };
                match self.value(predicate, ctx) {
                    Value::Number(n) => n == ctx.position as f64,
                    other => other.to_boolean(),
                }
            })
            .map(|(_, &node)| node)
            .collect()
    }

    fn value(&self, expr: &Expr, ctx: Context) -> Value {
        match expr {
            Expr::Or(a, b) => Value::Boolean(
                self.value(a, ctx).to_boolean() || self.value(b, ctx).to_boolean(),
            ),
            Expr::And(a, b) => Value::Boolean(
                self.value(a, ctx).to_boolean() && self.value(b, ctx).to_boolean(),
            ),
            Expr::Equals(a, b) => {
                Value::Boolean(compare(&self.value(a, ctx), &self.value(b, ctx), false))
            }
            Expr::NotEquals(a, b) => {
                Value::Boolean(compare(&self.value(a, ctx), &self.value(b, ctx), true))
            }
            Expr::Literal(s) => Value::String(s.clone()),
            Expr::Number(n) => Value::Number(*n),
            // The raw attribute value: an empty attribute still exists here,
            // unlike in selector synthesis.
            Expr::Attribute(name) => Value::NodeSet(
                self.tree
                    .as_element(ctx.node)
                    .and_then(|e| e.attrs.get(name.as_str()))
                    .cloned()
                    .into_iter()
                    .collect(),
            ),
            Expr::Text => Value::NodeSet(
                self.tree
                    .child_texts(ctx.node)
                    .map(str::to_string)
                    .collect(),
            ),
            Expr::ContextNode => Value::NodeSet(vec![self.tree.text_content(ctx.node)]),
            Expr::Call(function, args) => self.call(*function, args, ctx),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn call(&self, function: Function, args: &[Expr], ctx: Context) -> Value {
        let string_arg = |i: usize| {
            args.get(i)
                .map_or_else(String::new, |a| self.value(a, ctx).into_string())
        };
        match function {
            Function::True => Value::Boolean(true),
            Function::False => Value::Boolean(false),
            Function::Not => Value::Boolean(
                !args
                    .first()
                    .is_some_and(|a| self.value(a, ctx).to_boolean()),
            ),
            Function::Position => Value::Number(ctx.position as f64),
            Function::Last => Value::Number(ctx.size as f64),
            Function::Contains => Value::Boolean(string_arg(0).contains(&string_arg(1))),
            Function::StartsWith => Value::Boolean(string_arg(0).starts_with(&string_arg(1))),
            Function::Concat => Value::String((0..args.len()).map(string_arg).collect()),
            Function::NormalizeSpace => {
                let input = if args.is_empty() {
                    self.tree.text_content(ctx.node)
                } else {
                    string_arg(0)
                };
                Value::String(normalize_space(&input))
            }
        }
    }
}
