//! Node properties a selector may test.
//!
//! A [`DescriptorSet`] is the ordered, validated list of
//! [`PropertyDescriptor`]s used for one run. Order decides the enumeration
//! order of candidates, never their meaning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::TreeAccess;

/// Most optional descriptors a set may hold. Each node level enumerates every
/// subset of its applicable optional descriptors.
pub const MAX_OPTIONAL_DESCRIPTORS: usize = 16;

/// The kind of node property a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    /// The element's tag name. Without it a step uses the `*` wildcard.
    TagName,
    /// A named attribute, tested for equality.
    Attribute,
    /// The element's index among its siblings.
    ChildPosition,
    /// The element's text, tested for equality.
    InnerText,
}

/// One configurable selector property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Which property.
    pub kind: PropertyKind,
    /// The attribute to test; required for [`PropertyKind::Attribute`] only.
    #[serde(default, rename = "name", skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    /// Always included when applicable, instead of being toggled.
    #[serde(default)]
    pub locked: bool,
}

impl PropertyDescriptor {
    /// An optional tag-name descriptor.
    #[must_use]
    pub const fn tag_name() -> Self {
        Self {
            kind: PropertyKind::TagName,
            attribute_name: None,
            locked: false,
        }
    }

    /// An optional attribute descriptor.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            kind: PropertyKind::Attribute,
            attribute_name: Some(name.into()),
            locked: false,
        }
    }

    /// An optional sibling-position descriptor.
    #[must_use]
    pub const fn child_position() -> Self {
        Self {
            kind: PropertyKind::ChildPosition,
            attribute_name: None,
            locked: false,
        }
    }

    /// An optional text descriptor.
    ///
    /// The candidate compares `text()` against the element's whole text
    /// content, while `text()` only sees direct child text. An element whose
    /// text sits in descendants, or that has no text, cannot match such a
    /// candidate, and locking this descriptor makes `record` fail with
    /// `Unresolvable` for it.
    #[must_use]
    pub const fn inner_text() -> Self {
        Self {
            kind: PropertyKind::InnerText,
            attribute_name: None,
            locked: false,
        }
    }

    /// Mark this descriptor as always included.
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Whether this property exists on `node`.
    ///
    /// Tag name and text always apply. Position needs a parent. An attribute
    /// must be present and non-empty.
    pub fn is_applicable<T: TreeAccess + ?Sized>(&self, tree: &T, node: T::Node) -> bool {
        match self.kind {
            PropertyKind::TagName | PropertyKind::InnerText => true,
            PropertyKind::ChildPosition => tree.parent(node).is_some(),
            PropertyKind::Attribute => self
                .attribute_name
                .as_deref()
                .is_some_and(|name| tree.attribute(node, name).is_some()),
        }
    }

    fn same_property(&self, other: &Self) -> bool {
        self.kind == other.kind && self.attribute_name == other.attribute_name
    }
}

/// Rejected descriptor configuration.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// An attribute descriptor without an attribute name.
    #[error("attribute descriptor #{index} has no attribute name")]
    MissingAttributeName {
        /// Position in the descriptor list.
        index: usize,
    },

    /// A non-attribute descriptor carrying an attribute name.
    #[error("{kind:?} descriptor #{index} cannot name an attribute")]
    UnexpectedAttributeName {
        /// Position in the descriptor list.
        index: usize,
        /// The descriptor's kind.
        kind: PropertyKind,
    },

    /// The same property listed twice.
    #[error("descriptor #{index} repeats descriptor #{first}")]
    Duplicate {
        /// Position of the repeat.
        index: usize,
        /// Position of the first occurrence.
        first: usize,
    },

    /// More optional descriptors than [`MAX_OPTIONAL_DESCRIPTORS`].
    #[error("{count} optional descriptors configured, at most {max} allowed")]
    TooManyOptional {
        /// Optional descriptors in the list.
        count: usize,
        /// The allowed maximum.
        max: usize,
    },

    /// The configuration file could not be read.
    #[error("malformed descriptor configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A validated, ordered descriptor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PropertyDescriptor>", into = "Vec<PropertyDescriptor>")]
pub struct DescriptorSet {
    descriptors: Vec<PropertyDescriptor>,
}

impl DescriptorSet {
    /// Validate and wrap a descriptor list.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] for an attribute descriptor without a
    /// name, a name on any other kind, a repeated property, or more than
    /// [`MAX_OPTIONAL_DESCRIPTORS`] optional descriptors.
    pub fn new(descriptors: Vec<PropertyDescriptor>) -> Result<Self, DescriptorError> {
        for (index, descriptor) in descriptors.iter().enumerate() {
            match (descriptor.kind, descriptor.attribute_name.as_deref()) {
                (PropertyKind::Attribute, None | Some("")) => {
                    return Err(DescriptorError::MissingAttributeName { index });
                }
                (PropertyKind::Attribute, Some(_)) | (_, None) => {}
                (kind, Some(_)) => {
                    return Err(DescriptorError::UnexpectedAttributeName { index, kind });
                }
            }
            if let Some(first) = descriptors[..index]
                .iter()
                .position(|d| d.same_property(descriptor))
            {
                return Err(DescriptorError::Duplicate { index, first });
            }
        }
        let count = descriptors.iter().filter(|d| !d.locked).count();
        if count > MAX_OPTIONAL_DESCRIPTORS {
            return Err(DescriptorError::TooManyOptional {
                count,
                max: MAX_OPTIONAL_DESCRIPTORS,
            });
        }
        Ok(Self { descriptors })
    }

    /// Parse a JSON array of descriptors and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] for malformed JSON, otherwise the
    /// validation errors of [`DescriptorSet::new`].
    pub fn from_json(source: &str) -> Result<Self, DescriptorError> {
        let descriptors: Vec<PropertyDescriptor> = serde_json::from_str(source)?;
        Self::new(descriptors)
    }

    /// The descriptors in configured order.
    #[must_use]
    pub fn descriptors(&self) -> &[PropertyDescriptor] {
        &self.descriptors
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True when no descriptor is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for DescriptorSet {
    /// Locked tag name, then optional `id`, `class` and position.
    fn default() -> Self {
        Self {
            descriptors: vec![
                PropertyDescriptor::tag_name().locked(),
                PropertyDescriptor::attribute("id"),
                PropertyDescriptor::attribute("class"),
                PropertyDescriptor::child_position(),
            ],
        }
    }
}

impl TryFrom<Vec<PropertyDescriptor>> for DescriptorSet {
    type Error = DescriptorError;

    fn try_from(descriptors: Vec<PropertyDescriptor>) -> Result<Self, Self::Error> {
        Self::new(descriptors)
    }
}

impl From<DescriptorSet> for Vec<PropertyDescriptor> {
    fn from(set: DescriptorSet) -> Self {
        set.descriptors
    }
}
