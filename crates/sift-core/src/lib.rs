//! Selector synthesis core for Sift.
//!
//! Given a node in a document tree, this crate enumerates candidate path
//! selectors from least to most specific, trims the list at the first
//! selector that is unique, and generalizes across several recorded nodes to
//! find one selector matching all of them.
//!
//! # Pipeline
//!
//! 1. [`generator::generate`] - candidates for one node, using a [`DescriptorSet`]
//! 2. [`truncate::truncate`] - cut at the first uniquely-resolving candidate
//! 3. [`store::SelectionStore`] - recorded (candidates, resolved node) pairs
//! 4. [`generalize::generalize`] - the best selector shared by every record
//!
//! [`Session`] ties the steps together for a host that supplies a tree and a
//! query engine through the traits in [`host`].

pub mod descriptor;
pub mod error;
pub mod generalize;
pub mod generator;
pub mod host;
pub mod selector;
pub mod session;
pub mod store;
pub mod truncate;

#[cfg(test)]
mod testing;

pub use descriptor::{
    DescriptorError, DescriptorSet, MAX_OPTIONAL_DESCRIPTORS, PropertyDescriptor, PropertyKind,
};
pub use error::Error;
pub use generalize::{GeneralSelector, generalize};
pub use generator::generate;
pub use host::{QueryEngine, Resolution, TreeAccess};
pub use selector::{Candidate, Predicate, Selector, Step};
pub use session::Session;
pub use store::{SelectionRecord, SelectionStore};
pub use truncate::{Synthesis, truncate};
