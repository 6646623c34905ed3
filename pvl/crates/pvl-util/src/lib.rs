//! pvl-util - shared infrastructure for the PVL crates.
//!
//! This crate holds the pieces every stage of the pipeline needs:
//! source-location tracking ([`Span`]), error-context snippets, and the
//! insertion-ordered multi-valued mapping ([`OrderedMultiMap`]) that
//! backs the label tree.

pub mod multimap;
pub mod snippet;
pub mod span;

pub use multimap::{KeyNotFound, OrderedMultiMap};
pub use snippet::context_snippet;
pub use span::Span;
