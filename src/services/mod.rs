//! Wrappers for the Translator utility services that sit around the
//! knowledge providers: name resolution, identifier normalization and node
//! annotation.
//!
//! Each wrapper is a thin, synchronous client over a shared [`Transport`](crate::http::Transport).

pub mod name_resolver;
pub mod node;
pub mod node_annotator;
pub mod node_normalizer;

pub use name_resolver::{LookupOptions, NameResolver};
pub use node::{EquivalentIdentifier, TranslatorNode};
pub use node_annotator::{AnnotateOptions, NodeAnnotator};
pub use node_normalizer::{NodeNormalizer, NormalizeOptions};
