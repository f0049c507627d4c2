//! URL handling module for Sumi-Seek
//!
//! This module provides the canonical URL form used as the identity of a page
//! in the index, and the filter that decides whether an anchor's href becomes
//! a link edge.

mod normalize;

// Re-export main functions
pub use normalize::{canonicalize_seed, canonicalize_url, filter_link, BINARY_EXTENSIONS};
