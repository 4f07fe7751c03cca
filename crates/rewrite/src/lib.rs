//! Points the remote asset references of an HTML document at local copies.
//!
//! Every URL found in `href`, `src`, `video[poster]`, `srcset` and
//! `imagesrcset` goes through [`Cache::ensure_cached`](magpie_cache::Cache::ensure_cached);
//! multi-candidate attributes keep their width/density descriptors verbatim.

mod attribute;
mod consts;
mod document;
pub mod error;
pub mod srcset;

pub use crate::attribute::Attribute;
pub use crate::document::{Rewrite, rewrite};
