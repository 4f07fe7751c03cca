//! Multi-candidate attribute values (`srcset`, `imagesrcset`).
//!
//! A value is a comma-separated list of candidates. Each candidate is a URL
//! token followed by an optional descriptor (`" 2x"`, `" 480w"`) that is
//! carried over untouched.

use magpie_cache::Cache;

/// Separator used when joining rewritten candidates.
pub const SEPARATOR: &str = ", ";

/// One entry of a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub url: &'a str,
    /// Everything after the URL token, leading whitespace included.
    pub descriptor: &'a str,
}

/// Split `value` into candidates, skipping empty ones.
///
/// ```
/// use magpie_rewrite::srcset::{Candidate, candidates};
///
/// let parsed: Vec<_> = candidates(" a.png 1x,b.png  2x ,, ").collect();
/// assert_eq!(parsed, vec![
///     Candidate { url: "a.png", descriptor: " 1x" },
///     Candidate { url: "b.png", descriptor: "  2x" },
/// ]);
/// ```
pub fn candidates(value: &str) -> impl Iterator<Item = Candidate<'_>> {
    value.split(',').map(str::trim).filter(|candidate| !candidate.is_empty()).map(|candidate| {
        let end = candidate.find(char::is_whitespace).unwrap_or(candidate.len());
        let (url, descriptor) = candidate.split_at(end);
        Candidate { url, descriptor }
    })
}

/// Localize every candidate URL of `value` and rejoin with [`SEPARATOR`].
///
/// Candidates are processed in order, one at a time.
pub async fn localize(cache: &Cache, value: &str) -> magpie_cache::error::Result<String> {
    let mut rewritten = Vec::new();
    for Candidate { url, descriptor } in candidates(value) {
        let local = cache.ensure_cached(url).await?;
        rewritten.push(format!("{local}{descriptor}"));
    }
    Ok(rewritten.join(SEPARATOR))
}
