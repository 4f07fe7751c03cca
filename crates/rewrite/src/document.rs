use crate::attribute::Attribute;
use crate::error::{ErrorKind, Result};
use crate::srcset;
use exn::ResultExt;
use magpie_cache::Cache;
use scraper::{Html, Node};
use tendril::StrTendril;
use tracing::{debug, instrument};

/// Outcome of [`rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// No attribute value changed; the original text should be kept as-is.
    Unchanged,
    /// The re-serialized document.
    Rewritten(String),
}

impl Rewrite {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// The document text, falling back to `original` when nothing changed.
    pub fn into_html(self, original: &str) -> String {
        match self {
            Self::Unchanged => original.to_string(),
            Self::Rewritten(html) => html,
        }
    }
}

/// Localize every asset reference in `html`.
///
/// Attributes are handled one category at a time ([`Attribute::ALL`]), and
/// within a category in document order; each value is awaited before the
/// next one starts. The document is only re-serialized when at least one
/// value actually changed.
///
/// The returned future is not `Send`: the parsed document lives across the
/// downloads. Drive several documents concurrently within one task.
///
/// # Errors
///
/// Returns [`Cache`](ErrorKind::Cache) as soon as one reference cannot be
/// localized; the remaining references are left untouched.
#[instrument(skip_all, fields(html_size = html.len()))]
pub async fn rewrite(cache: &Cache, html: &str) -> Result<Rewrite> {
    let mut document = Html::parse_document(html);
    let mut changed = 0usize;

    for attribute in Attribute::ALL {
        let name = attribute.name();
        let targets: Vec<_> = document
            .select(attribute.selector())
            .filter_map(|element| element.value().attr(name).map(|value| (element.id(), value.to_string())))
            .collect();

        for (id, value) in targets {
            let localized = if attribute.is_multi_candidate() {
                srcset::localize(cache, &value).await
            } else {
                cache.ensure_cached(&value).await
            }
            .or_raise(|| ErrorKind::Cache { attribute: name, value: value.clone() })?;
            if localized == value {
                continue;
            }
            let Some(mut node) = document.tree.get_mut(id) else {
                continue;
            };
            let Node::Element(element) = node.value() else {
                continue;
            };
            for (key, current) in element.attrs.iter_mut() {
                if &*key.local == name {
                    *current = StrTendril::from(localized.as_str());
                    changed += 1;
                }
            }
        }
    }

    if changed == 0 {
        return Ok(Rewrite::Unchanged);
    }
    debug!(changed, "Rewrote asset references");
    Ok(Rewrite::Rewritten(document.html()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_cache::{MockFetcher, Options, sha1_key};
    use magpie_storage::backend::MemoryBackend;
    use rstest::rstest;
    use std::sync::Arc;

    fn cache(fetcher: Arc<MockFetcher>) -> Cache {
        let options = Options::default().with_log_output(false);
        Cache::new(options, fetcher, Arc::new(MemoryBackend::default()))
    }

    fn cached(url: &str) -> String {
        let extension = url.rsplit_once('.').map(|(_, extension)| extension).unwrap_or_default();
        format!("/cache/{}.{extension}", sha1_key(url))
    }

    #[rstest]
    #[case::href(r#"<link rel="icon" href="https://x.test/favicon.ico">"#, "href", "https://x.test/favicon.ico")]
    #[case::src(r#"<img src="https://x.test/a.png">"#, "src", "https://x.test/a.png")]
    #[case::poster(r#"<video poster="https://x.test/frame.webp"></video>"#, "poster", "https://x.test/frame.webp")]
    #[tokio::test]
    async fn single_value_attributes(#[case] html: &str, #[case] attribute: &str, #[case] url: &str) {
        let fetcher = Arc::new(MockFetcher::default().with_fallback(*b"data"));
        let cache = cache(fetcher.clone());
        let output = rewrite(&cache, html).await.unwrap().into_html(html);
        assert!(output.contains(&format!(r#"{attribute}="{}""#, cached(url))), "{output}");
        assert!(!output.contains(url));
        assert_eq!(fetcher.calls(url), 1);
    }

    #[tokio::test]
    async fn poster_outside_video_is_ignored() {
        let fetcher = Arc::new(MockFetcher::default().with_fallback(*b"data"));
        let cache = cache(fetcher.clone());
        let html = r#"<img poster="https://x.test/frame.png">"#;
        assert_eq!(rewrite(&cache, html).await.unwrap(), Rewrite::Unchanged);
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn srcset_keeps_descriptors() {
        let fetcher = Arc::new(MockFetcher::default().with_fallback(*b"data"));
        let cache = cache(fetcher.clone());
        let (a, b) = ("https://x.test/a.png", "https://x.test/b.png");
        let html = format!(r#"<img srcset="{a} 1x, {b} 2x">"#);
        let output = rewrite(&cache, &html).await.unwrap().into_html(&html);
        assert!(output.contains(&format!(r#"srcset="{} 1x, {} 2x""#, cached(a), cached(b))), "{output}");
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test]
    async fn imagesrcset_mixes_local_and_remote() {
        let fetcher = Arc::new(MockFetcher::default().with_fallback(*b"data"));
        let cache = cache(fetcher.clone());
        let remote = "https://x.test/hero.jpg";
        let html = format!(r#"<link rel="preload" as="image" imagesrcset="/hero-480.jpg 480w,{remote} 1080w">"#);
        let output = rewrite(&cache, &html).await.unwrap().into_html(&html);
        assert!(output.contains(&format!(r#"imagesrcset="/hero-480.jpg 480w, {} 1080w""#, cached(remote))), "{output}");
        assert_eq!(fetcher.total_calls(), 1);
    }

    #[tokio::test]
    async fn shared_urls_fetch_once_per_document() {
        let fetcher = Arc::new(MockFetcher::default().with_fallback(*b"data"));
        let cache = cache(fetcher.clone());
        let url = "https://x.test/a.png";
        let html = format!(r#"<a href="{url}"><img src="{url}" srcset="{url} 2x"></a>"#);
        let output = rewrite(&cache, &html).await.unwrap().into_html(&html);
        assert_eq!(output.matches(&cached(url)).count(), 3);
        assert_eq!(fetcher.calls(url), 1);
    }

    #[rstest]
    #[case::no_attributes("<!DOCTYPE html><html><head></head><body><p>Hello</p></body></html>")]
    #[case::local_only(r#"<a href="/about/">About</a><img src="/logo.png" srcset="/logo@2x.png 2x">"#)]
    #[case::insecure(r#"<img src="http://x.test/a.png">"#)]
    #[case::empty_values(r#"<a href="">x</a><img src="" srcset="">"#)]
    #[tokio::test]
    async fn unchanged_documents(#[case] html: &str) {
        let fetcher = Arc::new(MockFetcher::default().with_fallback(*b"data"));
        let cache = cache(fetcher.clone());
        assert_eq!(rewrite(&cache, html).await.unwrap(), Rewrite::Unchanged);
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn failure_names_the_attribute() {
        let fetcher = Arc::new(MockFetcher::default());
        let cache = cache(fetcher);
        let err = rewrite(&cache, r#"<img src="https://x.test/missing.png">"#).await.unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::Cache { attribute: "src", value: "https://x.test/missing.png".to_string() }
        );
    }
}
