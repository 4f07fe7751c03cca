use magpie_config::{KeyAlgorithm, Settings};
use sha1::{Digest, Sha1};
use std::fmt;
use std::sync::Arc;

/// Decides whether a URL should be downloaded and served locally.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;
/// Derives a stable, path-safe identifier from a URL.
pub type KeyDeriver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Runtime configuration of a [`Cache`](crate::Cache).
///
/// Built from [`Settings`] (or [`Default`], which uses the default settings),
/// then adjusted with the `with_*` overrides, each of which replaces exactly
/// one field.
///
/// ```
/// use magpie_cache::Options;
///
/// let options = Options::default()
///     .with_folder("remote/")
///     .with_should_cache(|url| url.starts_with("https://images.example.test/"));
/// assert!(options.is_cacheable("https://images.example.test/a"));
/// assert!(!options.is_cacheable("https://example.test/a.png"));
/// ```
#[derive(Clone)]
pub struct Options {
    /// Suffixes of the documents to rewrite.
    pub extensions: Vec<String>,
    pub should_cache: Predicate,
    pub derive_key: KeyDeriver,
    /// Folder, below the site root, receiving cached assets. Leading and
    /// trailing slashes are ignored.
    pub folder: String,
    /// Emit a terminal progress line per download.
    pub log_output: bool,
}

impl Options {
    pub fn is_cacheable(&self, url: &str) -> bool {
        (self.should_cache)(url)
    }

    pub fn key(&self, url: &str) -> String {
        (self.derive_key)(url)
    }

    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_should_cache(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.should_cache = Arc::new(predicate);
        self
    }

    pub fn with_derive_key(mut self, derive: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.derive_key = Arc::new(derive);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_log_output(mut self, log_output: bool) -> Self {
        self.log_output = log_output;
        self
    }
}

impl From<&Settings> for Options {
    fn from(settings: &Settings) -> Self {
        let derive_key: KeyDeriver = match settings.key {
            KeyAlgorithm::Sha1 => Arc::new(sha1_key),
            KeyAlgorithm::Blake3 => Arc::new(blake3_key),
        };
        Self {
            extensions: settings.extensions.clone(),
            should_cache: https_with_suffix(settings.cacheable.clone()),
            derive_key,
            folder: settings.folder.clone(),
            log_output: settings.log_output,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("extensions", &self.extensions)
            .field("folder", &self.folder)
            .field("log_output", &self.log_output)
            .finish_non_exhaustive()
    }
}

/// The default predicate: secure HTTP only, and the URL must end with one of
/// `suffixes` (case-sensitive, so `.PNG` does not match `.png`).
pub fn https_with_suffix(suffixes: Vec<String>) -> Predicate {
    Arc::new(move |url: &str| url.starts_with("https://") && suffixes.iter().any(|suffix| url.ends_with(suffix.as_str())))
}

/// Lowercase hex SHA-1 of the URL text.
pub fn sha1_key(url: &str) -> String {
    hex::encode(Sha1::digest(url.as_bytes()))
}

/// Lowercase hex BLAKE3 of the URL text.
pub fn blake3_key(url: &str) -> String {
    blake3::hash(url.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://x.test/a.png", true)]
    #[case("https://x.test/a.jpeg", true)]
    #[case("https://x.test/favicon.ico", true)]
    #[case("https://x.test/a.webp", true)]
    #[case("http://x.test/a.png", false)]
    #[case("//x.test/a.png", false)]
    #[case("/local/a.png", false)]
    #[case("https://x.test/a.PNG", false)]
    #[case("https://x.test/a.png?size=2", false)]
    #[case("https://x.test/doc.pdf", false)]
    #[case("https://x.test/", false)]
    #[case("", false)]
    fn default_predicate(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(Options::default().is_cacheable(url), expected);
    }

    #[test]
    fn sha1_known_value() {
        assert_eq!(sha1_key("https://example.test/pic.jpg"), "31c33bdaad775abe578fd7c32c913054fdeed308");
    }

    #[test]
    fn blake3_is_hex_and_distinct() {
        let key = blake3_key("https://x.test/a.png");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(key, blake3_key("https://x.test/b.png"));
        assert_eq!(key, blake3::hash(b"https://x.test/a.png").to_hex().as_str());
    }

    #[test]
    fn settings_select_the_key() {
        let settings = Settings { key: KeyAlgorithm::Blake3, ..Settings::default() };
        let options = Options::from(&settings);
        assert_eq!(options.key("https://x.test/a.png"), blake3_key("https://x.test/a.png"));
        assert_eq!(Options::default().key("https://x.test/a.png"), sha1_key("https://x.test/a.png"));
    }

    #[test]
    fn settings_drive_the_predicate() {
        let settings = Settings { cacheable: vec![".avif".to_string()], ..Settings::default() };
        let options = Options::from(&settings);
        assert!(options.is_cacheable("https://x.test/a.avif"));
        assert!(!options.is_cacheable("https://x.test/a.png"));
    }

    #[test]
    fn overrides_replace_single_fields() {
        let options = Options::default().with_folder("assets").with_log_output(false).with_extensions([".htm"]);
        assert_eq!(options.folder, "assets");
        assert!(!options.log_output);
        assert_eq!(options.extensions, vec![".htm"]);
        // Untouched fields keep their defaults.
        assert!(options.is_cacheable("https://x.test/a.png"));
        assert_eq!(options.key("u"), sha1_key("u"));
    }

    #[test]
    fn custom_key_deriver() {
        let options = Options::default().with_derive_key(|url| url.len().to_string());
        assert_eq!(options.key("https://x.test/a.png"), "20");
    }
}
