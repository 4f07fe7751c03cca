use crate::options::Options;

/// How a single attribute URL should be treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Nothing to do for an empty value.
    Empty,
    /// The URL is not cacheable and is kept as-is.
    Passthrough(&'a str),
    /// The URL is cacheable and will be served from `path`.
    Cached { url: &'a str, path: String },
}

impl Resolution<'_> {
    /// The value that should replace the original URL in the document.
    pub fn into_path(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Passthrough(url) => url.to_string(),
            Self::Cached { path, .. } => path,
        }
    }
}

/// Classify `url` and, when cacheable, derive its local path.
///
/// Pure: the same URL and options always resolve to the same value, and
/// nothing is fetched.
pub fn resolve<'a>(url: &'a str, options: &Options) -> Resolution<'a> {
    if url.is_empty() {
        return Resolution::Empty;
    }
    if !options.is_cacheable(url) {
        return Resolution::Passthrough(url);
    }
    let key = options.key(url);
    let mut path = String::from("/");
    let folder = options.folder.trim_matches('/');
    // An empty folder must not yield `//key`, which browsers read as a host.
    if !folder.is_empty() {
        path.push_str(folder);
        path.push('/');
    }
    path.push_str(&key);
    if let Some(extension) = extension(url) {
        path.push('.');
        path.push_str(extension);
    }
    Resolution::Cached { url, path }
}

/// Shorthand for [`resolve`] when only the replacement value matters.
///
/// ```
/// use magpie_cache::{Options, resolve_path};
///
/// let options = Options::default();
/// assert_eq!(resolve_path("", &options), "");
/// assert_eq!(resolve_path("/img/logo.png", &options), "/img/logo.png");
/// assert_eq!(
///     resolve_path("https://example.test/pic.jpg", &options),
///     "/cache/31c33bdaad775abe578fd7c32c913054fdeed308.jpg",
/// );
/// ```
pub fn resolve_path(url: &str, options: &Options) -> String {
    resolve(url, options).into_path()
}

/// Text after the final `.`, if that dot lives in the last path segment.
fn extension(url: &str) -> Option<&str> {
    let (_, extension) = url.rsplit_once('.')?;
    if extension.is_empty() || extension.contains('/') {
        return None;
    }
    Some(extension)
}
