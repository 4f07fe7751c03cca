use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(HREF_SELECTOR, "[href]");
selector!(SRC_SELECTOR, "[src]");
// Only media elements take a poster frame.
selector!(POSTER_SELECTOR, "video[poster]");
selector!(SRCSET_SELECTOR, "[srcset]");
selector!(IMAGESRCSET_SELECTOR, "[imagesrcset]");
