use crate::consts;
use derive_more::Display;
use scraper::Selector;

/// Attributes that may reference a remote asset.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    #[display("href")]
    Href,
    #[display("src")]
    Src,
    #[display("poster")]
    Poster,
    #[display("srcset")]
    Srcset,
    #[display("imagesrcset")]
    ImageSrcset,
}

impl Attribute {
    /// Processing order within a document.
    pub const ALL: [Attribute; 5] = [Self::Href, Self::Src, Self::Poster, Self::Srcset, Self::ImageSrcset];

    pub fn name(self) -> &'static str {
        match self {
            Self::Href => "href",
            Self::Src => "src",
            Self::Poster => "poster",
            Self::Srcset => "srcset",
            Self::ImageSrcset => "imagesrcset",
        }
    }

    /// Whether the value is a comma-separated candidate list.
    pub fn is_multi_candidate(self) -> bool {
        matches!(self, Self::Srcset | Self::ImageSrcset)
    }

    pub(crate) fn selector(self) -> &'static Selector {
        match self {
            Self::Href => &consts::HREF_SELECTOR,
            Self::Src => &consts::SRC_SELECTOR,
            Self::Poster => &consts::POSTER_SELECTOR,
            Self::Srcset => &consts::SRCSET_SELECTOR,
            Self::ImageSrcset => &consts::IMAGESRCSET_SELECTOR,
        }
    }
}
