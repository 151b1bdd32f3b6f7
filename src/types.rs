use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level content kind. `Ad` only ever arrives embedded in another category's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Gif,
    Sticker,
    Clip,
    Meme,
    Ad,
}

impl ContentCategory {
    /// Categories that own an endpoint family and can be paged.
    pub const PAGEABLE: [ContentCategory; 4] = [
        ContentCategory::Gif,
        ContentCategory::Sticker,
        ContentCategory::Clip,
        ContentCategory::Meme,
    ];

    /// Path segment of the endpoint family, `None` for ads.
    pub fn path_segment(self) -> Option<&'static str> {
        match self {
            ContentCategory::Gif => Some("gifs"),
            ContentCategory::Sticker => Some("stickers"),
            ContentCategory::Clip => Some("clips"),
            ContentCategory::Meme => Some("static-memes"),
            ContentCategory::Ad => None,
        }
    }

    /// Plural label for tabs and headers.
    pub fn title(self) -> &'static str {
        match self {
            ContentCategory::Gif => "GIFs",
            ContentCategory::Sticker => "Stickers",
            ContentCategory::Clip => "Clips",
            ContentCategory::Meme => "Memes",
            ContentCategory::Ad => "Ads",
        }
    }

    pub fn singular_name(self) -> &'static str {
        match self {
            ContentCategory::Gif => "GIF",
            ContentCategory::Sticker => "Sticker",
            ContentCategory::Clip => "Clip",
            ContentCategory::Meme => "Meme",
            ContentCategory::Ad => "Ad",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment().unwrap_or("ads"))
    }
}

impl FromStr for ContentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gif" | "gifs" => Ok(ContentCategory::Gif),
            "sticker" | "stickers" => Ok(ContentCategory::Sticker),
            "clip" | "clips" => Ok(ContentCategory::Clip),
            "meme" | "memes" | "static-meme" | "static-memes" => Ok(ContentCategory::Meme),
            "ad" | "ads" => Ok(ContentCategory::Ad),
            other => Err(format!("unknown content category: {other}")),
        }
    }
}

/// One renderable asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A normalized media item.
///
/// For GIFs and stickers the low variant is a small preview and the high variant the full
/// asset. For clips the low variant is the gif selector thumbnail and the high variant the
/// mp4 playback asset. Ads carry the creative in the low variant only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub title: Option<String>,
    /// Decoded blur-preview image bytes.
    #[serde(skip)]
    pub placeholder_image: Option<Vec<u8>>,
    pub low_quality_variant: Option<MediaVariant>,
    pub high_quality_variant: Option<MediaVariant>,
    pub category: ContentCategory,
}

impl MediaItem {
    pub fn is_ad(&self) -> bool {
        self.category == ContentCategory::Ad
    }
}

/// A browsing facet; `query` is sent back as the filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub query: String,
    pub preview_url: Option<String>,
}

impl Category {
    /// Whether this is the "recent" pseudo-category.
    pub fn is_recent(&self) -> bool {
        self.title.eq_ignore_ascii_case("recent")
    }
}

/// One page of media. An empty page marks the end of pagination and is not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPage {
    pub items: Vec<MediaItem>,
    pub item_min_width: u32,
    /// Maximum ad up-scale factor, 0..1.
    pub ad_max_resize_percent: f32,
}

impl MediaPage {
    pub fn empty() -> Self {
        Self { items: Vec::new(), item_min_width: 0, ad_max_resize_percent: 0.0 }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MediaPage {
    fn default() -> Self {
        Self::empty()
    }
}
