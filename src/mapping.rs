use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use tracing::warn;

use crate::dto::{
    AdItemDto, CategoriesDataDto, CategoriesResponseDto, ClipItemDto, DataDto, FileMetaDto, FileTypesDto,
    GeneralItemDto, MediaItemResponseDto, RawItem,
};
use crate::error::DecodeError;
use crate::types::{Category, ContentCategory, MediaItem, MediaPage, MediaVariant};

fn normalized_category(kind: Option<&str>) -> ContentCategory {
    match kind {
        Some("sticker") => ContentCategory::Sticker,
        Some("meme" | "static-meme" | "static-memes") => ContentCategory::Meme,
        _ => ContentCategory::Gif,
    }
}

/// Preferred file format inside one size bucket, by lowercased item type.
fn pick_format<'a>(kind: Option<&str>, file: &'a FileTypesDto) -> Option<&'a FileMetaDto> {
    let FileTypesDto { gif, webp, png, jpg, .. } = file;
    match kind {
        Some("meme" | "static-meme" | "static-memes") => png.as_ref().or(jpg.as_ref()).or(webp.as_ref()).or(gif.as_ref()),
        Some("sticker") => gif.as_ref().or(png.as_ref()).or(jpg.as_ref()).or(webp.as_ref()),
        Some("gif") => gif.as_ref().or(webp.as_ref()),
        _ => gif.as_ref().or(webp.as_ref()).or(png.as_ref()).or(jpg.as_ref()),
    }
}

fn variant_from(shape: &'static str, meta: &FileMetaDto) -> Result<MediaVariant, DecodeError> {
    Ok(MediaVariant {
        url: meta.url.clone().ok_or(DecodeError::missing(shape, "url"))?,
        width: meta.width.ok_or(DecodeError::missing(shape, "width"))?,
        height: meta.height.ok_or(DecodeError::missing(shape, "height"))?,
    })
}

/// Standard alphabet; padding optional.
const PLACEHOLDER_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 blur preview, with or without a `data:` URI prefix.
/// Line breaks and missing padding are tolerated.
pub fn decode_placeholder(encoded: &str) -> Option<Vec<u8>> {
    let payload = match encoded.find(',') {
        Some(idx) => &encoded[idx + 1..],
        None => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    PLACEHOLDER_ENGINE.decode(compact).ok()
}

fn map_general(dto: GeneralItemDto) -> Result<MediaItem, DecodeError> {
    const SHAPE: &str = "general";
    let kind = dto.kind.as_deref().map(str::to_ascii_lowercase);
    let kind = kind.as_deref();

    let (low_bucket, high_bucket) = match &dto.file {
        Some(dims) => (
            dims.md.as_ref().or(dims.hd.as_ref()).or(dims.xs.as_ref()),
            dims.hd.as_ref().or(dims.md.as_ref()).or(dims.sm.as_ref()),
        ),
        None => (None, None),
    };

    let low = low_bucket
        .and_then(|b| pick_format(kind, b))
        .map(|m| variant_from(SHAPE, m))
        .transpose()?;
    let high = high_bucket
        .and_then(|b| pick_format(kind, b))
        .map(|m| variant_from(SHAPE, m))
        .transpose()?;

    Ok(MediaItem {
        id: dto.slug.ok_or(DecodeError::missing(SHAPE, "slug"))?,
        title: dto.title,
        placeholder_image: dto.blur_preview.as_deref().and_then(decode_placeholder),
        low_quality_variant: low,
        high_quality_variant: high,
        category: normalized_category(kind),
    })
}

fn clip_variant(
    url: Option<String>,
    dims: Option<&FileMetaDto>,
    field: &'static str,
) -> Result<Option<MediaVariant>, DecodeError> {
    let Some(url) = url else { return Ok(None) };
    let dims = dims.ok_or(DecodeError::missing("clip", field))?;
    Ok(Some(MediaVariant {
        url,
        width: dims.width.ok_or(DecodeError::missing("clip", "width"))?,
        height: dims.height.ok_or(DecodeError::missing("clip", "height"))?,
    }))
}

fn map_clip(dto: ClipItemDto) -> Result<MediaItem, DecodeError> {
    const SHAPE: &str = "clip";
    let file = dto.file.unwrap_or_default();
    let meta = dto.file_meta.unwrap_or_default();

    let selector = clip_variant(file.gif, meta.gif.as_ref(), "file_meta.gif")?;
    let playback = clip_variant(file.mp4, meta.mp4.as_ref(), "file_meta.mp4")?;

    Ok(MediaItem {
        id: dto.slug.ok_or(DecodeError::missing(SHAPE, "slug"))?,
        title: dto.title,
        placeholder_image: dto.blur_preview.as_deref().and_then(decode_placeholder),
        low_quality_variant: selector,
        high_quality_variant: playback,
        category: ContentCategory::Clip,
    })
}

fn map_ad(dto: AdItemDto) -> Result<MediaItem, DecodeError> {
    const SHAPE: &str = "ad";
    let creative = MediaVariant {
        url: dto.content.ok_or(DecodeError::missing(SHAPE, "content"))?,
        width: dto.width.ok_or(DecodeError::missing(SHAPE, "width"))?,
        height: dto.height.ok_or(DecodeError::missing(SHAPE, "height"))?,
    };
    // Ads have no stable slug.
    Ok(MediaItem {
        id: format!("ad-{}", uuid::Uuid::new_v4()),
        title: None,
        placeholder_image: None,
        low_quality_variant: Some(creative),
        high_quality_variant: None,
        category: ContentCategory::Ad,
    })
}

pub fn media_item_from(raw: RawItem) -> Result<MediaItem, DecodeError> {
    match raw {
        RawItem::General(dto) => map_general(dto),
        RawItem::Clip(dto) => map_clip(dto),
        RawItem::Ad(dto) => map_ad(dto),
    }
}

/// Assemble a page, dropping items that fail to decode.
pub fn media_page_from(response: MediaItemResponseDto) -> (MediaPage, Option<bool>) {
    let DataDto { data, has_next, meta } = response.data.unwrap_or_default();
    let meta = meta.unwrap_or_default();

    let items = data
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, raw)| match RawItem::decode(raw).and_then(media_item_from) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index = idx, error = %e, "dropping malformed media item");
                None
            }
        })
        .collect();

    let page = MediaPage {
        items,
        item_min_width: meta.item_min_width.unwrap_or(0),
        ad_max_resize_percent: meta.ad_max_resize_percent.unwrap_or(0) as f32 / 100.0,
    };
    (page, has_next)
}

pub fn categories_from(response: CategoriesResponseDto) -> Vec<Category> {
    match response.data {
        None => Vec::new(),
        Some(CategoriesDataDto::Names(names)) => names
            .into_iter()
            .map(|name| Category { query: name.clone(), title: name, preview_url: None })
            .collect(),
        Some(CategoriesDataDto::Entries(entries)) | Some(CategoriesDataDto::Wrapped { categories: entries }) => entries
            .into_iter()
            .map(|c| Category {
                query: c.query.unwrap_or_else(|| c.category.clone()),
                title: c.category,
                preview_url: c.preview_url,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{ClipFileDto, DimensionsDto};
    use serde_json::json;

    fn meta(url: &str, width: u32, height: u32) -> Option<FileMetaDto> {
        Some(FileMetaDto { url: Some(url.into()), width: Some(width), height: Some(height), size: None })
    }

    #[test]
    fn general_gif_uses_md_for_low_and_hd_for_high() {
        let dto = GeneralItemDto {
            slug: Some("funny-cat".into()),
            title: Some("Funny cat".into()),
            file: Some(DimensionsDto {
                hd: Some(FileTypesDto { gif: meta("https://cdn.example.com/gif/hd.gif", 400, 300), ..Default::default() }),
                md: Some(FileTypesDto { gif: meta("https://cdn.example.com/gif/md.gif", 200, 150), ..Default::default() }),
                ..Default::default()
            }),
            kind: Some("gif".into()),
            ..Default::default()
        };

        let item = media_item_from(RawItem::General(dto)).unwrap();
        assert_eq!(item.id, "funny-cat");
        assert_eq!(item.category, ContentCategory::Gif);
        assert_eq!(item.low_quality_variant.unwrap().url, "https://cdn.example.com/gif/md.gif");
        let high = item.high_quality_variant.unwrap();
        assert_eq!((high.url.as_str(), high.width, high.height), ("https://cdn.example.com/gif/hd.gif", 400, 300));
    }

    #[test]
    fn hd_only_item_fills_both_variants() {
        let dto = GeneralItemDto {
            slug: Some("party-hat".into()),
            file: Some(DimensionsDto {
                hd: Some(FileTypesDto { gif: meta("https://cdn.example.com/sticker/hd.gif", 512, 512), ..Default::default() }),
                ..Default::default()
            }),
            kind: Some("Sticker".into()),
            ..Default::default()
        };

        let item = media_item_from(RawItem::General(dto)).unwrap();
        assert_eq!(item.category, ContentCategory::Sticker);
        assert_eq!(item.low_quality_variant, item.high_quality_variant);
        assert_eq!(item.low_quality_variant.unwrap().url, "https://cdn.example.com/sticker/hd.gif");
    }

    #[test]
    fn format_preference_depends_on_type() {
        let bucket = FileTypesDto {
            gif: meta("a.gif", 1, 1),
            webp: meta("a.webp", 1, 1),
            png: meta("a.png", 1, 1),
            jpg: meta("a.jpg", 1, 1),
            mp4: None,
        };
        let url = |kind: Option<&str>| pick_format(kind, &bucket).and_then(|m| m.url.clone()).unwrap();
        assert_eq!(url(Some("static-memes")), "a.png");
        assert_eq!(url(Some("sticker")), "a.gif");
        assert_eq!(url(Some("gif")), "a.gif");
        assert_eq!(url(None), "a.gif");

        let stills = FileTypesDto { png: meta("b.png", 1, 1), jpg: meta("b.jpg", 1, 1), ..Default::default() };
        assert!(pick_format(Some("gif"), &stills).is_none());
        assert_eq!(pick_format(None, &stills).and_then(|m| m.url.clone()).unwrap(), "b.png");
        assert_eq!(pick_format(Some("meme"), &stills).and_then(|m| m.url.clone()).unwrap(), "b.png");
    }

    #[test]
    fn unknown_type_maps_to_gif() {
        let dto = GeneralItemDto { slug: Some("x".into()), kind: Some("sparkle".into()), ..Default::default() };
        let item = media_item_from(RawItem::General(dto)).unwrap();
        assert_eq!(item.category, ContentCategory::Gif);
        assert!(item.low_quality_variant.is_none());
    }

    #[test]
    fn clip_pairs_urls_with_dimensions() {
        let dto = ClipItemDto {
            slug: Some("awesome-clip".into()),
            title: Some("Awesome clip".into()),
            file_meta: Some(FileTypesDto {
                gif: meta("https://cdn.example.com/clip/selector.gif", 200, 150),
                mp4: meta("https://cdn.example.com/clip/preview.mp4", 400, 300),
                ..Default::default()
            }),
            file: Some(ClipFileDto {
                gif: Some("https://cdn.example.com/clip/selector.gif".into()),
                mp4: Some("https://cdn.example.com/clip/preview.mp4".into()),
                webp: None,
            }),
            ..Default::default()
        };

        let item = media_item_from(RawItem::Clip(dto)).unwrap();
        assert_eq!(item.category, ContentCategory::Clip);
        let low = item.low_quality_variant.unwrap();
        assert_eq!((low.url.as_str(), low.width, low.height), ("https://cdn.example.com/clip/selector.gif", 200, 150));
        let high = item.high_quality_variant.unwrap();
        assert_eq!((high.url.as_str(), high.width, high.height), ("https://cdn.example.com/clip/preview.mp4", 400, 300));
    }

    #[test]
    fn clip_without_matching_dimensions_is_decode_error() {
        let dto = ClipItemDto {
            slug: Some("broken".into()),
            file: Some(ClipFileDto { gif: Some("g.gif".into()), ..Default::default() }),
            ..Default::default()
        };
        let err = media_item_from(RawItem::Clip(dto)).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { shape: "clip", field: "file_meta.gif" }));
    }

    #[test]
    fn ad_only_fills_low_variant_with_synthesized_id() {
        let dto = AdItemDto { width: Some(320), height: Some(50), content: Some("<div>ad</div>".into()) };
        let item = media_item_from(RawItem::Ad(dto)).unwrap();
        assert!(item.is_ad());
        assert!(item.id.starts_with("ad-"));
        assert!(item.high_quality_variant.is_none());
        assert_eq!(item.low_quality_variant.unwrap().width, 320);
    }

    #[test]
    fn ad_missing_content_is_decode_error() {
        let err = media_item_from(RawItem::Ad(AdItemDto { width: Some(1), height: Some(1), content: None })).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { shape: "ad", field: "content" }));
    }

    #[test]
    fn page_drops_malformed_items_and_scales_resize_percent() {
        let response: MediaItemResponseDto = serde_json::from_value(json!({
            "result": true,
            "data": {
                "data": [
                    {"type": "gif", "slug": "ok", "file": {"md": {"gif": {"url": "u", "width": 1, "height": 1}}}},
                    {"type": "gif", "file": {"md": {"gif": {"url": "u", "width": 1, "height": 1}}}},
                    {"type": "ad", "content": "c", "width": 300, "height": 250}
                ],
                "has_next": true,
                "meta": {"item_min_width": 90, "ad_max_resize_percent": 25}
            }
        }))
        .unwrap();

        let (page, has_next) = media_page_from(response);
        assert_eq!(has_next, Some(true));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "ok");
        assert!(page.items[1].is_ad());
        assert_eq!(page.item_min_width, 90);
        assert!((page.ad_max_resize_percent - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn absent_data_is_empty_page() {
        let (page, has_next) = media_page_from(MediaItemResponseDto::default());
        assert!(page.is_empty());
        assert_eq!(has_next, None);
    }

    #[test]
    fn placeholder_accepts_data_uri() {
        assert_eq!(decode_placeholder("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert_eq!(decode_placeholder("aGk=").unwrap(), b"hi");
        assert!(decode_placeholder("not base64!").is_none());
    }

    #[test]
    fn placeholder_tolerates_line_breaks_and_missing_padding() {
        assert_eq!(decode_placeholder("aGVs\nbG8g\r\nd29y\nbGQ=").unwrap(), b"hello world");
        assert_eq!(decode_placeholder("aGk").unwrap(), b"hi");
        assert_eq!(decode_placeholder("data:image/png;base64, aGVsbG8\n").unwrap(), b"hello");
    }

    #[test]
    fn string_categories_use_name_as_query() {
        let response: CategoriesResponseDto =
            serde_json::from_value(json!({"result": true, "data": ["love"]})).unwrap();
        let categories = categories_from(response);
        assert_eq!(categories, vec![Category { title: "love".into(), query: "love".into(), preview_url: None }]);
    }
}
