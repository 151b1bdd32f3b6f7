//! Wire shapes of the catalog API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesResponseDto {
    #[serde(default)]
    pub result: Option<bool>,
    #[serde(default)]
    pub data: Option<CategoriesDataDto>,
}

/// Older servers send bare strings, newer ones objects, some wrap them in `categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoriesDataDto {
    Names(Vec<String>),
    Entries(Vec<CategoryDto>),
    Wrapped { categories: Vec<CategoryDto> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDto {
    #[serde(alias = "title")]
    pub category: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaItemResponseDto {
    #[serde(default)]
    pub result: Option<bool>,
    #[serde(default)]
    pub data: Option<DataDto>,
}

/// Items stay untyped here so one malformed entry cannot fail the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataDto {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub has_next: Option<bool>,
    #[serde(default)]
    pub meta: Option<MetaDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaDto {
    #[serde(default)]
    pub item_min_width: Option<u32>,
    #[serde(default)]
    pub ad_max_resize_percent: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileMetaDto {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileTypesDto {
    #[serde(default)]
    pub gif: Option<FileMetaDto>,
    #[serde(default)]
    pub webp: Option<FileMetaDto>,
    #[serde(default)]
    pub png: Option<FileMetaDto>,
    #[serde(default)]
    pub jpg: Option<FileMetaDto>,
    #[serde(default)]
    pub mp4: Option<FileMetaDto>,
}

/// Size buckets of a general item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DimensionsDto {
    #[serde(default)]
    pub hd: Option<FileTypesDto>,
    #[serde(default)]
    pub md: Option<FileTypesDto>,
    #[serde(default)]
    pub sm: Option<FileTypesDto>,
    #[serde(default)]
    pub xs: Option<FileTypesDto>,
}

/// Flat url map of a clip; dimensions live in `file_meta` under the same keys.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClipFileDto {
    #[serde(default)]
    pub gif: Option<String>,
    #[serde(default)]
    pub mp4: Option<String>,
    #[serde(default)]
    pub webp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneralItemDto {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub blur_preview: Option<String>,
    #[serde(default)]
    pub file: Option<DimensionsDto>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClipItemDto {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub blur_preview: Option<String>,
    #[serde(default)]
    pub file_meta: Option<FileTypesDto>,
    #[serde(default)]
    pub file: Option<ClipFileDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdItemDto {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A raw item, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    General(GeneralItemDto),
    Clip(ClipItemDto),
    Ad(AdItemDto),
}

impl RawItem {
    /// `"clip"` and `"ad"` select their shapes; any other tag, or none, is a general item.
    pub fn decode(raw: Value) -> Result<Self, DecodeError> {
        let tag = raw.get("type").and_then(Value::as_str).map(str::to_owned);
        let item = match tag.as_deref() {
            Some("clip") => RawItem::Clip(serde_json::from_value(raw)?),
            Some("ad") => RawItem::Ad(serde_json::from_value(raw)?),
            _ => RawItem::General(serde_json::from_value(raw)?),
        };
        Ok(item)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerViewRequestDto<'a> {
    pub customer_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRequestDto<'a> {
    pub customer_id: &'a str,
    pub reason: &'a str,
}
