//! Section registry: the closed set of content blocks a page is built from.
//!
//! Sections arrive as a JSON array of `_type`-tagged objects. Each element
//! is decoded on its own and every field is decoded leniently, so a broken
//! field falls back to its default and a broken section never takes the
//! rest of the page with it. Tags outside the registry decode to
//! [`Section::Unknown`] and render nothing.

pub mod image;
pub mod render;
pub mod rich_text;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use image::{ImageCdn, ImageSource, ImageTarget};
pub use render::{compose, render_page, RenderContext, RenderedSection};

/// Decode a field, falling back to its default on any type mismatch.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a list item by item, dropping the items that do not fit.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundColor {
    #[default]
    White,
    LightGray,
    Primary,
    Dark,
}

impl BackgroundColor {
    pub fn as_class(self) -> &'static str {
        match self {
            BackgroundColor::White => "bg-white",
            BackgroundColor::LightGray => "bg-light-gray",
            BackgroundColor::Primary => "bg-primary",
            BackgroundColor::Dark => "bg-dark",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_class(self) -> &'static str {
        match self {
            Alignment::Left => "align-left",
            Alignment::Center => "align-center",
            Alignment::Right => "align-right",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DividerStyle {
    #[default]
    Line,
    Thick,
    Dotted,
    Decorative,
    SpaceSmall,
    SpaceLarge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GalleryLayout {
    #[default]
    Grid,
    Masonry,
    Carousel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Button {
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub link: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub style: ButtonStyle,
}

impl Button {
    /// A button renders only with both a label and a target.
    pub fn parts(&self) -> Option<(&str, &str)> {
        match (self.text.as_deref(), self.link.as_deref()) {
            (Some(text), Some(link)) if !text.is_empty() && !link.is_empty() => Some((text, link)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroSection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub background_image: Option<ImageSource>,
    #[serde(deserialize_with = "lenient")]
    pub button: Option<Button>,
    #[serde(deserialize_with = "lenient")]
    pub alignment: Alignment,
    #[serde(deserialize_with = "lenient")]
    pub overlay: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub content: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub alignment: Alignment,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaSection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub content: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
    #[serde(deserialize_with = "lenient")]
    pub image_position: ImagePosition,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
    #[serde(deserialize_with = "lenient")]
    pub button: Option<Button>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GallerySection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub images: Vec<ImageSource>,
    #[serde(deserialize_with = "lenient")]
    pub layout: GalleryLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteSection {
    #[serde(deserialize_with = "lenient")]
    pub quote: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaSection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub button: Option<Button>,
    #[serde(deserialize_with = "lenient")]
    pub secondary_button: Option<Button>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimelineEvent {
    #[serde(deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineSection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub events: Vec<TimelineEvent>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Card {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
    #[serde(deserialize_with = "lenient")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardsSection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub cards: Vec<Card>,
    #[serde(deserialize_with = "lenient")]
    pub columns: Option<u8>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
}

impl CardsSection {
    pub const DEFAULT_COLUMNS: u8 = 3;

    pub fn column_count(&self) -> u8 {
        self.columns.unwrap_or(Self::DEFAULT_COLUMNS).clamp(1, 4)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DividerSection {
    #[serde(deserialize_with = "lenient")]
    pub style: DividerStyle,
}

/// The older single-block page shape, still present on old pages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacySection {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub content: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
    /// `imageLeft`, `imageRight` or `textOnly`.
    #[serde(deserialize_with = "lenient")]
    pub layout: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: BackgroundColor,
}

impl LegacySection {
    /// Normalise into the current media shape.
    pub fn to_media(&self) -> MediaSection {
        let text_only = self.layout.as_deref() == Some("textOnly");
        MediaSection {
            title: self.title.clone(),
            content: self.content.clone(),
            image: if text_only { None } else { self.image.clone() },
            image_position: match self.layout.as_deref() {
                Some("imageRight") => ImagePosition::Right,
                _ => ImagePosition::Left,
            },
            background_color: self.background_color,
            button: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "_type")]
pub enum Section {
    #[serde(rename = "heroSection")]
    Hero(HeroSection),
    #[serde(rename = "textSection")]
    Text(TextSection),
    #[serde(rename = "mediaSection")]
    Media(MediaSection),
    #[serde(rename = "gallerySection")]
    Gallery(GallerySection),
    #[serde(rename = "quoteSection")]
    Quote(QuoteSection),
    #[serde(rename = "ctaSection")]
    Cta(CtaSection),
    #[serde(rename = "timelineSection")]
    Timeline(TimelineSection),
    #[serde(rename = "cardsSection")]
    Cards(CardsSection),
    #[serde(rename = "divider")]
    Divider(DividerSection),
    #[serde(rename = "section")]
    Legacy(LegacySection),
    #[serde(other)]
    Unknown,
}

impl Section {
    pub fn kind(&self) -> &'static str {
        match self {
            Section::Hero(_) => "hero",
            Section::Text(_) => "text",
            Section::Media(_) => "media",
            Section::Gallery(_) => "gallery",
            Section::Quote(_) => "quote",
            Section::Cta(_) => "cta",
            Section::Timeline(_) => "timeline",
            Section::Cards(_) => "cards",
            Section::Divider(_) => "divider",
            Section::Legacy(_) => "legacy",
            Section::Unknown => "unknown",
        }
    }
}

/// A section together with its stable identity within the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBlock {
    pub key: Option<String>,
    pub section: Section,
}

/// Decode a page's `sections` array. Elements that are not tagged objects
/// are dropped with a warning; unknown tags are kept as `Unknown`.
pub fn parse_sections(raw: &Value) -> Vec<SectionBlock> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let key = item.get("_key").and_then(Value::as_str).map(str::to_string);
            match serde_json::from_value::<Section>(item.clone()) {
                Ok(section) => Some(SectionBlock { key, section }),
                Err(err) => {
                    tracing::warn!(key = ?key, error = %err, "skipping undecodable section");
                    None
                }
            }
        })
        .collect()
}
