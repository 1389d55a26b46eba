//! Image references and CDN URL construction.
//!
//! Asset refs look like `image-<assetId>-<width>x<height>-<format>`. Crop
//! and hotspot are stored as fractions of the source dimensions and are
//! baked into the URL so the CDN serves the editor's framing.

use serde::Deserialize;

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default, deserialize_with = "lenient")]
    pub reference: Option<String>,
    /// Present when the query dereferenced the asset.
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
}

/// An image field as stored on a document or section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageSource {
    #[serde(deserialize_with = "lenient")]
    pub asset: Option<AssetRef>,
    #[serde(deserialize_with = "lenient")]
    pub crop: Option<Crop>,
    #[serde(deserialize_with = "lenient")]
    pub hotspot: Option<Hotspot>,
    #[serde(deserialize_with = "lenient")]
    pub alt: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub caption: Option<String>,
}

/// Parsed `image-<id>-<w>x<h>-<fmt>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl ImageAsset {
    pub fn parse(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("image-")?;
        let (rest, format) = rest.rsplit_once('-')?;
        let (id, dims) = rest.rsplit_once('-')?;
        let (width, height) = dims.split_once('x')?;
        if id.is_empty() || format.is_empty() {
            return None;
        }
        Some(Self {
            id: id.to_string(),
            width: width.parse().ok()?,
            height: height.parse().ok()?,
            format: format.to_string(),
        })
    }
}

/// Display size requested for one rendering slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTarget {
    pub width: u32,
    pub height: Option<u32>,
}

impl ImageTarget {
    pub const HERO: ImageTarget = ImageTarget { width: 1920, height: Some(1080) };
    pub const MEDIA: ImageTarget = ImageTarget { width: 1200, height: None };
    pub const GALLERY: ImageTarget = ImageTarget { width: 800, height: Some(600) };
    pub const CARD: ImageTarget = ImageTarget { width: 600, height: Some(400) };
    pub const LEGACY: ImageTarget = ImageTarget { width: 1200, height: None };
    pub const THUMBNAIL: ImageTarget = ImageTarget { width: 400, height: Some(300) };
}

/// Where image files are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCdn {
    pub base_url: String,
    pub project_id: String,
    pub dataset: String,
}

impl ImageCdn {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            base_url: "https://cdn.sanity.io".to_string(),
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// Display URL for an image at a target size, or `None` when the image
    /// has no usable asset.
    pub fn url(&self, image: &ImageSource, target: ImageTarget) -> Option<String> {
        let asset = image.asset.as_ref()?;
        let Some(reference) = asset.reference.as_deref() else {
            return asset.url.clone();
        };
        let parsed = ImageAsset::parse(reference)?;

        let mut params = Vec::new();
        if let Some(crop) = image.crop.filter(|c| *c != Crop::default()) {
            let w = f64::from(parsed.width);
            let h = f64::from(parsed.height);
            let left = (crop.left * w).round();
            let top = (crop.top * h).round();
            let width = ((1.0 - crop.left - crop.right) * w).round();
            let height = ((1.0 - crop.top - crop.bottom) * h).round();
            params.push(format!("rect={left},{top},{width},{height}"));
        }
        params.push(format!("w={}", target.width));
        if let Some(height) = target.height {
            params.push(format!("h={height}"));
            params.push("fit=crop".to_string());
            if let Some(hotspot) = image.hotspot {
                params.push("crop=focalpoint".to_string());
                params.push(format!("fp-x={}", hotspot.x));
                params.push(format!("fp-y={}", hotspot.y));
            }
        } else {
            params.push("fit=max".to_string());
        }
        params.push("auto=format".to_string());

        Some(format!(
            "{}/images/{}/{}/{}-{}x{}.{}?{}",
            self.base_url,
            self.project_id,
            self.dataset,
            parsed.id,
            parsed.width,
            parsed.height,
            parsed.format,
            params.join("&")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cdn() -> ImageCdn {
        ImageCdn::new("proj", "production")
    }

    fn image(value: serde_json::Value) -> ImageSource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_asset_reference() {
        let asset = ImageAsset::parse("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg").unwrap();
        assert_eq!(asset.id, "Tb9Ew8CXIwaY6R1kjMvI0uRR");
        assert_eq!((asset.width, asset.height), (2000, 3000));
        assert_eq!(asset.format, "jpg");
    }

    #[test]
    fn rejects_malformed_reference() {
        assert!(ImageAsset::parse("file-abc-pdf").is_none());
        assert!(ImageAsset::parse("image-abc-wxh-jpg").is_none());
        assert!(ImageAsset::parse("image-abc").is_none());
    }

    #[test]
    fn url_without_crop_uses_max_fit() {
        let img = image(json!({"asset": {"_ref": "image-abc-1000x500-png"}}));
        assert_eq!(
            cdn().url(&img, ImageTarget::MEDIA).unwrap(),
            "https://cdn.sanity.io/images/proj/production/abc-1000x500.png?w=1200&fit=max&auto=format"
        );
    }

    #[test]
    fn url_bakes_in_crop_and_hotspot() {
        let img = image(json!({
            "asset": {"_ref": "image-abc-1000x500-jpg"},
            "crop": {"top": 0.1, "bottom": 0.1, "left": 0.2, "right": 0.0},
            "hotspot": {"x": 0.5, "y": 0.25, "width": 0.3, "height": 0.3}
        }));
        assert_eq!(
            cdn().url(&img, ImageTarget::HERO).unwrap(),
            "https://cdn.sanity.io/images/proj/production/abc-1000x500.jpg?rect=200,50,800,400&w=1920&h=1080&fit=crop&crop=focalpoint&fp-x=0.5&fp-y=0.25&auto=format"
        );
    }

    #[test]
    fn dereferenced_asset_url_passes_through() {
        let img = image(json!({"asset": {"url": "https://example.org/a.jpg"}}));
        assert_eq!(
            cdn().url(&img, ImageTarget::CARD).as_deref(),
            Some("https://example.org/a.jpg")
        );
    }

    #[test]
    fn missing_asset_gives_no_url() {
        assert!(cdn().url(&ImageSource::default(), ImageTarget::CARD).is_none());
        let broken = image(json!({"asset": 42}));
        assert!(cdn().url(&broken, ImageTarget::CARD).is_none());
    }
}
