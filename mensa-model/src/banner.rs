use crate::error::ModelError;
use crate::ids::BannerID;
use crate::media_type::{ImageMediaType, VideoMediaType};
use std::fmt;

/// Wire discriminator for a banner's media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BannerKind {
    /// Still image slide
    Image,
    /// Video slide
    Video,
}

impl fmt::Display for BannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BannerKind::Image => write!(f, "image"),
            BannerKind::Video => write!(f, "video"),
        }
    }
}

/// Validated media type of a banner file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerMediaType {
    Image(ImageMediaType),
    Video(VideoMediaType),
}

impl BannerMediaType {
    /// Parse a mime string against the declared banner kind.
    pub fn from_parts(kind: BannerKind, mime: &str) -> Result<Self, ModelError> {
        match kind {
            BannerKind::Image => {
                ImageMediaType::from_mime(mime).map(BannerMediaType::Image)
            }
            BannerKind::Video => {
                VideoMediaType::from_mime(mime).map(BannerMediaType::Video)
            }
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            BannerMediaType::Image(image) => image.mime(),
            BannerMediaType::Video(video) => video.mime(),
        }
    }

    pub fn kind(&self) -> BannerKind {
        match self {
            BannerMediaType::Image(_) => BannerKind::Image,
            BannerMediaType::Video(_) => BannerKind::Video,
        }
    }
}

/// A single carousel slide descriptor as served by the banner endpoint
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Banner {
    pub id: BannerID,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: BannerKind,
    /// Server-side file reference, resolved against the media endpoint
    pub file: String,
    pub mime_type: String,
    pub display_order: u32,
}

impl Banner {
    /// Construct a banner, rejecting empty file references and mime strings
    /// that do not match the declared kind.
    pub fn new(
        id: BannerID,
        kind: BannerKind,
        file: impl Into<String>,
        mime_type: impl Into<String>,
        display_order: u32,
    ) -> Result<Self, ModelError> {
        let file = file.into();
        if file.is_empty() {
            return Err(ModelError::InvalidBanner(
                "file reference cannot be empty".to_string(),
            ));
        }
        let mime_type = mime_type.into();
        BannerMediaType::from_parts(kind, &mime_type)?;

        Ok(Self {
            id,
            kind,
            file,
            mime_type,
            display_order,
        })
    }

    /// Validated media type; fails when the mime string is unknown or
    /// contradicts the banner kind.
    pub fn media_type(&self) -> Result<BannerMediaType, ModelError> {
        BannerMediaType::from_parts(self.kind, &self.mime_type)
    }

    pub fn is_video(&self) -> bool {
        self.kind == BannerKind::Video
    }
}

/// Sort a banner list into display order. Stable, so equal keys keep their
/// server ordering.
pub fn ordered(mut banners: Vec<Banner>) -> Vec<Banner> {
    banners.sort_by_key(|banner| banner.display_order);
    banners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(order: u32, file: &str) -> Banner {
        Banner::new(
            BannerID::new(),
            BannerKind::Image,
            file,
            "image/png",
            order,
        )
        .unwrap()
    }

    #[test]
    fn test_ordered_sorts_by_display_order() {
        let banners = vec![banner(2, "c.png"), banner(0, "a.png"), banner(1, "b.png")];
        let sorted = ordered(banners);
        let files: Vec<_> = sorted.iter().map(|b| b.file.as_str()).collect();
        assert_eq!(files, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_mime_must_match_kind() {
        let result = Banner::new(
            BannerID::new(),
            BannerKind::Video,
            "promo.png",
            "image/png",
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_mime_rejected() {
        let result = Banner::new(
            BannerID::new(),
            BannerKind::Image,
            "promo.tiff",
            "image/tiff",
            0,
        );
        assert!(matches!(result, Err(ModelError::UnknownMediaType(_))));
    }
}
