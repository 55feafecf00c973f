use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::ModelError;

/// Simple enum for banner image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageMediaType {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// WebP image
    Webp,
    /// GIF image
    Gif,
}

impl ImageMediaType {
    pub fn from_mime(mime: &str) -> Result<Self, ModelError> {
        match mime {
            "image/jpeg" | "image/jpg" => Ok(ImageMediaType::Jpeg),
            "image/png" => Ok(ImageMediaType::Png),
            "image/webp" => Ok(ImageMediaType::Webp),
            "image/gif" => Ok(ImageMediaType::Gif),
            other => Err(ModelError::UnknownMediaType(other.to_string())),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Webp => "image/webp",
            ImageMediaType::Gif => "image/gif",
        }
    }
}

impl Display for ImageMediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime())
    }
}

/// Simple enum for banner video formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VideoMediaType {
    /// MP4 video
    Mp4,
    /// WebM video
    Webm,
    /// Ogg video
    Ogg,
}

impl VideoMediaType {
    pub fn from_mime(mime: &str) -> Result<Self, ModelError> {
        match mime {
            "video/mp4" => Ok(VideoMediaType::Mp4),
            "video/webm" => Ok(VideoMediaType::Webm),
            "video/ogg" => Ok(VideoMediaType::Ogg),
            other => Err(ModelError::UnknownMediaType(other.to_string())),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            VideoMediaType::Mp4 => "video/mp4",
            VideoMediaType::Webm => "video/webm",
            VideoMediaType::Ogg => "video/ogg",
        }
    }
}

impl Display for VideoMediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime())
    }
}
