use crate::error::ModelError;
use uuid::Uuid;

/// Strongly typed ID for banners
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerID(pub Uuid);

impl Default for BannerID {
    fn default() -> Self {
        Self::new()
    }
}

impl BannerID {
    pub fn new() -> Self {
        BannerID(Uuid::now_v7())
    }

    pub fn from_string(id: &str) -> Result<Self, ModelError> {
        if id.is_empty() {
            return Err(ModelError::InvalidBanner(
                "banner ID cannot be empty".to_string(),
            ));
        }
        id.parse()
            .map(BannerID)
            .map_err(|e| ModelError::InvalidBanner(format!("banner ID: {e}")))
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for BannerID {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for BannerID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
