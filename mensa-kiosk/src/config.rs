use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::carousel::{self, CarouselTuning};

/// Environment variable overriding the on-disk payment client secret
pub const CLIENT_SECRET_ENV: &str = "MENSA_PAYMENT_CLIENT_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    pub server_url: String,
    pub payment: PaymentConfig,
    pub carousel: CarouselConfig,
}

/// Payment identity endpoint and client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub token_url: String,
    pub client_id: String,
    /// Prefer the `MENSA_PAYMENT_CLIENT_SECRET` environment variable over
    /// storing the secret here.
    pub client_secret: String,
}

/// Carousel tuning knobs, persisted as plain numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    pub auto_advance_millis: u64,
    pub release_threshold_px: f32,
    pub drag_limit_fraction: f32,
    pub drag_damping: f32,
    pub transition_millis: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            payment: PaymentConfig::default(),
            carousel: CarouselConfig::default(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            token_url: "https://identity.example.com/v1/oauth/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            auto_advance_millis: carousel::AUTO_ADVANCE_PERIOD.as_millis() as u64,
            release_threshold_px: carousel::RELEASE_THRESHOLD_PX,
            drag_limit_fraction: carousel::DRAG_LIMIT_FRACTION,
            drag_damping: carousel::DRAG_DAMPING,
            transition_millis: carousel::TRANSITION_DURATION.as_millis() as u64,
        }
    }
}

impl CarouselConfig {
    pub fn tuning(&self) -> CarouselTuning {
        CarouselTuning {
            auto_advance_period: Duration::from_millis(self.auto_advance_millis),
            release_threshold_px: self.release_threshold_px,
            drag_limit_fraction: self.drag_limit_fraction,
            drag_damping: self.drag_damping,
            transition_duration: Duration::from_millis(self.transition_millis),
        }
    }
}

impl KioskConfig {
    pub fn load() -> Self {
        let mut config = Self::load_from_disk().unwrap_or_default();
        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            config.payment.client_secret = secret;
        }
        config
    }

    fn load_from_disk() -> Option<Self> {
        let config_path = dirs::config_dir()?
            .join("mensa-kiosk")
            .join("config.json");
        if !config_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&config_path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("mensa-kiosk");
            std::fs::create_dir_all(&app_dir)?;
            let config_path = app_dir.join("config.json");
            let content = serde_json::to_string_pretty(self)?;
            std::fs::write(config_path, content)?;
        }
        Ok(())
    }
}
