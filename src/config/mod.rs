use serde::Deserialize;
use std::time::Duration;

use crate::services::location::DEFAULT_LOCATION_TIMEOUT;
use crate::services::submission::DEFAULT_ACK_DELAY;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Base URL of the report API (e.g., "https://api.example.com/api")
    pub api_url: String,

    /// Bearer token issued by the auth service
    pub auth_token: String,

    /// Pause after a verified-waste classification, in milliseconds
    #[serde(default = "default_ack_delay_ms")]
    pub ack_delay_ms: u64,

    /// Client-side limit on a position fix, in seconds
    #[serde(default = "default_location_timeout_secs")]
    pub location_timeout_secs: u64,

    /// Overall timeout for each HTTP request, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Nominatim server used for reverse geocoding
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
}

fn default_ack_delay_ms() -> u64 {
    DEFAULT_ACK_DELAY.as_millis() as u64
}

fn default_location_timeout_secs() -> u64 {
    DEFAULT_LOCATION_TIMEOUT.as_secs()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
