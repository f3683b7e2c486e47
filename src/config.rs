use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub request_timeout_seconds: u32,
    /// 0 conserva las listas hasta que se invaliden explícitamente
    pub cache_ttl_seconds: u32,
    pub default_locale: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: "http://localhost:3000/api".to_string(),
            backend_url_production: "https://ims-sms.com/api".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            request_timeout_seconds: 30,
            cache_ttl_seconds: 0,
            default_locale: "en".to_string(),
        }
    }
}

impl AppConfig {
    /// Construir la configuración desde variables de entorno de compilación (ver `build.rs`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url_development: option_env!("IMS_BACKEND_URL_DEVELOPMENT")
                .map(str::to_string)
                .unwrap_or(defaults.backend_url_development),
            backend_url_production: option_env!("IMS_BACKEND_URL_PRODUCTION")
                .map(str::to_string)
                .unwrap_or(defaults.backend_url_production),
            environment: option_env!("IMS_ENVIRONMENT")
                .map(str::to_string)
                .unwrap_or(defaults.environment),
            enable_logging: option_env!("IMS_ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            request_timeout_seconds: option_env!("IMS_REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
            cache_ttl_seconds: option_env!("IMS_CACHE_TTL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_seconds),
            default_locale: option_env!("IMS_DEFAULT_LOCALE")
                .map(str::to_string)
                .unwrap_or(defaults.default_locale),
        }
    }

    /// URL base del backend según el entorno
    pub fn backend_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.backend_url_production,
            _ => &self.backend_url_development,
        }
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    /// Timeout por petición; un valor 0 se convierte en un segundo
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_seconds.max(1)))
    }

    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        match self.cache_ttl_seconds {
            0 => None,
            secs => Some(chrono::Duration::seconds(i64::from(secs))),
        }
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
