use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub doctor_directory_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            doctor_directory_url: env::var("DOCTOR_DIRECTORY_URL")
                .unwrap_or_else(|_| {
                    warn!("DOCTOR_DIRECTORY_URL not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Build a config pointing at a known directory URL, e.g. a mock server.
    pub fn with_directory_url(url: impl Into<String>) -> Self {
        Self {
            doctor_directory_url: url.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.doctor_directory_url.is_empty()
    }
}
