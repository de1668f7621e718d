use std::time::Duration;

use anyhow::Context;

#[derive(Debug)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let base_url = std::env::var("SABNZBD_BASE_URL").unwrap_or_default();
        let api_key = std::env::var("SABNZBD_API_KEY").unwrap_or_default();
        let timeout_secs = match std::env::var("SABNZBD_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid SABNZBD_TIMEOUT_SECS: {}", raw))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Config {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("SABNZBD_BASE_URL is missing".into());
        }
        if self.api_key.is_empty() {
            return Err("SABNZBD_API_KEY is missing".into());
        }
        Ok(())
    }
}
