//! Site configuration (_config.yml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `prismic.api_endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `prismic.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,

    // Date format (date-fns tokens)
    pub date_format: String,

    // Regeneration window in seconds
    pub revalidate: u64,

    // Reading speed used by the reading-time estimate
    pub words_per_minute: usize,

    // Content repository
    #[serde(default)]
    pub prismic: PrismicConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            url: "http://localhost:3000".to_string(),

            public_dir: "public".to_string(),

            date_format: "dd MMM yyyy".to_string(),

            revalidate: 60 * 60,

            words_per_minute: 200,

            prismic: PrismicConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_ENDPOINT).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using {} from environment", ENV_API_ENDPOINT);
            self.prismic.api_endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            tracing::debug!("Using {} from environment", ENV_ACCESS_TOKEN);
            self.prismic.access_token = Some(token);
        }
    }

    /// Check the values the loaders and renderers depend on
    pub fn validate(&self) -> Result<()> {
        if self.prismic.api_endpoint.trim().is_empty() {
            bail!(
                "prismic.api_endpoint must be set (or provide {})",
                ENV_API_ENDPOINT
            );
        }
        if self.prismic.document_type.trim().is_empty() {
            bail!("prismic.document_type must be non-empty");
        }
        if self.prismic.page_size == 0 {
            bail!("prismic.page_size must be > 0");
        }
        if self.words_per_minute == 0 {
            bail!("words_per_minute must be > 0");
        }
        self.tz()?;
        crate::helpers::parse_locale(&self.language)?;
        Ok(())
    }

    /// Timezone used when formatting publication dates
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => Ok(tz),
            Err(_) => bail!("unknown timezone: {}", self.timezone),
        }
    }

    /// Revalidation window as a duration
    pub fn revalidate_window(&self) -> Duration {
        Duration::from_secs(self.revalidate)
    }
}

/// Prismic repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// Repository API endpoint, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub api_endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: usize,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            access_token: None,
            document_type: "post".to_string(),
            page_size: 20,
        }
    }
}
