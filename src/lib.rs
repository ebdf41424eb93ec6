//! spacetraveling: a statically generated blog backed by a Prismic repository
//!
//! Page loaders fetch posts through a [`prismic::ContentService`], the
//! generator renders them with the embedded Tera theme, and the server
//! re-renders pages once their revalidation window has elapsed.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod pages;
pub mod prismic;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prismic::{ContentService, PrismicClient};

/// The site being built or served
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Load a site from a directory (`_config.yml` plus `PRISMIC_*` overrides)
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Validate the configuration and connect to the content repository
    pub fn content_service(&self) -> Result<Arc<dyn ContentService>> {
        self.config.validate()?;
        let client = PrismicClient::new(&self.config.prismic)?;
        tracing::debug!("Using content repository {}", client.endpoint());
        Ok(Arc::new(client))
    }

    /// Generate the static site
    pub async fn generate(
        &self,
        service: &dyn ContentService,
        force: bool,
    ) -> Result<generator::GenerateReport> {
        commands::generate::run(self, service, force).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
