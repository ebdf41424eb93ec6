//! Generator module - renders page props with the built-in templates and
//! writes the static site

use anyhow::{bail, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tera::Context;

use crate::cache::{unix_now, Manifest, RouteEntry};
use crate::content::PostPagination;
use crate::helpers::{full_url_for, post_path};
use crate::pages::home::{self, HomeProps};
use crate::pages::post::{self, PostProps};
use crate::pages::StaticProps;
use crate::prismic::ContentService;
use crate::templates::{
    CardPage, DateFormatter, PostCard, PostData, SiteData, TemplateRenderer, ASSETS,
};
use crate::Site;

/// Route of the listing page
pub const HOME_ROUTE: &str = "/";

/// What a `generate` run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
    pub removed: Vec<String>,
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    dates: DateFormatter,
    site_data: SiteData,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new()?,
            dates: DateFormatter::from_config(&site.config)?,
            site_data: SiteData::from_config(&site.config),
        })
    }

    /// Create a base context with common variables
    fn create_base_context(&self, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data);
        context.insert("current_path", current_path);
        context.insert("canonical_url", &full_url_for(&self.site.config, current_path));
        context
    }

    /// Listing cards for a page of summaries
    pub fn cards(&self, pagination: &PostPagination) -> CardPage {
        CardPage {
            next_page: pagination.next_page.clone(),
            results: pagination
                .results
                .iter()
                .map(|summary| PostCard::new(summary, &self.dates))
                .collect(),
        }
    }

    /// Render the listing page
    pub fn render_home(&self, props: &HomeProps) -> Result<String> {
        let cards = self.cards(&props.post_pagination);

        let mut context = self.create_base_context(HOME_ROUTE);
        context.insert("posts", &cards.results);
        context.insert("next_page", &cards.next_page);

        self.renderer.render("index.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, props: &PostProps) -> Result<String> {
        let post = PostData::new(&props.post, &self.dates, self.site.config.words_per_minute);

        let mut context = self.create_base_context(&post.path);
        context.insert("post", &post);

        self.renderer.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self) -> Result<String> {
        let context = self.create_base_context("/404");
        self.renderer.render("404.html", &context)
    }

    /// Generate the site into the public directory.
    ///
    /// Routes written less than their revalidation window ago are skipped
    /// unless `force` is set.
    pub async fn generate(
        &self,
        service: &dyn ContentService,
        force: bool,
    ) -> Result<GenerateReport> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)?;

        let mut manifest = Manifest::load(&self.site.base_dir);
        let mut report = GenerateReport::default();
        let now = unix_now();

        self.copy_assets()?;
        fs::write(public_dir.join("404.html"), self.render_not_found()?)?;

        let window = Some(self.site.config.revalidate_window());
        let is_fresh = |manifest: &Manifest, route: &str| {
            !force && manifest.is_fresh(route, now, public_dir, window)
        };

        // Listing
        if is_fresh(&manifest, HOME_ROUTE) {
            report.skipped.push(HOME_ROUTE.to_string());
        } else if let StaticProps::Props { props, revalidate } =
            home::get_static_props(service, &self.site.config).await?
        {
            let html = self.render_home(&props)?;
            let entry = self.write_route(HOME_ROUTE, &html, revalidate, now)?;
            manifest.record(HOME_ROUTE, entry);
            report.generated.push(HOME_ROUTE.to_string());
        }

        // Posts
        let slugs = post::get_static_paths(service, &self.site.config).await?;
        tracing::info!("Found {} posts to pre-render", slugs.len());

        let mut keep = vec![HOME_ROUTE.to_string()];
        for slug in &slugs {
            let route = post_path(slug);
            if is_fresh(&manifest, &route) {
                report.skipped.push(route.clone());
                keep.push(route);
                continue;
            }

            match post::get_static_props(service, &self.site.config, slug).await? {
                StaticProps::Props { props, revalidate } => {
                    let html = self.render_post(&props)?;
                    let entry = self.write_route(&route, &html, revalidate, now)?;
                    manifest.record(&route, entry);
                    report.generated.push(route.clone());
                    keep.push(route);
                }
                StaticProps::NotFound => {
                    // Listed but gone by the time it was fetched
                    tracing::warn!("Post {} disappeared during generation", slug);
                }
            }
        }

        // Drop outputs of posts that no longer exist
        let stale: Vec<(String, String)> = manifest
            .routes
            .iter()
            .filter(|(route, _)| !keep.contains(route))
            .map(|(route, entry)| (route.clone(), entry.output_path.clone()))
            .collect();
        for (route, output_path) in stale {
            let path = public_dir.join(&output_path);
            if path.exists() {
                fs::remove_file(&path)?;
                if let Some(parent) = path.parent() {
                    // Only succeeds once the directory is empty
                    let _ = fs::remove_dir(parent);
                }
            }
            tracing::info!("Removed stale route {}", route);
            report.removed.push(route);
        }
        manifest.retain_routes(&keep);
        manifest.save(&self.site.base_dir)?;

        Ok(report)
    }

    /// Write a rendered route and describe it for the manifest
    fn write_route(
        &self,
        route: &str,
        html: &str,
        revalidate: Option<Duration>,
        now: u64,
    ) -> Result<RouteEntry> {
        let relative = output_path_for(route)?;
        let output_path = self.site.public_dir.join(&relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(RouteEntry {
            generated_at: now,
            revalidate: revalidate.map(|d| d.as_secs()),
            output_path: relative.to_string_lossy().to_string(),
        })
    }

    /// Write the embedded theme assets
    fn copy_assets(&self) -> Result<()> {
        for (path, _, body) in ASSETS {
            let dest = self.site.public_dir.join(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, body)?;
        }
        Ok(())
    }
}

/// File a route is written to, relative to the public directory
///
/// # Examples
/// ```ignore
/// output_path_for("/post/hello") // -> "post/hello/index.html"
/// ```
pub fn output_path_for(route: &str) -> Result<PathBuf> {
    let relative = Path::new(route.trim_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        bail!("refusing to write route outside the public dir: {}", route);
    }
    Ok(relative.join("index.html"))
}
