//! Built-in spacetraveling theme rendered with Tera
//!
//! Templates and static assets are embedded in the binary.

use anyhow::Result;
use chrono::Locale;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{as_html, reading_time, PostDetail, PostSummary};
use crate::helpers::{
    date_xml, format_publication_date, parse_locale, parse_publication_date, post_path,
};

/// Static assets: (path, content type, body)
pub const ASSETS: &[(&str, &str, &str)] = &[
    (
        "css/style.css",
        "text/css; charset=utf-8",
        include_str!("theme/assets/style.css"),
    ),
    (
        "js/load-more.js",
        "application/javascript; charset=utf-8",
        include_str!("theme/assets/load-more.js"),
    ),
    (
        "logo.svg",
        "image/svg+xml",
        include_str!("theme/assets/logo.svg"),
    ),
];

/// Look up an embedded asset by request path
pub fn asset(path: &str) -> Option<(&'static str, &'static str)> {
    let path = path.trim_start_matches('/');
    ASSETS
        .iter()
        .find(|(p, _, _)| *p == path)
        .map(|(_, content_type, body)| (*content_type, *body))
}

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Everything is escaped unless marked `safe` in the template
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("404.html", include_str!("theme/404.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Formats publication dates the way the site displays them
#[derive(Debug, Clone)]
pub struct DateFormatter {
    format: String,
    tz: chrono_tz::Tz,
    locale: Locale,
}

impl DateFormatter {
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            format: config.date_format.clone(),
            tz: config.tz()?,
            locale: parse_locale(&config.language)?,
        })
    }

    /// Display form, e.g. `25 mar 2021`
    pub fn display(&self, raw: Option<&str>) -> Option<String> {
        format_publication_date(raw, &self.format, self.tz, self.locale)
    }

    /// Machine form for `<time datetime>`
    pub fn datetime(&self, raw: Option<&str>) -> Option<String> {
        let date = parse_publication_date(raw?)?.with_timezone(&self.tz);
        Some(date_xml(&date))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub url: String,
    pub language: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }
}

/// A post in the listing; also the shape returned by the load-more endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostCard {
    pub slug: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub created_at: Option<String>,
    pub datetime: Option<String>,
}

impl PostCard {
    pub fn new(summary: &PostSummary, dates: &DateFormatter) -> Self {
        let published = summary.first_publication_date.as_deref();
        Self {
            slug: summary.slug.clone(),
            path: post_path(&summary.slug),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            created_at: dates.display(published),
            datetime: dates.datetime(published),
        }
    }
}

/// A page of cards plus the cursor of the next page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardPage {
    pub next_page: Option<String>,
    pub results: Vec<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub path: String,
    pub banner_url: String,
    pub banner_alt: String,
    pub author: String,
    pub created_at: Option<String>,
    pub datetime: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionData>,
}

impl PostData {
    pub fn new(post: &PostDetail, dates: &DateFormatter, words_per_minute: usize) -> Self {
        let published = post.first_publication_date.as_deref();
        Self {
            title: post.title.clone(),
            path: post_path(&post.slug),
            banner_url: post.banner.url.clone(),
            banner_alt: post.banner.alt.clone().unwrap_or_else(|| post.title.clone()),
            author: post.author.clone(),
            created_at: dates.display(published),
            datetime: dates.datetime(published),
            reading_time: reading_time(post, words_per_minute),
            sections: post
                .content
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    html: as_html(&section.body),
                })
                .collect(),
        }
    }
}
