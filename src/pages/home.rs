//! Listing page loader

use anyhow::{Context, Result};

use super::StaticProps;
use crate::config::SiteConfig;
use crate::content::PostPagination;
use crate::prismic::ContentService;

/// Props of the listing page
#[derive(Debug, Clone, PartialEq)]
pub struct HomeProps {
    pub post_pagination: PostPagination,
}

/// Fetch the first page of posts and its cursor
pub async fn get_static_props(
    service: &dyn ContentService,
    config: &SiteConfig,
) -> Result<StaticProps<HomeProps>> {
    let document_type = &config.prismic.document_type;
    let page = service
        .get_by_type(document_type)
        .await
        .with_context(|| format!("failed to list {} documents", document_type))?;
    let post_pagination = PostPagination::from_page(page)?;

    tracing::debug!(
        "Loaded {} posts for the listing (more: {})",
        post_pagination.results.len(),
        post_pagination.next_page.is_some()
    );

    Ok(StaticProps::Props {
        props: HomeProps { post_pagination },
        revalidate: Some(config.revalidate_window()),
    })
}
