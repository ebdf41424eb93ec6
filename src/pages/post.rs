//! Post page loaders

use anyhow::{Context, Result};

use super::StaticProps;
use crate::config::SiteConfig;
use crate::content::PostDetail;
use crate::prismic::{ContentService, Lookup};

/// Props of a post page
#[derive(Debug, Clone, PartialEq)]
pub struct PostProps {
    pub post: PostDetail,
}

/// Slugs of every post to pre-render.
///
/// Slugs missing from this list are rendered on their first request.
pub async fn get_static_paths(
    service: &dyn ContentService,
    config: &SiteConfig,
) -> Result<Vec<String>> {
    let document_type = &config.prismic.document_type;
    let documents = service
        .get_all_by_type(document_type)
        .await
        .with_context(|| format!("failed to enumerate {} documents", document_type))?;

    let mut slugs = Vec::with_capacity(documents.len());
    for document in documents {
        match document.uid {
            Some(uid) => slugs.push(uid),
            None => tracing::warn!("Skipping document {} without a UID", document.id),
        }
    }
    Ok(slugs)
}

/// Fetch one post; a missing UID yields `NotFound`
pub async fn get_static_props(
    service: &dyn ContentService,
    config: &SiteConfig,
    slug: &str,
) -> Result<StaticProps<PostProps>> {
    let document_type = &config.prismic.document_type;
    let lookup = service
        .get_by_uid(document_type, slug)
        .await
        .with_context(|| format!("failed to fetch post {}", slug))?;

    match lookup {
        Lookup::Found(document) => Ok(StaticProps::Props {
            props: PostProps {
                post: PostDetail::from_document(document)?,
            },
            revalidate: Some(config.revalidate_window()),
        }),
        Lookup::NotFound => {
            tracing::info!("Post not found: {}", slug);
            Ok(StaticProps::NotFound)
        }
    }
}
