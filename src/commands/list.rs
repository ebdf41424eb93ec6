//! List posts

use anyhow::Result;
use std::collections::HashSet;

use crate::listing::{ListingState, LoadMore};
use crate::pages::{home, StaticProps};
use crate::prismic::ContentService;
use crate::templates::DateFormatter;
use crate::Site;

/// Load the listing and, with `all`, keep loading more until the cursor runs out
pub async fn load(site: &Site, service: &dyn ContentService, all: bool) -> Result<ListingState> {
    let mut state = match home::get_static_props(service, &site.config).await? {
        StaticProps::Props { props, .. } => ListingState::new(props.post_pagination),
        StaticProps::NotFound => ListingState::default(),
    };

    if all {
        let mut seen = HashSet::new();
        while let Some(cursor) = state.next_page() {
            if !seen.insert(cursor.to_string()) {
                tracing::warn!("Cursor {} repeated, stopping pagination", cursor);
                break;
            }
            match state.load_more(service).await? {
                LoadMore::Loaded(appended) => tracing::debug!("Appended {} posts", appended),
                LoadMore::Exhausted | LoadMore::Busy => break,
            }
        }
    }

    Ok(state)
}

/// Print post summaries
pub async fn run(site: &Site, service: &dyn ContentService, all: bool) -> Result<()> {
    let state = load(site, service, all).await?;
    let dates = DateFormatter::from_config(&site.config)?;

    println!("Posts ({}):", state.posts().len());
    for post in state.posts() {
        let date = dates
            .display(post.first_publication_date.as_deref())
            .unwrap_or_else(|| "-".to_string());
        println!("  {} - {} by {} [{}]", date, post.title, post.author, post.slug);
    }
    if state.has_more() {
        println!("More posts available, use --all to list every page.");
    }

    Ok(())
}
