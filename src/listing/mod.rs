//! Post listing state and the "load more" reducer
//!
//! A load is split into `begin_load` and `finish_load` so a caller holding
//! the state behind a lock never keeps it locked across the network call.
//! The busy flag rejects a second load while one is in flight.

use anyhow::Result;

use crate::content::{PostPagination, PostSummary};
use crate::prismic::ContentService;

/// Outcome of a `load_more` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page was fetched and this many posts were appended
    Loaded(usize),
    /// No cursor left
    Exhausted,
    /// Another load is already in flight
    Busy,
}

/// Posts shown so far plus the cursor of the next page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    loading: bool,
}

impl ListingState {
    pub fn new(initial: PostPagination) -> Self {
        Self {
            posts: initial.results,
            next_page: initial.next_page,
            loading: false,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether the "load more" control should be rendered
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Claim the cursor to fetch, or `None` when exhausted or busy
    pub fn begin_load(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.loading = true;
        Some(cursor)
    }

    /// Apply the result of a fetch started with `begin_load`.
    ///
    /// On success the cursor is replaced and the new posts are appended after
    /// the existing ones. On failure posts and cursor are left untouched.
    pub fn finish_load<E>(&mut self, result: Result<PostPagination, E>) -> Result<usize, E> {
        self.loading = false;
        let page = result?;
        let appended = page.results.len();
        self.next_page = page.next_page;
        self.posts.extend(page.results);
        Ok(appended)
    }

    /// Fetch the next page through `service` and append it
    pub async fn load_more(&mut self, service: &dyn ContentService) -> Result<LoadMore> {
        if self.loading {
            return Ok(LoadMore::Busy);
        }
        let Some(cursor) = self.begin_load() else {
            return Ok(LoadMore::Exhausted);
        };

        tracing::debug!("Loading more posts from {}", cursor);
        let result = match service.fetch_page(&cursor).await {
            Ok(page) => PostPagination::from_page(page),
            Err(e) => Err(e),
        };
        let appended = self.finish_load(result)?;
        Ok(LoadMore::Loaded(appended))
    }
}
