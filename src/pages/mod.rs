//! Page data loaders
//!
//! Each loader takes the content service explicitly and returns the props a
//! page is rendered from, together with how long the rendered page may be
//! reused.

pub mod home;
pub mod post;

use std::time::Duration;

/// Result of a page loader
#[derive(Debug, Clone, PartialEq)]
pub enum StaticProps<T> {
    /// Render the page from `props`; regenerate after `revalidate`
    Props {
        props: T,
        revalidate: Option<Duration>,
    },
    /// Answer with the not-found page
    NotFound,
}

impl<T> StaticProps<T> {
    pub fn props(self) -> Option<T> {
        match self {
            StaticProps::Props { props, .. } => Some(props),
            StaticProps::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StaticProps::NotFound)
    }
}
