//! Content repository client (Prismic REST API v2)
//!
//! Loaders receive an `Arc<dyn ContentService>` instead of building a client
//! themselves, so tests can hand them an in-memory fake.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::config::PrismicConfig;
use crate::helpers::same_origin;

mod error;
pub mod model;

pub use error::ContentError;
pub use model::{ApiInfo, ApiPage, Document};

/// Result of a lookup that may legitimately find nothing
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }
}

/// Read operations the site needs from the content repository
#[async_trait]
pub trait ContentService: Send + Sync {
    /// First page of documents of a custom type
    async fn get_by_type(&self, document_type: &str) -> Result<ApiPage<Document>, ContentError>;

    /// One document by its UID
    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Lookup<Document>, ContentError>;

    /// Follow an opaque `next_page` cursor
    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage<Document>, ContentError>;

    /// Every document of a custom type, following cursors to the last page
    async fn get_all_by_type(&self, document_type: &str) -> Result<Vec<Document>, ContentError> {
        let mut page = self.get_by_type(document_type).await?;
        let mut documents = std::mem::take(&mut page.results);
        let mut seen = HashSet::new();

        while let Some(cursor) = page.next_page.take() {
            if !seen.insert(cursor.clone()) {
                warn!("Cursor {} repeated, stopping pagination", cursor);
                break;
            }
            page = self.fetch_page(&cursor).await?;
            documents.append(&mut page.results);
        }

        Ok(documents)
    }
}

/// HTTP client for a Prismic repository
#[derive(Clone)]
pub struct PrismicClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
    page_size: usize,
}

impl fmt::Debug for PrismicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrismicClient")
            .field("endpoint", &self.endpoint)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl PrismicClient {
    pub fn new(config: &PrismicConfig) -> Result<Self, ContentError> {
        let endpoint = parse_url(config.api_endpoint.trim())?;
        let http = Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
            page_size: config.page_size,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve the ref of the published content
    async fn master_ref(&self) -> Result<String, ContentError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(ContentError::NoMasterRef)
    }

    /// Build a `documents/search` URL for one predicate
    fn search_url(
        &self,
        reference: &str,
        predicate: &str,
        page_size: usize,
    ) -> Result<Url, ContentError> {
        let base = format!(
            "{}/documents/search",
            self.endpoint.as_str().trim_end_matches('/')
        );
        let mut url = parse_url(&base)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("ref", reference)
                .append_pair("q", &format!("[{}]", predicate))
                .append_pair("pageSize", &page_size.to_string())
                .append_pair("page", "1");
            if let Some(token) = &self.access_token {
                query.append_pair("access_token", token);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ContentError> {
        // Query strings may carry the access token
        debug!(path = %url.path(), "GET content API");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!("Content API error - Status: {}, Body: {}", status, body);
            return Err(ContentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentService for PrismicClient {
    async fn get_by_type(&self, document_type: &str) -> Result<ApiPage<Document>, ContentError> {
        let reference = self.master_ref().await?;
        let url = self.search_url(
            &reference,
            &at("document.type", document_type),
            self.page_size,
        )?;
        self.get_json(url).await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Lookup<Document>, ContentError> {
        let reference = self.master_ref().await?;
        let field = format!("my.{}.uid", document_type);
        let url = self.search_url(&reference, &at(&field, uid), 1)?;
        let page: ApiPage<Document> = self.get_json(url).await?;

        Ok(match page.results.into_iter().next() {
            Some(document) => Lookup::Found(document),
            None => {
                debug!("No {} document with uid {}", document_type, uid);
                Lookup::NotFound
            }
        })
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage<Document>, ContentError> {
        let url = parse_url(cursor)?;
        if !same_origin(&url, &self.endpoint) {
            return Err(ContentError::ForeignCursor(cursor.to_string()));
        }
        self.get_json(url).await
    }
}

/// `at` predicate in the Prismic query language
fn at(path: &str, value: &str) -> String {
    format!(
        "[at({}, \"{}\")]",
        path,
        value.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

fn parse_url(raw: &str) -> Result<Url, ContentError> {
    Url::parse(raw).map_err(|e| ContentError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>) -> PrismicClient {
        PrismicClient::new(&PrismicConfig {
            api_endpoint: "https://blog.cdn.prismic.io/api/v2".to_string(),
            access_token: token.map(str::to_string),
            document_type: "post".to_string(),
            page_size: 20,
        })
        .unwrap()
    }

    #[test]
    fn test_at_predicate() {
        assert_eq!(at("document.type", "post"), r#"[at(document.type, "post")]"#);
        assert_eq!(at("my.post.uid", r#"a"b"#), r#"[at(my.post.uid, "a\"b")]"#);
    }

    #[test]
    fn test_search_url() {
        let client = client(Some("secret"));
        let url = client
            .search_url("MASTER", &at("document.type", "post"), 20)
            .unwrap();
        assert_eq!(url.path(), "/api/v2/documents/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("ref".to_string(), "MASTER".to_string())));
        assert!(pairs.contains(&(
            "q".to_string(),
            r#"[[at(document.type, "post")]]"#.to_string()
        )));
        assert!(pairs.contains(&("pageSize".to_string(), "20".to_string())));
        assert!(pairs.contains(&("access_token".to_string(), "secret".to_string())));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = PrismicClient::new(&PrismicConfig {
            api_endpoint: "not a url".to_string(),
            ..PrismicConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ContentError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_foreign_cursor_rejected() {
        let client = client(None);
        let err = client
            .fetch_page("https://elsewhere.example.com/api/v2/documents/search?page=2")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::ForeignCursor(_)));
    }

    #[test]
    fn test_lookup_helpers() {
        let found = Lookup::Found(2).map(|n| n * 2);
        assert_eq!(found, Lookup::Found(4));
        assert_eq!(found.found(), Some(4));
        assert!(Lookup::<u8>::NotFound.is_not_found());
    }
}
