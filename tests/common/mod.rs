#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use spacetraveling::config::SiteConfig;
use spacetraveling::prismic::{ApiPage, ContentError, ContentService, Document, Lookup};
use spacetraveling::Site;

pub const ORIGIN: &str = "https://blog.cdn.prismic.io";

pub fn cursor(page: u32) -> String {
    format!("{}/api/v2/documents/search?page={}", ORIGIN, page)
}

pub fn post_document(uid: &str, title: &str) -> Document {
    Document {
        id: format!("id-{}", uid),
        uid: Some(uid.to_string()),
        document_type: "post".to_string(),
        first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
        last_publication_date: None,
        data: json!({
            "title": title,
            "subtitle": format!("Sobre {}", title),
            "author": "Joseph Oliveira",
            "banner": { "url": format!("https://images.prismic.io/{}.png", uid), "alt": null },
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        { "type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [] }
                    ]
                }
            ]
        }),
    }
}

/// In-memory content repository that records how often it is queried
#[derive(Clone)]
pub struct FakeContent {
    first_page: Arc<Mutex<ApiPage<Document>>>,
    pages: Arc<Mutex<HashMap<String, ApiPage<Document>>>>,
    documents: Arc<Mutex<HashMap<String, Document>>>,
    failing: Arc<Mutex<bool>>,
    pub type_calls: Arc<AtomicUsize>,
    pub uid_calls: Arc<AtomicUsize>,
    pub page_calls: Arc<AtomicUsize>,
}

impl FakeContent {
    /// Repository whose listing is split into pages of `per_page` posts
    pub fn with_posts(posts: &[(&str, &str)], per_page: usize) -> Self {
        let documents: Vec<Document> = posts
            .iter()
            .map(|(uid, title)| post_document(uid, title))
            .collect();

        let chunks: Vec<Vec<Document>> = documents
            .chunks(per_page.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let last = chunks.len().saturating_sub(1);

        let mut pages = HashMap::new();
        let mut first_page = ApiPage::new(Vec::new(), None);
        for (i, chunk) in chunks.into_iter().enumerate() {
            let next = (i < last).then(|| cursor(i as u32 + 2));
            let page = ApiPage::new(chunk, next);
            if i == 0 {
                first_page = page;
            } else {
                pages.insert(cursor(i as u32 + 1), page);
            }
        }

        let by_uid = documents
            .into_iter()
            .filter_map(|d| d.uid.clone().map(|uid| (uid, d)))
            .collect();

        Self {
            first_page: Arc::new(Mutex::new(first_page)),
            pages: Arc::new(Mutex::new(pages)),
            documents: Arc::new(Mutex::new(by_uid)),
            failing: Arc::new(Mutex::new(false)),
            type_calls: Arc::new(AtomicUsize::new(0)),
            uid_calls: Arc::new(AtomicUsize::new(0)),
            page_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn remove_post(&self, uid: &str) {
        self.documents.lock().await.remove(uid);
        let mut first = self.first_page.lock().await;
        first.results.retain(|d| d.uid.as_deref() != Some(uid));
        for page in self.pages.lock().await.values_mut() {
            page.results.retain(|d| d.uid.as_deref() != Some(uid));
        }
    }

    pub async fn set_title(&self, uid: &str, title: &str) {
        let replace = |d: &mut Document| {
            if d.uid.as_deref() == Some(uid) {
                d.data["title"] = Value::String(title.to_string());
            }
        };
        if let Some(d) = self.documents.lock().await.get_mut(uid) {
            replace(d);
        }
        self.first_page.lock().await.results.iter_mut().for_each(replace);
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    async fn check(&self) -> Result<(), ContentError> {
        if *self.failing.lock().await {
            return Err(ContentError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContentService for FakeContent {
    async fn get_by_type(&self, _document_type: &str) -> Result<ApiPage<Document>, ContentError> {
        self.type_calls.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        Ok(self.first_page.lock().await.clone())
    }

    async fn get_by_uid(
        &self,
        _document_type: &str,
        uid: &str,
    ) -> Result<Lookup<Document>, ContentError> {
        self.uid_calls.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        Ok(match self.documents.lock().await.get(uid) {
            Some(document) => Lookup::Found(document.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage<Document>, ContentError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if !cursor.starts_with(ORIGIN) {
            return Err(ContentError::ForeignCursor(cursor.to_string()));
        }
        self.check().await?;
        self.pages
            .lock()
            .await
            .get(cursor)
            .cloned()
            .ok_or_else(|| ContentError::Status {
                status: 404,
                body: "no such page".to_string(),
            })
    }
}

pub fn site(dir: &Path, revalidate: u64) -> Site {
    let mut config = SiteConfig::default();
    config.revalidate = revalidate;
    config.prismic.api_endpoint = format!("{}/api/v2", ORIGIN);
    Site::with_config(dir, config)
}
