//! Post models

use serde::{Deserialize, Serialize};

use super::richtext::RichText;
use crate::prismic::{ApiPage, ContentError, Document};

/// Fields of a `post` document shown in the listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SummaryData {
    title: String,
    subtitle: String,
    author: String,
}

/// Fields of a `post` document shown on its own page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct DetailData {
    title: String,
    banner: Banner,
    author: String,
    content: Vec<ContentSection>,
}

/// A post as listed on the home page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSummary {
    /// URL-safe identifier (the document UID)
    pub slug: String,

    /// First publication timestamp (ISO 8601)
    pub first_publication_date: Option<String>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    pub fn from_document(document: Document) -> Result<Self, ContentError> {
        let document = document.decode::<SummaryData>()?;
        Ok(Self {
            slug: document.uid.unwrap_or(document.id),
            first_publication_date: document.first_publication_date,
            title: document.data.title,
            subtitle: document.data.subtitle,
            author: document.data.author,
        })
    }
}

/// Banner image of a post
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Banner {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A heading followed by its rich text body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub body: RichText,
}

/// A full post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostDetail {
    pub slug: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub banner: Banner,
    pub author: String,
    pub content: Vec<ContentSection>,
}

impl PostDetail {
    pub fn from_document(document: Document) -> Result<Self, ContentError> {
        let document = document.decode::<DetailData>()?;
        Ok(Self {
            slug: document.uid.unwrap_or(document.id),
            first_publication_date: document.first_publication_date,
            title: document.data.title,
            banner: document.data.banner,
            author: document.data.author,
            content: document.data.content,
        })
    }
}

/// A page of post summaries plus the cursor of the next one
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostPagination {
    pub fn from_page(page: ApiPage<Document>) -> Result<Self, ContentError> {
        let page = page.try_map(PostSummary::from_document)?;
        Ok(Self {
            next_page: page.next_page,
            results: page.results,
        })
    }
}
