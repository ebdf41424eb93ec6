//! Wire models of the Prismic REST API (v2)

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ContentError;

/// Response of `GET {endpoint}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

impl ApiInfo {
    /// The ref that points at published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// A repository document; `data` stays untyped until a loader decodes it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document<T = Value> {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    pub data: T,
}

impl Document<Value> {
    /// Decode `data` into a typed model
    pub fn decode<T: DeserializeOwned>(self) -> Result<Document<T>, ContentError> {
        Ok(Document {
            id: self.id,
            uid: self.uid,
            document_type: self.document_type,
            first_publication_date: self.first_publication_date,
            last_publication_date: self.last_publication_date,
            data: serde_json::from_value(self.data)?,
        })
    }
}

/// One page of a paged query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub results_size: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// Opaque URL of the next page; `None` on the last page
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> ApiPage<T> {
    /// A single page holding `results`
    pub fn new(results: Vec<T>, next_page: Option<String>) -> Self {
        let size = results.len() as u32;
        Self {
            page: 1,
            results_per_page: size,
            results_size: size,
            total_results_size: size,
            total_pages: 1,
            next_page,
            prev_page: None,
            results,
        }
    }

    /// Transform every result, keeping the paging fields
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<ApiPage<U>, E> {
        Ok(ApiPage {
            page: self.page,
            results_per_page: self.results_per_page,
            results_size: self.results_size,
            total_results_size: self.total_results_size,
            total_pages: self.total_pages,
            next_page: self.next_page,
            prev_page: self.prev_page,
            results: self.results.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }
}
