use chrono::NaiveDate;
use url::form_urlencoded;

use crate::pagination::PageRequest;

/// Ordered query-string builder. Empty values are dropped so an absent
/// filter never reaches the server as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn push_opt(&mut self, key: &str, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn push_date(&mut self, key: &str, value: Option<NaiveDate>) -> &mut Self {
        self.push_opt(key, value.map(|date| date.format("%Y-%m-%d").to_string()))
    }

    pub fn push_page(&mut self, page: PageRequest) -> &mut Self {
        self.push_opt("page_size", page.page_size.map(|size| size.to_string()));
        self.push_opt("page", page.page.map(|page| page.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// `path` with the encoded query appended, or `path` alone when empty.
    pub fn apply(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.encode())
        }
    }
}
