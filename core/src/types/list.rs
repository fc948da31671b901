use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

/// A hypermedia link attached to an entity or a list page.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "rel", alias = "Rel")]
    pub rel: Option<String>,
    #[serde(rename = "href", alias = "Href")]
    pub href: Option<String>,
}

/// One page of a list-returning operation.
///
/// `Default` is the empty page returned when the server answers 204.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default, bound(deserialize = "T: Deserialize<'de>"))]
pub struct PaginatedList<T> {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub page: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub size_page: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub count: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub total_items: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub items: Vec<T>,
    pub date_generated: Option<DateTime<Utc>>,
    pub links: Option<Vec<Link>>,
}

impl<T> Default for PaginatedList<T> {
    fn default() -> Self {
        Self {
            page: 0,
            size_page: 0,
            count: 0,
            total_items: 0,
            items: Vec::new(),
            date_generated: None,
            links: None,
        }
    }
}

impl<T> PaginatedList<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a following page exists, judged from the envelope counters.
    pub fn has_next_page(&self) -> bool {
        self.page > 0
            && self.size_page > 0
            && i64::from(self.page) * i64::from(self.size_page) < i64::from(self.total_items)
    }
}

impl<T> IntoIterator for PaginatedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
