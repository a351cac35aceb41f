// src/models/page.rs

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::serde_de::{string_lenient, u32_lenient, vec_lenient};

/// One navigation entry of a paginated listing ("« Previous", "1", "2", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: Option<String>,
    #[serde(default, deserialize_with = "string_lenient")]
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

/// Pagination metadata without the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u32,
    pub last_page: u32,
    pub links: Vec<PageLink>,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            current_page: 1,
            per_page: 0,
            total: 0,
            last_page: 1,
            links: Vec::new(),
        }
    }
}

impl PageMeta {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// Standard list envelope:
/// `{ data, current_page, per_page, total, last_page, links }`.
/// Every field is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Paginated<T> {
    #[serde(default, deserialize_with = "vec_lenient")]
    pub data: Vec<T>,
    #[serde(default = "first_page", deserialize_with = "page_number")]
    pub current_page: u32,
    #[serde(default, deserialize_with = "u32_lenient")]
    pub per_page: u32,
    #[serde(default, deserialize_with = "u32_lenient")]
    pub total: u32,
    #[serde(default = "first_page", deserialize_with = "page_number")]
    pub last_page: u32,
    #[serde(default, deserialize_with = "vec_lenient")]
    pub links: Vec<PageLink>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            per_page: 0,
            total: 0,
            last_page: 1,
            links: Vec::new(),
        }
    }
}

impl<T> Paginated<T> {
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            links: self.links.clone(),
        }
    }
}

fn first_page() -> u32 {
    1
}

fn page_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(u32_lenient(deserializer)?.max(1))
}
