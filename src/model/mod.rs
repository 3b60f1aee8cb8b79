mod block;
pub mod blocks;
pub mod common;
mod property_value;

pub use block::Block;
pub use blocks::*;
pub use common::*;
pub use property_value::{FileRef, PropertyValue};

use crate::types::{DatabaseId, PageId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A row of a Notion database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub url: String,
    pub archived: bool,
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Plain text of the named property, or an empty string when absent.
    pub fn text_of(&self, name: &str) -> String {
        self.property(name)
            .map(PropertyValue::as_plain_text)
            .unwrap_or_default()
    }

    /// Plain text of whichever property has the `title` type.
    pub fn title(&self) -> String {
        self.properties
            .values()
            .find(|value| matches!(value, PropertyValue::Title(_)))
            .map(PropertyValue::as_plain_text)
            .unwrap_or_default()
    }
}

/// A search result: just enough to match on exact titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
}

/// Which kind of object a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchObject {
    Page,
    Database,
}

impl SearchObject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Database => "database",
        }
    }
}

/// A database that was found or created for a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    pub id: DatabaseId,
    pub created: bool,
}
