//! Course structure and the ordinal index built from it.
//!
//! A course is an ordered tree: chapters, sequentials, verticals, and in
//! each vertical the videos and problems (some problems nested inside
//! library-content groups). The ordinal index assigns every content item
//! its position in one depth-first traversal.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;
use validator::Validate;

use crate::error::{Error, Result};

/// Uploaded course structure, keyed by course code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CourseStructure {
    #[validate(length(min = 1, max = 512))]
    pub course_code: String,
    #[serde(default)]
    pub course_run: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub url_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub sequentials: Vec<Sequential>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequential {
    pub url_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub verticals: Vec<Vertical>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertical {
    pub url_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub videos: Vec<ContentItem>,
    #[serde(default)]
    pub problems: Vec<ContentItem>,
    #[serde(default)]
    pub library_contents: Vec<LibraryContent>,
}

/// A video or problem leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub url_name: String,
    #[serde(default)]
    pub display_name: String,
}

impl ContentItem {
    pub fn new(url_name: impl Into<String>) -> Self {
        Self {
            url_name: url_name.into(),
            display_name: String::new(),
        }
    }
}

/// Randomized problem bank inside a vertical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryContent {
    pub url_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub problems: Vec<ContentItem>,
}

impl CourseStructure {
    /// Content items in traversal order: per vertical, videos, then
    /// problems, then library-content problems.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.chapters
            .iter()
            .flat_map(|chapter| &chapter.sequentials)
            .flat_map(|sequential| &sequential.verticals)
            .flat_map(|vertical| {
                vertical
                    .videos
                    .iter()
                    .chain(&vertical.problems)
                    .chain(vertical.library_contents.iter().flat_map(|lib| &lib.problems))
            })
    }

    /// Validates the structure before it is stored.
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| Error::validation(e.to_string()))?;
        Ok(self)
    }
}

/// Content-item ID to position in course traversal order.
///
/// Positions are dense, unique and start at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdinalIndex {
    positions: HashMap<String, usize>,
}

impl OrdinalIndex {
    pub fn build(structure: &CourseStructure) -> Self {
        let mut positions = HashMap::new();
        for item in structure.items() {
            let next = positions.len();
            match positions.entry(item.url_name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(next);
                }
                Entry::Occupied(existing) => {
                    debug!(
                        course_code = %structure.course_code,
                        item_id = %item.url_name,
                        position = *existing.get(),
                        "Duplicate item in course structure, keeping first position"
                    );
                }
            }
        }
        Self { positions }
    }

    pub fn get(&self, item_id: &str) -> Option<usize> {
        self.positions.get(item_id).copied()
    }

    /// Position of an item, failing for items outside the structure.
    pub fn position(&self, item_id: &str) -> Result<usize> {
        self.get(item_id)
            .ok_or_else(|| Error::ItemNotInStructure(item_id.to_string()))
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.positions.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub fn build_ordinal_index(structure: &CourseStructure) -> OrdinalIndex {
    OrdinalIndex::build(structure)
}

/// Extracts `CourseCode` from `course-v1:org+CourseCode+CourseRun`.
pub fn course_code_from_course_id(course_id: &str) -> Result<&str> {
    let segments: Vec<&str> = course_id.split('+').collect();
    match segments.as_slice() {
        [_, code, _] => Ok(*code),
        _ => Err(Error::invalid_course_id(course_id)),
    }
}
