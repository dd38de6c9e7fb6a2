//! Field registry.
//!
//! Maps logical field names to index field names and boost weights. Fields
//! are `'static` constants: they are defined once, referenced by name, and
//! never duplicated.
//!
//! Query builders accept anything convertible into a [`FieldRef`], which is
//! either a registry [`Field`] or a raw index field name. The distinction is
//! resolved once, when the reference is created.
//!
//! ```rust
//! use dpsearch_core::fields::{self, FieldRef};
//!
//! assert_eq!(fields::TITLE.boosted_name(), "description.title^10");
//! assert_eq!(FieldRef::resolve("summary").index_name(), "description.summary");
//! assert_eq!(FieldRef::resolve("custom.field").index_name(), "custom.field");
//! ```

use std::borrow::Cow;
use std::fmt;

/// A document field known to the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    /// Name used by callers and configuration.
    pub logical_name: &'static str,
    /// Name of the field in the index.
    pub name: &'static str,
    /// Boost applied when the field is used in its boosted form.
    pub boost: Option<f32>,
    /// Whether the content query requests highlighting on this field.
    pub highlight: bool,
}

impl Field {
    const fn new(logical_name: &'static str, name: &'static str) -> Self {
        Self {
            logical_name,
            name,
            boost: None,
            highlight: false,
        }
    }

    const fn boosted(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    const fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    /// Field name with its boost suffix (`name^boost`).
    ///
    /// Fields without a boost return the bare index name.
    pub fn boosted_name(&self) -> Cow<'static, str> {
        match self.boost {
            Some(boost) => Cow::Owned(format!("{}^{}", self.name, boost)),
            None => Cow::Borrowed(self.name),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Title with dates stripped by the analyzer.
pub const TITLE_NO_DATES: Field = Field::new("title_no_dates", "description.title.title_no_dates");
/// Title without stemming.
pub const TITLE_NO_STEM: Field = Field::new("title_no_stem", "description.title.title_no_stem");
/// Page title.
pub const TITLE: Field = Field::new("title", "description.title")
    .boosted(10.0)
    .highlighted();
/// Untokenized title, used for sorting.
pub const TITLE_RAW: Field = Field::new("title_raw", "description.title.title_raw");
/// First letter of the title, used for A-Z sorting.
pub const TITLE_FIRST_LETTER: Field = Field::new(
    "title_first_letter",
    "description.title.title_first_letter",
);
/// Edition (e.g. "March 2018").
pub const EDITION: Field = Field::new("edition", "description.edition")
    .boosted(1.0)
    .highlighted();
/// Summary text.
pub const SUMMARY: Field = Field::new("summary", "description.summary").highlighted();
/// Meta description.
pub const META_DESCRIPTION: Field =
    Field::new("meta_description", "description.metaDescription").highlighted();
/// Curated keywords.
pub const KEYWORDS: Field = Field::new("keywords", "description.keywords").highlighted();
/// Untokenized keywords.
pub const KEYWORDS_RAW: Field = Field::new("keywords_raw", "description.keywords.keywords_raw");
/// Time series identifier.
pub const CDID: Field = Field::new("cdid", "description.cdid").highlighted();
/// Dataset identifier.
pub const DATASET_ID: Field = Field::new("dataset_id", "description.datasetId").highlighted();
/// Manually curated search boost terms.
pub const SEARCH_BOOST: Field = Field::new("search_boost", "searchBoost");
/// Release date.
pub const RELEASE_DATE: Field = Field::new("release_date", "description.releaseDate");
/// Document embedding vector.
pub const EMBEDDING_VECTOR: Field = Field::new("embedding_vector", "embedding_vector");
/// Content type marker.
pub const TYPE: Field = Field::new("type", "_type");
/// Page URI.
pub const URI: Field = Field::new("uri", "uri");
/// Search terms of a government department.
pub const DEPARTMENT_TERMS: Field = Field::new("department_terms", "terms");

/// Every registered field.
pub const ALL: &[Field] = &[
    TITLE_NO_DATES,
    TITLE_NO_STEM,
    TITLE,
    TITLE_RAW,
    TITLE_FIRST_LETTER,
    EDITION,
    SUMMARY,
    META_DESCRIPTION,
    KEYWORDS,
    KEYWORDS_RAW,
    CDID,
    DATASET_ID,
    SEARCH_BOOST,
    RELEASE_DATE,
    EMBEDDING_VECTOR,
    TYPE,
    URI,
    DEPARTMENT_TERMS,
];

/// Look up a registered field by logical name.
pub fn lookup(logical_name: &str) -> Option<&'static Field> {
    ALL.iter().find(|f| f.logical_name == logical_name)
}

/// Fields that the content query highlights.
pub fn highlight_fields() -> impl Iterator<Item = &'static Field> {
    ALL.iter().filter(|f| f.highlight)
}

// ============================================================================
// FieldRef
// ============================================================================

/// Reference to a field: either a registry entry or a raw index name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    /// A field from the registry.
    Named(&'static Field),
    /// An index field name not in the registry.
    Raw(String),
}

impl FieldRef {
    /// Resolve a logical name against the registry, falling back to a raw name.
    pub fn resolve(name: &str) -> Self {
        match lookup(name) {
            Some(field) => FieldRef::Named(field),
            None => FieldRef::Raw(name.to_string()),
        }
    }

    /// Name of the field in the index.
    pub fn index_name(&self) -> &str {
        match self {
            FieldRef::Named(field) => field.name,
            FieldRef::Raw(name) => name,
        }
    }
}

impl From<&'static Field> for FieldRef {
    fn from(field: &'static Field) -> Self {
        FieldRef::Named(field)
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        FieldRef::Raw(name.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        FieldRef::Raw(name)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
