//! Backend indices.

use serde::{Deserialize, Serialize};

/// An index queried by the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Index {
    /// Published content.
    #[default]
    Ons,
    /// Government departments.
    Departments,
}

impl Index {
    /// Index name on the backend.
    pub fn name(&self) -> &'static str {
        match self {
            Index::Ons => "ons",
            Index::Departments => "departments",
        }
    }
}
