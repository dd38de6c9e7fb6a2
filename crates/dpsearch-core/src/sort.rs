//! Sort options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::{self, Field};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Target of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortTarget {
    /// Sort on a registry field.
    Field(&'static Field),
    /// Sort on the relevance score.
    Score,
}

impl SortTarget {
    /// Name of the sort key as the backend expects it.
    pub fn key(&self) -> &'static str {
        match self {
            SortTarget::Field(field) => field.name,
            SortTarget::Score => "_score",
        }
    }
}

/// Client-facing sort option.
///
/// `Relevance` means no explicit sort: hits come back in score order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Natural score order.
    #[default]
    Relevance,
    /// Oldest releases first.
    ReleaseDateAsc,
    /// Newest releases first.
    ReleaseDateDesc,
    /// Title A-Z.
    TitleAsc,
    /// Title Z-A.
    TitleDesc,
    /// Grouped by first letter of the title.
    FirstLetter,
}

impl SortField {
    /// Name accepted on requests.
    pub fn name(&self) -> &'static str {
        match self {
            SortField::Relevance => "relevance",
            SortField::ReleaseDateAsc => "release_date_asc",
            SortField::ReleaseDateDesc => "release_date_desc",
            SortField::TitleAsc => "title_asc",
            SortField::TitleDesc => "title_desc",
            SortField::FirstLetter => "first_letter",
        }
    }

    /// Sort clauses, in priority order. Empty for `Relevance`.
    pub fn clauses(&self) -> Vec<(SortTarget, SortOrder)> {
        use SortOrder::*;

        match self {
            SortField::Relevance => Vec::new(),
            SortField::ReleaseDateAsc => vec![
                (SortTarget::Field(&fields::RELEASE_DATE), Asc),
                (SortTarget::Score, Desc),
            ],
            SortField::ReleaseDateDesc => vec![
                (SortTarget::Field(&fields::RELEASE_DATE), Desc),
                (SortTarget::Score, Desc),
            ],
            SortField::TitleAsc => vec![
                (SortTarget::Field(&fields::TITLE_RAW), Asc),
                (SortTarget::Field(&fields::RELEASE_DATE), Desc),
            ],
            SortField::TitleDesc => vec![
                (SortTarget::Field(&fields::TITLE_RAW), Desc),
                (SortTarget::Field(&fields::RELEASE_DATE), Desc),
            ],
            SortField::FirstLetter => vec![
                (SortTarget::Field(&fields::TITLE_FIRST_LETTER), Asc),
                (SortTarget::Score, Desc),
                (SortTarget::Field(&fields::TITLE_RAW), Asc),
            ],
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "relevance" => Ok(SortField::Relevance),
            "release_date_asc" => Ok(SortField::ReleaseDateAsc),
            "release_date" | "release_date_desc" => Ok(SortField::ReleaseDateDesc),
            "title" | "title_asc" => Ok(SortField::TitleAsc),
            "title_desc" => Ok(SortField::TitleDesc),
            "first_letter" => Ok(SortField::FirstLetter),
            _ => Err(Error::UnknownSortField {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_has_no_clauses() {
        assert!(SortField::Relevance.clauses().is_empty());
        assert_eq!(SortField::default(), SortField::Relevance);
    }

    #[test]
    fn test_release_date_desc_clauses() {
        let clauses = SortField::ReleaseDateDesc.clauses();
        assert_eq!(clauses[0].0.key(), "description.releaseDate");
        assert_eq!(clauses[0].1, SortOrder::Desc);
        assert_eq!(clauses[1].0, SortTarget::Score);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("release_date".parse::<SortField>().unwrap(), SortField::ReleaseDateDesc);
        assert_eq!("TITLE".parse::<SortField>().unwrap(), SortField::TitleAsc);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "popularity".parse::<SortField>().unwrap_err();
        assert!(err.to_string().contains("popularity"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_name_roundtrip() {
        for sort in [
            SortField::Relevance,
            SortField::ReleaseDateAsc,
            SortField::ReleaseDateDesc,
            SortField::TitleAsc,
            SortField::TitleDesc,
            SortField::FirstLetter,
        ] {
            assert_eq!(sort.name().parse::<SortField>().unwrap(), sort);
        }
    }
}
