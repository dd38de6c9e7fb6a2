//! Named type filter groups.
//!
//! A [`TypeFilter`] groups one or more [`ContentType`]s under a name that
//! callers can pass on the request. Filters are used for hard inclusion
//! (only documents of the grouped types are returned) and to select which
//! per-type boost functions apply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;
use crate::error::{Error, Result};

/// A named group of content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    /// Reserved group used by the featured result query.
    Featured,
    /// Statistical bulletins.
    Bulletin,
    /// Articles and compendia.
    Article,
    /// Time series.
    Timeseries,
    /// Datasets.
    Datasets,
    /// Ad hoc user requested data.
    UserRequestedData,
    /// Methodology pages.
    Methodology,
    /// Corporate information.
    CorporateInformation,
    /// Quality and methodology information.
    Qmi,
}

impl TypeFilter {
    /// Every filter group, including the reserved `featured` group.
    pub const ALL: [TypeFilter; 9] = [
        TypeFilter::Featured,
        TypeFilter::Bulletin,
        TypeFilter::Article,
        TypeFilter::Timeseries,
        TypeFilter::Datasets,
        TypeFilter::UserRequestedData,
        TypeFilter::Methodology,
        TypeFilter::CorporateInformation,
        TypeFilter::Qmi,
    ];

    /// Name accepted on requests.
    pub fn name(&self) -> &'static str {
        match self {
            TypeFilter::Featured => "featured",
            TypeFilter::Bulletin => "bulletin",
            TypeFilter::Article => "article",
            TypeFilter::Timeseries => "timeseries",
            TypeFilter::Datasets => "datasets",
            TypeFilter::UserRequestedData => "user_requested_data",
            TypeFilter::Methodology => "methodology",
            TypeFilter::CorporateInformation => "corporate_information",
            TypeFilter::Qmi => "qmi",
        }
    }

    /// Content types in this group.
    pub fn content_types(&self) -> &'static [ContentType] {
        use ContentType::*;

        match self {
            TypeFilter::Featured => &[ProductPage, HomePageCensus, Timeseries],
            TypeFilter::Bulletin => &[Bulletin],
            TypeFilter::Article => &[Article, ArticleDownload, CompendiumLandingPage],
            TypeFilter::Timeseries => &[Timeseries],
            TypeFilter::Datasets => &[
                DatasetLandingPage,
                TimeseriesDataset,
                CompendiumData,
                ReferenceTables,
            ],
            TypeFilter::UserRequestedData => &[StaticAdhoc],
            TypeFilter::Methodology => &[
                StaticMethodology,
                StaticMethodologyDownload,
                StaticQmi,
            ],
            TypeFilter::CorporateInformation => &[
                StaticFoi,
                StaticPage,
                StaticLandingPage,
                StaticArticle,
            ],
            TypeFilter::Qmi => &[StaticQmi],
        }
    }

    /// Every filter a caller can select. The reserved `featured` group is
    /// excluded.
    pub fn all() -> Vec<TypeFilter> {
        TypeFilter::ALL
            .into_iter()
            .filter(|f| *f != TypeFilter::Featured)
            .collect()
    }

    /// Parse a list of filter names.
    ///
    /// Fails on the first unknown name, reporting that name.
    pub fn from_names<I, S>(names: I) -> Result<Vec<TypeFilter>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| n.as_ref().parse()).collect()
    }
}

/// Content types covered by a set of filters, deduplicated, first-seen order.
pub fn content_types_of(filters: &[TypeFilter]) -> Vec<ContentType> {
    let mut types: Vec<ContentType> = Vec::new();
    for ct in filters.iter().flat_map(|f| f.content_types()) {
        if !types.contains(ct) {
            types.push(*ct);
        }
    }
    types
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        TypeFilter::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| Error::unknown_type_filter(s))
    }
}

// ============================================================================
// Tests
// ============================================================================
