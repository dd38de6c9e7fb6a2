//! List types and their default type filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::type_filter::TypeFilter;

/// A search results listing.
///
/// Each listing restricts results to a default set of type filters when
/// the caller does not supply any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// All content.
    #[default]
    Ons,
    /// Data listings.
    OnsData,
    /// Publication listings.
    OnsPublications,
}

impl ListType {
    /// Name used in routes and requests.
    pub fn name(&self) -> &'static str {
        match self {
            ListType::Ons => "ons",
            ListType::OnsData => "onsdata",
            ListType::OnsPublications => "onspublications",
        }
    }

    /// Filters applied when the request names none.
    pub fn default_type_filters(&self) -> Vec<TypeFilter> {
        match self {
            ListType::Ons => TypeFilter::all(),
            ListType::OnsData => vec![
                TypeFilter::Timeseries,
                TypeFilter::Datasets,
                TypeFilter::UserRequestedData,
            ],
            ListType::OnsPublications => vec![
                TypeFilter::Bulletin,
                TypeFilter::Article,
                TypeFilter::Methodology,
                TypeFilter::CorporateInformation,
            ],
        }
    }

    /// Resolve request filter names, falling back to this list's defaults.
    pub fn type_filters<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<TypeFilter>> {
        if names.is_empty() {
            Ok(self.default_type_filters())
        } else {
            TypeFilter::from_names(names)
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ons" => Ok(ListType::Ons),
            "onsdata" => Ok(ListType::OnsData),
            "onspublications" => Ok(ListType::OnsPublications),
            _ => Err(Error::UnknownListType {
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
    fn test_parse() {
        assert_eq!("onsdata".parse::<ListType>().unwrap(), ListType::OnsData);
        assert!("onsnope".parse::<ListType>().unwrap_err().is_client_error());
    }

    #[test]
    fn test_defaults_used_when_empty() {
        let empty: [&str; 0] = [];
        let filters = ListType::OnsPublications.type_filters(&empty).unwrap();
        assert!(filters.contains(&TypeFilter::Bulletin));
        assert!(!filters.contains(&TypeFilter::Timeseries));
    }

    #[test]
    fn test_explicit_filters_override_defaults() {
        let filters = ListType::Ons.type_filters(&["qmi"]).unwrap();
        assert_eq!(filters, vec![TypeFilter::Qmi]);
    }

    #[test]
    fn test_unknown_explicit_filter() {
        assert!(ListType::Ons.type_filters(&["bogus_type"]).is_err());
    }
}
