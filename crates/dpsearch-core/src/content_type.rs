//! Content types stored in the index.
//!
//! Each content type is identified in the index by a type marker (see
//! [`fields::TYPE`](crate::fields::TYPE)) and carries a weight used when
//! boosting results by type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A content type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Statistical bulletin.
    Bulletin,
    /// Article.
    Article,
    /// Article published as a download.
    ArticleDownload,
    /// Time series.
    Timeseries,
    /// Landing page of a compendium.
    CompendiumLandingPage,
    /// Ad hoc user requested data.
    StaticAdhoc,
    /// Dataset landing page.
    DatasetLandingPage,
    /// Methodology page.
    StaticMethodology,
    /// Methodology published as a download.
    StaticMethodologyDownload,
    /// Quality and methodology information.
    StaticQmi,
    /// Time series dataset.
    TimeseriesDataset,
    /// Dataset.
    Dataset,
    /// Compendium data.
    CompendiumData,
    /// Compendium chapter.
    CompendiumChapter,
    /// Freedom of information request.
    StaticFoi,
    /// Static page.
    StaticPage,
    /// Static landing page.
    StaticLandingPage,
    /// Static article.
    StaticArticle,
    /// Product (topic) page.
    ProductPage,
    /// Census home page.
    HomePageCensus,
    /// Reference tables.
    ReferenceTables,
}

impl ContentType {
    /// Every content type, in index declaration order.
    pub const ALL: [ContentType; 21] = [
        ContentType::Bulletin,
        ContentType::Article,
        ContentType::ArticleDownload,
        ContentType::Timeseries,
        ContentType::CompendiumLandingPage,
        ContentType::StaticAdhoc,
        ContentType::DatasetLandingPage,
        ContentType::StaticMethodology,
        ContentType::StaticMethodologyDownload,
        ContentType::StaticQmi,
        ContentType::TimeseriesDataset,
        ContentType::Dataset,
        ContentType::CompendiumData,
        ContentType::CompendiumChapter,
        ContentType::StaticFoi,
        ContentType::StaticPage,
        ContentType::StaticLandingPage,
        ContentType::StaticArticle,
        ContentType::ProductPage,
        ContentType::HomePageCensus,
        ContentType::ReferenceTables,
    ];

    /// Type marker stored in the index; also the type name hits report.
    pub fn name(&self) -> &'static str {
        match self {
            ContentType::Bulletin => "bulletin",
            ContentType::Article => "article",
            ContentType::ArticleDownload => "article_download",
            ContentType::Timeseries => "timeseries",
            ContentType::CompendiumLandingPage => "compendium_landing_page",
            ContentType::StaticAdhoc => "static_adhoc",
            ContentType::DatasetLandingPage => "dataset_landing_page",
            ContentType::StaticMethodology => "static_methodology",
            ContentType::StaticMethodologyDownload => "static_methodology_download",
            ContentType::StaticQmi => "static_qmi",
            ContentType::TimeseriesDataset => "timeseries_dataset",
            ContentType::Dataset => "dataset",
            ContentType::CompendiumData => "compendium_data",
            ContentType::CompendiumChapter => "compendium_chapter",
            ContentType::StaticFoi => "static_foi",
            ContentType::StaticPage => "static_page",
            ContentType::StaticLandingPage => "static_landing_page",
            ContentType::StaticArticle => "static_article",
            ContentType::ProductPage => "product_page",
            ContentType::HomePageCensus => "home_page_census",
            ContentType::ReferenceTables => "reference_tables",
        }
    }

    /// Weight applied by the per-type score functions.
    pub fn weight(&self) -> f32 {
        match self {
            ContentType::Bulletin => 1.55,
            ContentType::Article | ContentType::ArticleDownload => 1.30,
            ContentType::CompendiumLandingPage => 1.30,
            ContentType::DatasetLandingPage => 1.35,
            ContentType::StaticAdhoc => 1.25,
            ContentType::Timeseries => 1.20,
            ContentType::ProductPage => 1.10,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|ct| ct.name() == s)
            .ok_or(())
    }
}
