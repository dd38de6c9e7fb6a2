//! Handlers for the `query`, `search` and `spell` subcommands.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use dpsearch_client::{MockBackend, MockDocument, SearchEngine, SearchParams};
use dpsearch_core::{Error, ListType, Result, SearchConfig, SortField};
use dpsearch_ml::{EmbeddingModel, InMemoryModel};
use dpsearch_query::SearchRequest;

use crate::cli::QueryArgs;

/// One entry of a `--documents` file.
#[derive(Debug, Deserialize)]
struct DocumentEntry {
    id: String,
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(default)]
    source: Map<String, Value>,
}

// ============================================================================
// Setup
// ============================================================================

/// Load the configured model; `vectors` overrides `model.vectors_path`.
///
/// `None` when no vectors are configured.
pub fn load_model(
    config: &SearchConfig,
    vectors: Option<&str>,
) -> Result<Option<Arc<dyn EmbeddingModel>>> {
    let vectors_path = vectors
        .map(Path::new)
        .or(config.model.vectors_path.as_deref());
    let Some(vectors_path) = vectors_path else {
        log::debug!("No word vectors configured");
        return Ok(None);
    };
    let model: Arc<dyn EmbeddingModel> = Arc::new(InMemoryModel::load(
        vectors_path,
        config.model.labels_path.as_deref(),
    )?);
    Ok(Some(model))
}

/// Engine over `backend`, with `model` when one is loaded.
pub fn build_engine(
    config: &SearchConfig,
    backend: Arc<MockBackend>,
    model: Option<Arc<dyn EmbeddingModel>>,
) -> SearchEngine {
    let engine = SearchEngine::new(backend, config.clone());
    match model {
        Some(model) => engine.with_model(model),
        None => engine,
    }
}

/// Search parameters from command-line arguments.
pub fn search_params(args: &QueryArgs) -> Result<SearchParams> {
    let sort: SortField = args.sort.parse()?;
    let list_type: ListType = args.list_type.parse()?;
    let mut params = SearchParams::new(args.term.as_str())
        .with_page(args.page)
        .with_sort(sort)
        .with_type_filters(args.filters.iter().map(String::as_str))
        .with_list_type(list_type);
    if let Some(size) = args.size {
        params = params.with_page_size(size);
    }
    Ok(params)
}

/// Read a JSON array of documents.
pub fn load_documents(path: &Path) -> Result<Vec<MockDocument>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let entries: Vec<DocumentEntry> = serde_json::from_str(&content)?;
    log::info!("Loaded {} documents from {}", entries.len(), path.display());
    Ok(entries
        .into_iter()
        .map(|e| MockDocument {
            id: e.id,
            doc_type: e.doc_type,
            source: e.source,
        })
        .collect())
}

// ============================================================================
// Commands
// ============================================================================

/// The content request composed for `args`.
pub fn cmd_query(engine: &SearchEngine, args: &QueryArgs) -> Result<SearchRequest> {
    engine.build_content_request(&search_params(args)?)
}

/// The combined search result for `args`, as pretty JSON.
pub async fn cmd_search(engine: &SearchEngine, args: &QueryArgs) -> Result<String> {
    let result = engine.search_all(&search_params(args)?).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Spelling suggestions for `terms`, as pretty JSON.
pub fn cmd_spell(engine: &SearchEngine, terms: &[String]) -> Result<String> {
    let suggestions = engine.spelling_suggestions(&terms.join(" "));
    Ok(serde_json::to_string_pretty(&suggestions)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(term: &str) -> QueryArgs {
        QueryArgs {
            term: term.to_string(),
            page: 1,
            size: None,
            sort: "relevance".to_string(),
            filters: Vec::new(),
            list_type: "ons".to_string(),
        }
    }

    fn engine() -> SearchEngine {
        build_engine(&SearchConfig::default(), Arc::new(MockBackend::new()), None)
    }

    #[test]
    fn test_search_params_from_args() {
        let mut a = args("gdp");
        a.page = 2;
        a.size = Some(5);
        a.sort = "title_asc".into();
        a.filters = vec!["bulletin".into()];
        a.list_type = "onspublications".into();

        let params = search_params(&a).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.page_size, Some(5));
        assert_eq!(params.sort_by, SortField::TitleAsc);
        assert_eq!(params.type_filters, vec!["bulletin".to_string()]);
        assert_eq!(params.list_type, ListType::OnsPublications);
    }

    #[test]
    fn test_search_params_unknown_sort() {
        let mut a = args("gdp");
        a.sort = "popularity".into();
        assert!(matches!(
            search_params(&a).unwrap_err(),
            Error::UnknownSortField { .. }
        ));
    }

    #[test]
    fn test_cmd_query_composes_request() {
        let mut a = args("cpi");
        a.page = 3;
        let request = cmd_query(&engine(), &a).unwrap();
        let json = request.to_json();
        assert_eq!(json["from"], 20);
        assert_eq!(json["size"], 10);
    }

    #[test]
    fn test_cmd_query_rejects_bad_page() {
        let mut a = args("cpi");
        a.page = 0;
        assert!(matches!(
            cmd_query(&engine(), &a).unwrap_err(),
            Error::InvalidPage { .. }
        ));
    }

    #[test]
    fn test_load_model_without_vectors() {
        assert!(load_model(&SearchConfig::default(), None).unwrap().is_none());
    }

    #[test]
    fn test_cmd_spell_with_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "3 2").unwrap();
        writeln!(file, "the 0.1 0.2").unwrap();
        writeln!(file, "inflation 0.3 0.4").unwrap();
        writeln!(file, "rate 0.5 0.6").unwrap();
        let model = load_model(&SearchConfig::default(), file.path().to_str())
            .unwrap()
            .unwrap();

        let engine = build_engine(&SearchConfig::default(), Arc::new(MockBackend::new()), Some(model));
        let json: Value =
            serde_json::from_str(&cmd_spell(&engine, &["inflaton".to_string()]).unwrap()).unwrap();
        assert_eq!(json[0]["input"], "inflaton");
        assert_eq!(json[0]["correction"], "inflation");
    }

    #[test]
    fn test_cmd_spell_without_model() {
        let out = cmd_spell(&engine(), &["inflaton".to_string()]).unwrap();
        assert_eq!(out, "[]");
    }

    #[tokio::test]
    async fn test_cmd_search_over_documents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "1", "type": "bulletin",
                  "source": {{"description": {{"title": "Consumer price inflation"}}}}}},
                {{"id": "2", "type": "article",
                  "source": {{"description": {{"title": "Population estimates"}}}}}}
            ]"#
        )
        .unwrap();
        let documents = load_documents(file.path()).unwrap();
        assert_eq!(documents.len(), 2);

        let engine = build_engine(
            &SearchConfig::default(),
            Arc::new(MockBackend::with_documents(documents)),
            None,
        );
        let out = cmd_search(&engine, &args("inflation")).await.unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["content"]["numberOfResults"], 1);
        assert_eq!(json["counts"]["docCounts"]["bulletin"], 1);
    }

    #[test]
    fn test_load_documents_missing_file() {
        let err = load_documents(Path::new("/nonexistent/docs.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
