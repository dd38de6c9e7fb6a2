//! Handler functions for config CLI commands.
//!
//! Implements the `path`, `get`, `set`, `init` and `show` subcommands over
//! [`SearchConfig`], plus TOML dotted-key helpers.

use std::path::PathBuf;

use dpsearch_core::{Error, Result, SearchConfig};

use crate::cli::ConfigAction;

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => println!("{}", cmd_config_path(config_path)?),
        ConfigAction::Get { key } => println!("{}", cmd_config_get(config_path, &key)?),
        ConfigAction::Set { key, value } => {
            let path = cmd_config_set(config_path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
        }
        ConfigAction::Init { file, force } => {
            let path = cmd_config_init(file.as_deref(), force)?;
            println!("Config file created at {}", path.display());
        }
        ConfigAction::Show => print!("{}", cmd_config_show(config_path)?),
    }
    Ok(())
}

// ============================================================================
// Command handlers
// ============================================================================

/// The resolved config file path, with a hint when the file is missing.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<String> {
    let path = SearchConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    if !path.exists() {
        eprintln!(
            "(file does not exist, run `{} config init` to create it)",
            SearchConfig::project_name()
        );
    }
    Ok(path.display().to_string())
}

/// A configuration value by dotted key, formatted for display.
pub fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = SearchConfig::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set a value by dotted key in the config file and return the file path.
///
/// The edited file must still load as a valid [`SearchConfig`]; otherwise
/// nothing is written.
pub fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<PathBuf> {
    let path = SearchConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            SearchConfig::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    SearchConfig::from_toml_str(&toml_str)?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    log::debug!("Set {key} in {}", path.display());
    Ok(path)
}

/// Write a default configuration file and return its path.
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => SearchConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = SearchConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// The effective configuration as TOML.
pub fn cmd_config_show(config_path: Option<&str>) -> Result<String> {
    SearchConfig::load(config_path)?.to_toml_string()
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop().filter(|p| !p.is_empty()) else {
        return Err(Error::config("Empty key path"));
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value, auto-detecting the type.
///
/// Priority: bool, integer, float, string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_default(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SearchConfig::default().to_toml_string().unwrap()).unwrap();
        path.to_str().unwrap().to_string()
    }

    // ------------------------------------------------------------------------
    // cmd_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        let path = cmd_config_path(Some("/explicit/config.toml")).unwrap();
        assert_eq!(path, "/explicit/config.toml");
    }

    // ------------------------------------------------------------------------
    // cmd_config_get tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_get_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        assert_eq!(
            cmd_config_get(Some(&path), "search.results_per_page").unwrap(),
            "10"
        );
        assert_eq!(
            cmd_config_get(Some(&path), "search.highlight_tag").unwrap(),
            "strong"
        );
    }

    #[test]
    fn test_cmd_config_get_missing_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        let err = cmd_config_get(Some(&path), "nonexistent.key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_set tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_set_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        cmd_config_set(Some(&path), "search.highlight_tag", "em").unwrap();

        let config = SearchConfig::from_file(std::path::Path::new(&path)).unwrap();
        assert_eq!(config.search.highlight_tag, "em");
    }

    #[test]
    fn test_cmd_config_set_integer() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);

        cmd_config_set(Some(&path), "search.results_per_page", "25").unwrap();

        let config = SearchConfig::from_file(std::path::Path::new(&path)).unwrap();
        assert_eq!(config.search.results_per_page, 25);
    }

    #[test]
    fn test_cmd_config_set_rejects_invalid_result() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        let result = cmd_config_set(Some(&path), "search.results_per_page", "lots");
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_cmd_config_set_missing_file() {
        let err = cmd_config_set(Some("/nonexistent/config.toml"), "key", "value").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_init tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dpsearch").join("config.toml");

        cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[search]"));
        assert!(content.contains("[conceptual]"));
    }

    #[test]
    fn test_cmd_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = cmd_config_init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_cmd_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();

        cmd_config_init(Some(path.to_str().unwrap()), true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("results_per_page"));
    }

    #[test]
    fn test_cmd_config_show() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_default(&dir);
        let shown = cmd_config_show(Some(&path)).unwrap();
        assert_eq!(SearchConfig::from_toml_str(&shown).unwrap(), SearchConfig::default());
    }

    // ------------------------------------------------------------------------
    // Dotted-key helper tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_nested_value() {
        let val: toml::Value = toml::from_str("[search]\nresults_per_page = 10").unwrap();
        assert_eq!(
            get_nested_value(&val, "search.results_per_page"),
            Some(&toml::Value::Integer(10))
        );
        assert!(get_nested_value(&val, "search.nonexistent").is_none());
        assert!(get_nested_value(&val, "search.results_per_page.deeper").is_none());
    }

    #[test]
    fn test_set_nested_value_creates_tables() {
        let mut val: toml::Value = toml::from_str("").unwrap();
        set_nested_value(&mut val, "model.vectors_path", parse_value("/tmp/w.vec")).unwrap();
        assert_eq!(
            get_nested_value(&val, "model.vectors_path"),
            Some(&toml::Value::String("/tmp/w.vec".into()))
        );
    }

    #[test]
    fn test_set_nested_value_through_scalar_fails() {
        let mut val: toml::Value = toml::from_str("tag = \"em\"").unwrap();
        assert!(set_nested_value(&mut val, "tag.inner", parse_value("x")).is_err());
    }

    #[test]
    fn test_set_nested_value_empty_key() {
        let mut val: toml::Value = toml::from_str("").unwrap();
        assert!(set_nested_value(&mut val, "", parse_value("x")).is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("0.95"), toml::Value::Float(0.95));
        assert_eq!(parse_value("exp"), toml::Value::String("exp".into()));
    }

    #[test]
    fn test_format_toml_value() {
        assert_eq!(format_toml_value(&toml::Value::Integer(7)), "7");
        assert_eq!(format_toml_value(&toml::Value::String("gauss".into())), "gauss");
    }
}
