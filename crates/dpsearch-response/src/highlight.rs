//! Highlight substitution.
//!
//! The backend returns highlighted fragments separately from the stored
//! document, keyed by field path. [`Highlighter`] splices each fragment back
//! into the document in place of the value it was produced from.
//!
//! Field paths resolve against the document in one of two ways:
//!
//! - a top-level key present in the document is replaced outright
//! - `description.<field>` descends one level into the description object
//!
//! Inside the description a sequence field has the element equal to the
//! fragment's original text replaced; any other value is overwritten. Paths
//! nested deeper, paths under other parents and paths the document has no
//! slot for are [`Error::FieldMapping`] errors: they mean the requested
//! highlight fields and the document layout disagree.

use serde_json::{Map, Value};

use dpsearch_core::{Error, Result};

/// Parent object that highlight paths may descend into.
pub const DESCRIPTION_FIELD: &str = "description";

/// Deepest supported path, counted in `.`-separated segments.
pub const MAX_PATH_DEPTH: usize = 2;

/// Splices `<tag>…</tag>` fragments into stored documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    open_tag: String,
    close_tag: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new("strong")
    }
}

impl Highlighter {
    /// Highlighter for `<tag>…</tag>`.
    pub fn new(tag: &str) -> Self {
        Self {
            open_tag: format!("<{tag}>"),
            close_tag: format!("</{tag}>"),
        }
    }

    /// Opening tag.
    pub fn open_tag(&self) -> &str {
        &self.open_tag
    }

    /// Closing tag.
    pub fn close_tag(&self) -> &str {
        &self.close_tag
    }

    /// Text enclosed by the first tag pair in `fragment`, trimmed.
    ///
    /// `None` when the fragment has no complete tag pair.
    pub fn original_text<'a>(&self, fragment: &'a str) -> Option<&'a str> {
        let start = fragment.find(&self.open_tag)? + self.open_tag.len();
        let end = start + fragment[start..].find(&self.close_tag)?;
        Some(fragment[start..end].trim())
    }

    /// `fragment` with every tag removed.
    pub fn strip_tags(&self, fragment: &str) -> String {
        fragment
            .replace(&self.open_tag, "")
            .replace(&self.close_tag, "")
    }

    /// Apply every fragment in `highlight` to `document`.
    ///
    /// Fragments without a tag pair are skipped.
    pub fn apply<'a, I, F>(&self, document: &mut Map<String, Value>, highlight: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, F)>,
        F: IntoIterator<Item = &'a String>,
    {
        for (field, fragments) in highlight {
            for fragment in fragments {
                if let Some(original) = self.original_text(fragment) {
                    let stripped = self.strip_tags(fragment);
                    set_value(document, field, &[original, stripped.as_str()], fragment)?;
                }
            }
        }
        Ok(())
    }
}

/// Replace the value at `path` with `new_value`.
///
/// Inside a sequence the first element equal to one of `originals` (tried
/// in order) is replaced; if none matches the sequence is left alone.
pub fn set_value(
    document: &mut Map<String, Value>,
    path: &str,
    originals: &[&str],
    new_value: &str,
) -> Result<()> {
    if let Some(slot) = document.get_mut(path) {
        *slot = Value::String(new_value.to_string());
        return Ok(());
    }

    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() > MAX_PATH_DEPTH {
        return Err(Error::field_mapping(
            path,
            format!("paths deeper than {MAX_PATH_DEPTH} segments are not supported"),
        ));
    }

    match segments.as_slice() {
        [DESCRIPTION_FIELD, field] => {
            let description = document
                .get_mut(DESCRIPTION_FIELD)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| Error::field_mapping(path, "document has no description object"))?;
            set_description_element(description, path, field, originals, new_value)
        }
        [_, _] => Err(Error::field_mapping(
            path,
            format!("only '{DESCRIPTION_FIELD}' fields can be addressed by path"),
        )),
        _ => Err(Error::field_mapping(path, "field not present in document")),
    }
}

fn set_description_element(
    description: &mut Map<String, Value>,
    path: &str,
    field: &str,
    originals: &[&str],
    new_value: &str,
) -> Result<()> {
    let slot = description
        .get_mut(field)
        .ok_or_else(|| Error::field_mapping(path, "field not present in description"))?;

    match slot {
        Value::Array(items) => {
            let position = originals
                .iter()
                .find_map(|o| items.iter().position(|item| item.as_str() == Some(o)));
            if let Some(idx) = position {
                items[idx] = Value::String(new_value.to_string());
            }
        }
        other => *other = Value::String(new_value.to_string()),
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
