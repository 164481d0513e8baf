//! Model Selector: turns whatever catalog the provider reports into an ordered
//! list of `gemini-<version>-flash` candidates, newest first.
//!
//! Pure except for `discover_candidates`, which fetches the catalog and degrades
//! any listing failure to the fixed fallback list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::CompletionBackend;

/// Matches `gemini-2-flash`, `gemini-2.5-flash`, `gemini-2.5.1-flash`. Anchored both ends.
static FLASH_MODEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^gemini-(\d+(?:\.\d+)*)-flash$").expect("flash model pattern is valid")
});

/// Historical flash tiers, newest first. Used when discovery yields nothing.
pub const FALLBACK_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.1-flash",
    "gemini-1.5-flash",
    "gemini-1.0-flash",
];

/// Catalog keys checked, in order, for an entry's model name.
const NAME_KEYS: &[&str] = &["name", "id", "model"];

/// Resource prefix the REST catalog puts in front of model ids.
const RESOURCE_PREFIX: &str = "models/";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A catalog name that passed the flash pattern, with its parsed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub version: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Discovered,
    Fallback,
}

/// Ordered model names to try, plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateList {
    pub models: Vec<String>,
    pub source: CandidateSource,
}

impl CandidateList {
    pub fn fallback() -> Self {
        CandidateList {
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            source: CandidateSource::Fallback,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Matching
// ────────────────────────────────────────────────────────────────────────────

/// Returns true if `name` is exactly `gemini-<dotted digits>-flash`.
pub fn is_flash_model(name: &str) -> bool {
    FLASH_MODEL_PATTERN.is_match(name)
}

/// Parses `name` into a descriptor, or `None` if it is not a flash model.
///
/// A version group that does not fit in a `u64` makes the whole version `[0]`,
/// which sorts it after every well-formed match.
pub fn parse_descriptor(name: &str) -> Option<ModelDescriptor> {
    let caps = FLASH_MODEL_PATTERN.captures(name)?;
    let version = caps[1]
        .split('.')
        .map(|group| group.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|_| vec![0]);

    Some(ModelDescriptor {
        name: name.to_string(),
        version,
    })
}

/// Derives a model name from an opaque catalog entry.
///
/// Strategies, first non-empty wins: the `name`, `id`, or `model` key of an
/// object; the string itself; the JSON text of any other scalar. The REST
/// `models/` resource prefix is stripped.
pub fn entry_name(entry: &Value) -> Option<String> {
    match entry {
        Value::Object(map) => NAME_KEYS
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find_map(normalize_name),
        Value::String(s) => normalize_name(s),
        Value::Null => None,
        Value::Array(_) => None,
        scalar => normalize_name(&scalar.to_string()),
    }
}

/// Trims and strips the resource prefix; `None` if nothing is left.
fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix(RESOURCE_PREFIX).unwrap_or(trimmed);
    (!name.is_empty()).then(|| name.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Filters and ranks a catalog into a candidate list.
///
/// Matches are sorted by version descending; equal versions keep catalog order.
/// If nothing matches, the fixed fallback list is returned.
pub fn select_candidates(catalog: &[Value]) -> CandidateList {
    let mut matches: Vec<ModelDescriptor> = catalog
        .iter()
        .filter_map(entry_name)
        .filter_map(|name| parse_descriptor(&name))
        .collect();

    if matches.is_empty() {
        return CandidateList::fallback();
    }

    // `sort_by` is stable, so ties keep their catalog order.
    matches.sort_by(|a, b| b.version.cmp(&a.version));

    CandidateList {
        models: matches.into_iter().map(|d| d.name).collect(),
        source: CandidateSource::Discovered,
    }
}

/// Fetches the provider catalog and selects candidates from it.
/// A listing failure is logged and treated as an empty catalog.
pub async fn discover_candidates(backend: &dyn CompletionBackend, api_key: &str) -> CandidateList {
    let catalog = match backend.list_models(api_key).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Model discovery failed, using fallback list: {e}");
            Vec::new()
        }
    };

    let candidates = select_candidates(&catalog);
    match candidates.source {
        CandidateSource::Discovered => {
            info!("Discovered gemini flash models: {:?}", candidates.models)
        }
        CandidateSource::Fallback => {
            info!("Using fallback gemini flash models: {:?}", candidates.models)
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &CandidateList) -> Vec<&str> {
        list.models.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_orders_by_version_descending() {
        let catalog = vec![
            json!("gemini-1.5-flash"),
            json!("gemini-2.5-flash"),
            json!("gemini-2.1-flash"),
        ];
        let list = select_candidates(&catalog);
        assert_eq!(list.source, CandidateSource::Discovered);
        assert_eq!(
            names(&list),
            vec!["gemini-2.5-flash", "gemini-2.1-flash", "gemini-1.5-flash"]
        );
    }

    #[test]
    fn test_version_comparison_is_numeric_not_lexicographic() {
        let catalog = vec![json!("gemini-2.9-flash"), json!("gemini-2.10-flash")];
        let list = select_candidates(&catalog);
        assert_eq!(names(&list), vec!["gemini-2.10-flash", "gemini-2.9-flash"]);
    }

    #[test]
    fn test_longer_version_sorts_above_its_prefix() {
        let catalog = vec![json!("gemini-2-flash"), json!("gemini-2.0.1-flash")];
        let list = select_candidates(&catalog);
        assert_eq!(names(&list), vec!["gemini-2.0.1-flash", "gemini-2-flash"]);
    }

    #[test]
    fn test_non_matching_names_are_excluded() {
        let catalog = vec![
            json!("gemini-pro"),
            json!("text-bison-001"),
            json!("gemini-2.5-flash-8b"),
            json!("gemini-2.5-flash-lite"),
            json!("xgemini-2.5-flash"),
            json!("gemini-2.0-flash"),
        ];
        let list = select_candidates(&catalog);
        assert_eq!(names(&list), vec!["gemini-2.0-flash"]);
    }

    #[test]
    fn test_empty_catalog_uses_fallback() {
        let list = select_candidates(&[]);
        assert_eq!(list.source, CandidateSource::Fallback);
        assert_eq!(names(&list), FALLBACK_MODELS.to_vec());
    }

    #[test]
    fn test_catalog_without_matches_uses_fallback() {
        let list = select_candidates(&[json!("gemini-pro"), json!({"name": "embedding-001"})]);
        assert_eq!(list, CandidateList::fallback());
    }

    #[test]
    fn test_fallback_is_ordered_newest_first() {
        let versions: Vec<Vec<u64>> = FALLBACK_MODELS
            .iter()
            .map(|m| parse_descriptor(m).unwrap().version)
            .collect();
        let mut sorted = versions.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        // Same version reported twice under different keys; catalog order wins.
        let catalog = vec![
            json!({"id": "gemini-2.5-flash", "tag": "first"}),
            json!("gemini-1.5-flash"),
            json!({"model": "gemini-2.5-flash", "tag": "second"}),
        ];
        let list = select_candidates(&catalog);
        assert_eq!(
            names(&list),
            vec!["gemini-2.5-flash", "gemini-2.5-flash", "gemini-1.5-flash"]
        );
    }

    #[test]
    fn test_entry_name_strategies_in_order() {
        assert_eq!(
            entry_name(&json!({"name": "models/gemini-2.5-flash", "id": "ignored"})).as_deref(),
            Some("gemini-2.5-flash")
        );
        assert_eq!(
            entry_name(&json!({"name": "", "id": "gemini-1.5-flash"})).as_deref(),
            Some("gemini-1.5-flash")
        );
        assert_eq!(
            entry_name(&json!({"model": "gemini-2-flash"})).as_deref(),
            Some("gemini-2-flash")
        );
        assert_eq!(
            entry_name(&json!({"name": "models/", "id": "gemini-2.5-flash"})).as_deref(),
            Some("gemini-2.5-flash")
        );
        assert_eq!(entry_name(&json!(42)).as_deref(), Some("42"));
        assert_eq!(entry_name(&json!(null)), None);
        assert_eq!(entry_name(&json!({"displayName": "Gemini"})), None);
    }

    #[test]
    fn test_rest_catalog_entries_are_discovered() {
        let catalog = vec![
            json!({"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"]}),
            json!({"name": "models/gemini-2.5-flash"}),
            json!({"name": "models/text-embedding-004"}),
        ];
        let list = select_candidates(&catalog);
        assert_eq!(names(&list), vec!["gemini-2.5-flash", "gemini-1.5-flash"]);
    }

    #[test]
    fn test_overflowing_version_uses_sentinel_and_sorts_last() {
        let huge = "gemini-99999999999999999999999-flash";
        let descriptor = parse_descriptor(huge).unwrap();
        assert_eq!(descriptor.version, vec![0]);

        let list = select_candidates(&[json!(huge), json!("gemini-1.0-flash")]);
        assert_eq!(names(&list), vec!["gemini-1.0-flash", huge]);
    }

    #[test]
    fn test_is_flash_model() {
        assert!(is_flash_model("gemini-2-flash"));
        assert!(is_flash_model("gemini-2.5.1-flash"));
        assert!(!is_flash_model("gemini-.5-flash"));
        assert!(!is_flash_model("gemini-2.-flash"));
        assert!(!is_flash_model("models/gemini-2.5-flash"));
        assert!(!is_flash_model("gemini-2.5-flash "));
    }
}
