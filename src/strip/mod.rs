use std::path::Path;

use anyhow::{Context, Result};

use crate::config::PathsConfig;
use crate::core::{OverrideMap, RemovedOverrides};

const OVERRIDES_KEY: &str = "overrides";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripOutcome {
    pub manifest_modified: bool,
    pub workspace_modified: bool,
    pub removed: RemovedOverrides,
}

/// Remove the `overrides` key from the manifest and the workspace document,
/// recording whatever was removed. The manifest is mandatory input; the
/// workspace document is optional and a malformed one only produces a
/// warning.
pub fn run(root: &Path, paths: &PathsConfig, quiet: bool, verbose: bool) -> Result<StripOutcome> {
    let mut outcome = StripOutcome::default();

    let manifest_path = root.join(&paths.manifest);
    let manifest_text = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read manifest: {}", manifest_path.display()))
        .map_err(crate::exit::file_failed_err)?;
    let mut manifest: serde_json::Value = serde_json::from_str(&manifest_text)
        .with_context(|| format!("failed to parse manifest: {}", manifest_path.display()))
        .map_err(crate::exit::file_failed_err)?;

    if let Some(obj) = manifest.as_object_mut()
        && let Some(removed) = obj.shift_remove(OVERRIDES_KEY)
    {
        outcome.removed.package_json = json_override_map(&removed);
        let mut text = serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")
            .map_err(crate::exit::file_failed_err)?;
        text.push('\n');
        std::fs::write(&manifest_path, text)
            .with_context(|| format!("failed to write manifest: {}", manifest_path.display()))
            .map_err(crate::exit::file_failed_err)?;
        outcome.manifest_modified = true;
    }

    let workspace_path = root.join(&paths.workspace);
    if workspace_path.exists() {
        match strip_workspace(&workspace_path) {
            Ok(Some(removed)) => {
                outcome.removed.workspace = removed;
                outcome.workspace_modified = true;
            }
            Ok(None) => {}
            Err(err) => {
                eprintln!("Warning: could not parse {}: {err:#}", paths.workspace);
            }
        }
    }

    if outcome.manifest_modified || outcome.workspace_modified {
        let record_path = root.join(&paths.removed_record);
        let mut text = serde_json::to_string_pretty(&outcome.removed)
            .context("failed to serialize removed-overrides record")
            .map_err(crate::exit::file_failed_err)?;
        text.push('\n');
        std::fs::write(&record_path, text)
            .with_context(|| {
                format!(
                    "failed to write removed-overrides record: {}",
                    record_path.display()
                )
            })
            .map_err(crate::exit::file_failed_err)?;

        if !quiet {
            if outcome.manifest_modified {
                println!("Removed overrides from {}", paths.manifest);
                if verbose {
                    for (key, version) in &outcome.removed.package_json {
                        println!("  {key}: {version}");
                    }
                }
            }
            if outcome.workspace_modified {
                println!("Removed overrides from {}", paths.workspace);
                if verbose {
                    for (key, version) in &outcome.removed.workspace {
                        println!("  {key}: {version}");
                    }
                }
            }
        }
    } else if !quiet {
        println!(
            "No overrides found in {} or {}",
            paths.manifest, paths.workspace
        );
    }

    Ok(outcome)
}

/// Returns the removed override map, or `None` when the document has no
/// top-level `overrides` key. Any read, parse, or write problem is an error
/// for the caller to downgrade.
fn strip_workspace(path: &Path) -> Result<Option<OverrideMap>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut doc: serde_norway::Value = serde_norway::from_str(&text).context("invalid YAML")?;

    let Some(mapping) = doc.as_mapping_mut() else {
        return Ok(None);
    };
    let key = serde_norway::Value::String(OVERRIDES_KEY.to_string());
    let Some(removed) = mapping.shift_remove(&key) else {
        return Ok(None);
    };

    let rendered = serde_norway::to_string(&doc).context("failed to serialize YAML")?;
    std::fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(Some(yaml_override_map(&removed)))
}

fn json_override_map(value: &serde_json::Value) -> OverrideMap {
    let mut map = OverrideMap::new();
    if let Some(obj) = value.as_object() {
        for (key, val) in obj {
            let spec = match val.as_str() {
                Some(s) => s.to_string(),
                None => val.to_string(),
            };
            map.insert(key.clone(), spec);
        }
    }
    map
}

fn yaml_override_map(value: &serde_norway::Value) -> OverrideMap {
    let mut map = OverrideMap::new();
    if let Some(mapping) = value.as_mapping() {
        for (key, val) in mapping {
            let Some(key) = key.as_str() else { continue };
            let spec = match val.as_str() {
                Some(s) => s.to_string(),
                None => serde_norway::to_string(val)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_default(),
            };
            map.insert(key.to_string(), spec);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_override_map_keeps_string_specifiers() {
        let value = serde_json::json!({"lodash": "^4.17.21", "@types/node": "^18.0.0"});
        let map = json_override_map(&value);
        assert_eq!(map.get("lodash").map(String::as_str), Some("^4.17.21"));
        assert_eq!(
            map.get("@types/node").map(String::as_str),
            Some("^18.0.0")
        );
    }

    #[test]
    fn json_override_map_renders_nested_specifiers_as_compact_json() {
        let value = serde_json::json!({"foo": {"bar": ">=1.0.0"}});
        let map = json_override_map(&value);
        assert_eq!(
            map.get("foo").map(String::as_str),
            Some(r#"{"bar":">=1.0.0"}"#)
        );
    }

    #[test]
    fn json_override_map_of_non_object_is_empty() {
        assert!(json_override_map(&serde_json::json!("^1.0.0")).is_empty());
        assert!(json_override_map(&serde_json::json!(null)).is_empty());
    }

    #[test]
    fn yaml_override_map_keeps_string_specifiers() {
        let value: serde_norway::Value =
            serde_norway::from_str("lodash: ^4.17.21\nminimist: '>=1.2.6'\n").expect("parse");
        let map = yaml_override_map(&value);
        assert_eq!(map.get("lodash").map(String::as_str), Some("^4.17.21"));
        assert_eq!(map.get("minimist").map(String::as_str), Some(">=1.2.6"));
    }

    #[test]
    fn yaml_override_map_skips_non_string_keys() {
        let value: serde_norway::Value = serde_norway::from_str("1: a\nfoo: b\n").expect("parse");
        let map = yaml_override_map(&value);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("foo").map(String::as_str), Some("b"));
    }
}
