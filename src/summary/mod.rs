use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::EffectiveConfig;
use crate::core::{RemovedOverrides, encode_uri_component, package_name};

#[derive(Debug, Clone, Default)]
pub struct ChangedFiles {
    pub unstaged: Vec<String>,
    pub staged: Vec<String>,
    pub error: Option<String>,
}

/// Render the markdown summary from the removed-overrides record and the git
/// changed-file lists, and write it to the configured summary path.
pub fn run(
    root: &Path,
    cfg: &EffectiveConfig,
    timeout: Duration,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    let record = read_record(&root.join(&cfg.paths.removed_record));
    let changed = query_changed_files(root, timeout);
    if verbose && let Some(err) = &changed.error {
        eprintln!("changed-file query failed: {err}");
    }

    let markdown = render(record.as_ref(), &changed, cfg);

    let summary_path = root.join(&cfg.paths.summary);
    std::fs::write(&summary_path, markdown)
        .with_context(|| format!("failed to write summary: {}", summary_path.display()))
        .map_err(crate::exit::file_failed_err)?;

    if !quiet {
        println!("Generated override removal summary");
    }
    Ok(())
}

/// The record is optional input: absent or malformed both mean "no removed
/// overrides to report".
fn read_record(path: &Path) -> Option<RemovedOverrides> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn query_changed_files(root: &Path, timeout: Duration) -> ChangedFiles {
    let unstaged = crate::vcs::changed_files(root, timeout);
    let staged = crate::vcs::staged_files(root, timeout);
    match (unstaged, staged) {
        (Ok(unstaged), Ok(staged)) => ChangedFiles {
            unstaged,
            staged,
            error: None,
        },
        (Err(err), _) | (_, Err(err)) => ChangedFiles {
            unstaged: vec![],
            staged: vec![],
            error: Some(err.to_string()),
        },
    }
}

pub fn render(
    record: Option<&RemovedOverrides>,
    changed: &ChangedFiles,
    cfg: &EffectiveConfig,
) -> String {
    let mut summary = String::from("# pnpm Overrides Management Summary\n\n");
    summary.push_str(
        "The following changes occurred after managing pnpm overrides and running `pnpm audit --fix`:\n\n",
    );

    if let Some(record) = record
        && !record.is_empty()
    {
        summary.push_str("## Previously Removed Overrides\n\n");
        summary
            .push_str("These overrides were temporarily removed to test if they're still necessary:\n\n");

        let sections = [
            (&cfg.paths.manifest, &record.package_json),
            (&cfg.paths.workspace, &record.workspace),
        ];
        for (origin, data) in sections {
            if data.is_empty() {
                continue;
            }
            let _ = writeln!(summary, "### From {origin}:\n");
            for (key, version) in data {
                let name = package_name(key);
                let _ = writeln!(
                    summary,
                    "- [`{key}`]({}{}): `{version}`",
                    cfg.registry.base_url,
                    encode_uri_component(&name)
                );
            }
            summary.push('\n');
        }
    }

    summary.push_str("## Changed Files\n\n");
    if changed.error.is_some() {
        summary.push_str("Error getting changed files\n");
    } else {
        if !changed.unstaged.is_empty() {
            summary.push_str(&changed.unstaged.join("\n"));
            summary.push('\n');
        }
        if !changed.staged.is_empty() {
            summary.push_str(&changed.staged.join("\n"));
            summary.push('\n');
        }
    }

    summary.push_str("\n## Summary\n\n");
    summary.push_str("- Removed overrides from configuration files\n");
    summary.push_str("- Ran `pnpm install` to update lockfile\n");
    summary.push_str("- Ran `pnpm audit --fix` to apply available fixes\n\n");
    summary.push_str(
        "This suggests that the overrides are no longer necessary as pnpm can now resolve dependencies and fix vulnerabilities without them.\n",
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OverrideMap;

    fn cfg() -> EffectiveConfig {
        EffectiveConfig::default()
    }

    fn record_with(entries: &[(&str, &str)]) -> RemovedOverrides {
        let mut map = OverrideMap::new();
        for (key, version) in entries {
            map.insert((*key).to_string(), (*version).to_string());
        }
        RemovedOverrides {
            package_json: map,
            workspace: OverrideMap::new(),
        }
    }

    #[test]
    fn scoped_package_link_is_percent_encoded() {
        let record = record_with(&[("@types/node", "^18.0.0")]);
        let markdown = render(Some(&record), &ChangedFiles::default(), &cfg());
        assert!(markdown.contains("https://npmjs.com/package/%40types%2Fnode"));
        assert!(markdown.contains("- [`@types/node`](https://npmjs.com/package/%40types%2Fnode): `^18.0.0`"));
    }

    #[test]
    fn versioned_key_links_to_the_normalized_name() {
        let record = record_with(&[("lodash@4.17.21", "^4.17.21")]);
        let markdown = render(Some(&record), &ChangedFiles::default(), &cfg());
        assert!(markdown.contains("(https://npmjs.com/package/lodash)"));
        assert!(markdown.contains("[`lodash@4.17.21`]"));
    }

    #[test]
    fn no_record_omits_the_removed_overrides_section() {
        let markdown = render(None, &ChangedFiles::default(), &cfg());
        assert!(!markdown.contains("## Previously Removed Overrides"));
        assert!(markdown.contains("# pnpm Overrides Management Summary"));
        assert!(markdown.contains("## Changed Files"));
        assert!(markdown.contains("## Summary"));
    }

    #[test]
    fn empty_record_omits_the_removed_overrides_section() {
        let record = RemovedOverrides::default();
        let markdown = render(Some(&record), &ChangedFiles::default(), &cfg());
        assert!(!markdown.contains("## Previously Removed Overrides"));
    }

    #[test]
    fn only_non_empty_origins_get_a_subsection() {
        let record = record_with(&[("lodash", "^4.17.21")]);
        let markdown = render(Some(&record), &ChangedFiles::default(), &cfg());
        assert!(markdown.contains("### From package.json:"));
        assert!(!markdown.contains("### From pnpm-workspace.yaml:"));
    }

    #[test]
    fn git_failure_becomes_an_inline_note() {
        let changed = ChangedFiles {
            unstaged: vec![],
            staged: vec![],
            error: Some("git diff failed".to_string()),
        };
        let markdown = render(None, &changed, &cfg());
        assert!(markdown.contains("Error getting changed files"));
    }

    #[test]
    fn unstaged_paths_come_before_staged_paths() {
        let changed = ChangedFiles {
            unstaged: vec!["package.json".to_string()],
            staged: vec!["pnpm-lock.yaml".to_string()],
            error: None,
        };
        let markdown = render(None, &changed, &cfg());
        let unstaged_at = markdown.find("package.json\n").expect("unstaged listed");
        let staged_at = markdown.find("pnpm-lock.yaml\n").expect("staged listed");
        assert!(unstaged_at < staged_at);
    }
}
