use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::PathsConfig;
use crate::core::{AuditDiff, AuditReport};

/// Diff the with-overrides and without-overrides audit snapshots, persist the
/// diff report, and append the decision line to the output channel.
pub fn run(
    root: &Path,
    paths: &PathsConfig,
    output_channel: &Path,
    quiet: bool,
) -> Result<AuditDiff> {
    let with_overrides = read_report(&root.join(&paths.audit_with));
    let without_overrides = read_report(&root.join(&paths.audit_without));

    let diff = AuditDiff::between(&with_overrides, &without_overrides);
    let text = diff.render_text();

    let report_path = root.join(&paths.diff_report);
    std::fs::write(&report_path, &text)
        .with_context(|| format!("failed to write diff report: {}", report_path.display()))
        .map_err(crate::exit::file_failed_err)?;

    if !quiet {
        println!("{text}");
    }

    append_decision(output_channel, diff.can_remove_overrides())?;

    Ok(diff)
}

/// A missing or unparseable snapshot degrades to an empty report; the diff
/// itself never fails on bad input.
fn read_report(path: &Path) -> AuditReport {
    let Ok(text) = std::fs::read_to_string(path) else {
        return AuditReport::default();
    };
    serde_json::from_str(&text).unwrap_or_default()
}

/// Appends exactly one `can_remove_overrides=` line. The channel is shared
/// with other workflow steps, so prior lines must survive.
fn append_decision(output_channel: &Path, decision: bool) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_channel)
        .with_context(|| {
            format!(
                "failed to open output channel: {}",
                output_channel.display()
            )
        })
        .map_err(crate::exit::invalid_args_err)?;
    file.write_all(format!("can_remove_overrides={decision}\n").as_bytes())
        .with_context(|| {
            format!(
                "failed to append to output channel: {}",
                output_channel.display()
            )
        })
        .map_err(crate::exit::invalid_args_err)?;
    Ok(())
}
