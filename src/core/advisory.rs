use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

/// One vulnerability entry from an audit report. Extra fields in the report
/// are ignored; only the fingerprint inputs matter here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Advisory {
    pub module_name: String,
    pub vulnerable_versions: String,
}

impl Advisory {
    /// Stable comparison key. Advisory identifiers are not stable across
    /// report regenerations; module + vulnerable range is.
    pub fn fingerprint(&self) -> String {
        format!("{}@{}", self.module_name, self.vulnerable_versions)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub advisories: BTreeMap<String, Advisory>,
}

impl AuditReport {
    pub fn fingerprints(&self) -> BTreeSet<String> {
        self.advisories
            .values()
            .map(Advisory::fingerprint)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditDiff {
    /// Present with overrides, absent without them: fixed upstream.
    pub removed: Vec<String>,
    /// Absent with overrides, present without them: still protected.
    pub new: Vec<String>,
}

impl AuditDiff {
    pub fn between(with_overrides: &AuditReport, without_overrides: &AuditReport) -> Self {
        let with_set = with_overrides.fingerprints();
        let without_set = without_overrides.fingerprints();
        Self {
            removed: with_set.difference(&without_set).cloned().collect(),
            new: without_set.difference(&with_set).cloned().collect(),
        }
    }

    /// True iff removing the overrides fixed something and broke nothing.
    pub fn can_remove_overrides(&self) -> bool {
        !self.removed.is_empty() && self.new.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut lines: Vec<&str> = vec!["=== Removed Issues (now fixed upstream) ==="];
        lines.extend(self.removed.iter().map(String::as_str));
        lines.push("");
        lines.push("=== New Issues (appear without overrides) ===");
        lines.extend(self.new.iter().map(String::as_str));
        lines.join("\n")
    }
}
