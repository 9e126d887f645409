use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Override keys mapped to their version specifiers, one map per source
/// document.
pub type OverrideMap = BTreeMap<String, String>;

/// The overrides captured by a strip run, keyed by the document they came
/// from. Written to disk only when at least one document was modified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedOverrides {
    #[serde(rename = "packageJson", default)]
    pub package_json: OverrideMap,
    #[serde(default)]
    pub workspace: OverrideMap,
}

impl RemovedOverrides {
    pub fn is_empty(&self) -> bool {
        self.package_json.is_empty() && self.workspace.is_empty()
    }
}
