use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub paths: PathsConfig,
    pub registry: RegistryConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

/// File names of every artifact the tool reads or writes, relative to the
/// project root.
#[derive(Debug, Clone, Serialize)]
pub struct PathsConfig {
    pub manifest: String,
    pub workspace: String,
    pub audit_with: String,
    pub audit_without: String,
    pub removed_record: String,
    pub diff_report: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryConfig {
    pub base_url: String,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                manifest: "package.json".to_string(),
                workspace: "pnpm-workspace.yaml".to_string(),
                audit_with: "audit-with.json".to_string(),
                audit_without: "audit-without.json".to_string(),
                removed_record: "removed-overrides.json".to_string(),
                diff_report: "audit-diff.txt".to_string(),
                summary: "override-removal-summary.md".to_string(),
            },
            registry: RegistryConfig {
                base_url: "https://npmjs.com/package/".to_string(),
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    paths: Option<RawPathsConfig>,
    registry: Option<RawRegistryConfig>,
}

#[derive(Debug, Deserialize)]
struct RawPathsConfig {
    manifest: Option<String>,
    workspace: Option<String>,
    audit_with: Option<String>,
    audit_without: Option<String>,
    removed_record: Option<String>,
    diff_report: Option<String>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRegistryConfig {
    base_url: Option<String>,
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(".config/overaudit.toml")
}

pub fn load(config_path: Option<&Path>, root: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(root));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s).context("failed to parse config file (TOML)")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg);

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(paths) = raw.paths {
        if let Some(manifest) = paths.manifest {
            cfg.paths.manifest = manifest;
        }
        if let Some(workspace) = paths.workspace {
            cfg.paths.workspace = workspace;
        }
        if let Some(audit_with) = paths.audit_with {
            cfg.paths.audit_with = audit_with;
        }
        if let Some(audit_without) = paths.audit_without {
            cfg.paths.audit_without = audit_without;
        }
        if let Some(removed_record) = paths.removed_record {
            cfg.paths.removed_record = removed_record;
        }
        if let Some(diff_report) = paths.diff_report {
            cfg.paths.diff_report = diff_report;
        }
        if let Some(summary) = paths.summary {
            cfg.paths.summary = summary;
        }
    }

    if let Some(registry) = raw.registry {
        if let Some(base_url) = registry.base_url {
            cfg.registry.base_url = base_url;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) {
    if let Ok(v) = std::env::var("OVERAUDIT_REGISTRY_BASE_URL") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.registry.base_url = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("OVERAUDIT_MANIFEST") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.paths.manifest = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("OVERAUDIT_WORKSPACE") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.paths.workspace = v.to_string();
        }
    }
}
