//! Analysis configuration loaded from `rsnames.toml`.
//!
//! ```toml
//! [cfg]
//! options = ["unix", "target_os = \"linux\""]
//! features = ["serde"]
//! unknown = ["target_arch"]
//!
//! [diagnostics]
//! disabled = ["E0449"]
//! severity_overrides = { E0603 = "warning" }
//! ```

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use smol_str::SmolStr;
use tracing::warn;

use crate::cfg::CfgOptions;
use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::error::ConfigError;

/// Conventional config file name.
pub const CONFIG_FILE: &str = "rsnames.toml";

/// Settings of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Build configuration the cfg predicates are evaluated against.
    pub cfg: CfgOptions,
    /// Diagnostic filtering.
    pub diagnostics: DiagnosticSettings,
}

/// Which diagnostics are reported and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSettings {
    /// Rustc codes that are never reported.
    pub disabled: FxHashSet<SmolStr>,
    /// Per-code severity overrides (e.g., E0603 -> warning).
    pub severity_overrides: FxHashMap<SmolStr, DiagnosticSeverity>,
}

impl DiagnosticSettings {
    /// Drops disabled codes and applies severity overrides.
    pub fn apply(&self, diagnostics: &mut Vec<Diagnostic>) {
        diagnostics.retain(|diagnostic| !self.disabled.contains(diagnostic.code.code()));
        for diagnostic in diagnostics {
            if let Some(severity) = self.severity_overrides.get(diagnostic.code.code()) {
                diagnostic.severity = *severity;
            }
        }
    }
}

impl AnalysisConfig {
    /// Loads the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses config file contents.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let parsed: ConfigFile = toml::from_str(contents)?;

        let mut cfg = CfgOptions::new();
        for option in &parsed.cfg.options {
            match option.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"');
                    if key.is_empty() {
                        return Err(ConfigError::InvalidCfgOption(option.clone()));
                    }
                    cfg.insert_key_value(key, value);
                }
                None if option.trim().is_empty() => {
                    return Err(ConfigError::InvalidCfgOption(option.clone()));
                }
                None => cfg.insert_atom(option.trim()),
            }
        }
        for feature in &parsed.cfg.features {
            cfg.insert_key_value("feature", feature.as_str());
        }
        for key in &parsed.cfg.unknown {
            cfg.insert_unknown(key.as_str());
        }

        let mut diagnostics = DiagnosticSettings {
            disabled: parsed
                .diagnostics
                .disabled
                .iter()
                .map(|code| SmolStr::new(code.trim()))
                .collect(),
            severity_overrides: FxHashMap::default(),
        };
        for (code, severity) in &parsed.diagnostics.severity_overrides {
            let severity = match severity.to_ascii_lowercase().as_str() {
                "error" => DiagnosticSeverity::Error,
                "warning" | "warn" => DiagnosticSeverity::Warning,
                other => {
                    warn!("Ignoring unknown severity '{}' for {}", other, code);
                    continue;
                }
            };
            diagnostics
                .severity_overrides
                .insert(SmolStr::new(code.trim()), severity);
        }

        Ok(Self { cfg, diagnostics })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    cfg: CfgSection,
    #[serde(default)]
    diagnostics: DiagnosticSection,
}

#[derive(Debug, Default, Deserialize)]
struct CfgSection {
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    unknown: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DiagnosticSection {
    #[serde(default)]
    disabled: Vec<String>,
    #[serde(default)]
    severity_overrides: FxHashMap<String, String>,
}
