//! Configuration type definitions for output, fingerprints, compiler,
//! logging, and rule groups.

use serde::{Deserialize, Serialize};

use ruleforge_rules::Dialect;

use crate::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    /// External rule-set compiler. Absent means no compiled artifact.
    #[serde(default)]
    pub compiler: Option<CompilerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// Directory per-source fingerprint records are kept in.
    #[serde(default = "default_fingerprint_dir")]
    pub fingerprint_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            fingerprint_dir: default_fingerprint_dir(),
        }
    }
}

/// External compiler command template.
///
/// `{input}` and `{output}` in `args` are replaced with the structured
/// artifact path and the compiled output path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// File extension of the compiled artifact.
    #[serde(default = "default_compiled_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
}

/// One named rule group and the sources feeding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub sources: Vec<SourceConfig>,
}

/// One source of a group: a local path or a remote URL, plus how to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Stable identifier for fingerprinting and diagnostics.
    /// Defaults to the path or URL.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_dialect_value")]
    pub dialect: Dialect,
    /// Classify bare hostnames in this source as suffix rules.
    #[serde(default)]
    pub domains_as_suffix: bool,
}

fn default_dialect_value() -> Dialect {
    Dialect::List
}

impl SourceConfig {
    /// The effective source identifier: explicit `id`, else path/URL.
    pub fn effective_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        self.path
            .clone()
            .or_else(|| self.url.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_config_defaults() {
        let cfg = OutputConfig::default();
        assert_eq!(cfg.dir, "output");
        assert_eq!(cfg.fingerprint_dir, ".fingerprints");
    }

    #[test]
    fn source_config_deserialize_minimal() {
        let toml_str = r#"path = "rules/ads.list""#;
        let cfg: SourceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.path.as_deref(), Some("rules/ads.list"));
        assert!(cfg.url.is_none());
        assert_eq!(cfg.dialect, Dialect::List);
        assert!(!cfg.domains_as_suffix);
        assert_eq!(cfg.effective_id(), "rules/ads.list");
    }

    #[test]
    fn source_config_dialect_kebab_case() {
        let toml_str = r#"
url = "https://example.com/domains.txt"
dialect = "domain-set"
domains_as_suffix = true
"#;
        let cfg: SourceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.dialect, Dialect::DomainSet);
        assert!(cfg.domains_as_suffix);
        assert_eq!(cfg.effective_id(), "https://example.com/domains.txt");
    }

    #[test]
    fn explicit_id_wins_over_path() {
        let toml_str = r#"
id = "ads-upstream"
path = "rules/ads.list"
"#;
        let cfg: SourceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.effective_id(), "ads-upstream");
    }

    #[test]
    fn compiler_config_default_extension() {
        let toml_str = r#"
command = "sing-box"
args = ["rule-set", "compile", "--output", "{output}", "{input}"]
"#;
        let cfg: CompilerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.extension, "srs");
    }
}
