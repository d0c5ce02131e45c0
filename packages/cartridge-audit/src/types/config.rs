//! Configuration types for package analysis.

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AnalysisError, Result};

/// Rule-set tags handed to the audit engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetProfile {
    pub tags: Vec<String>,
}

impl Default for RuleSetProfile {
    fn default() -> Self {
        Self::from_tags(["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"])
    }
}

impl RuleSetProfile {
    pub fn from_tags(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(|t| t.into()).collect(),
        }
    }
}

/// Configuration for a package analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Archive path of the manifest document.
    pub manifest_path: String,

    /// Archive path of the module metadata document.
    pub module_meta_path: String,

    /// Binary asset subtree the archive reader leaves out.
    pub asset_prefix: String,

    /// Domains whose hosts (and subdomains) classify links as `institution`.
    ///
    /// Default: empty (no link is treated as institutional).
    #[serde(default)]
    pub institution_domains: Vec<String>,

    /// Rule-set profile for the audit engine.
    #[serde(default)]
    pub audit_profile: RuleSetProfile,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            manifest_path: "imsmanifest.xml".to_string(),
            module_meta_path: "course_settings/module_meta.xml".to_string(),
            asset_prefix: "web_resources/".to_string(),
            institution_domains: vec![],
            audit_profile: RuleSetProfile::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the environment.
    ///
    /// Reads an optional `.env` file first. Recognized variables:
    /// - `CARTRIDGE_INSTITUTION_DOMAINS` (comma separated)
    /// - `CARTRIDGE_AUDIT_TAGS` (comma separated)
    /// - `CARTRIDGE_ASSET_PREFIX`
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(domains) = env::var("CARTRIDGE_INSTITUTION_DOMAINS") {
            config.institution_domains = split_list(&domains);
        }

        if let Ok(tags) = env::var("CARTRIDGE_AUDIT_TAGS") {
            let tags = split_list(&tags);
            if tags.is_empty() {
                return Err(AnalysisError::Config(
                    "CARTRIDGE_AUDIT_TAGS must name at least one tag".to_string(),
                ));
            }
            config.audit_profile = RuleSetProfile::from_tags(tags);
        }

        if let Ok(prefix) = env::var("CARTRIDGE_ASSET_PREFIX") {
            config.asset_prefix = prefix;
        }

        Ok(config)
    }

    /// Set the institution domains.
    pub fn with_institution_domains(
        mut self,
        domains: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.institution_domains = domains.into_iter().map(|d| d.into()).collect();
        self
    }

    /// Set the audit rule-set profile.
    pub fn with_audit_profile(mut self, profile: RuleSetProfile) -> Self {
        self.audit_profile = profile;
        self
    }

    /// Set the excluded asset prefix.
    pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = prefix.into();
        self
    }

    /// Check if a host belongs to one of the institution domains.
    pub fn is_institution_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.institution_domains.iter().any(|domain| {
            let domain = domain.trim_start_matches('.').to_ascii_lowercase();
            !domain.is_empty()
                && (host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|rest| rest.ends_with('.')))
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
