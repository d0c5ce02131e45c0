//! Accessibility audit results and findings.
//!
//! `AuditReport` is what an audit engine hands back for one document
//! fragment. `AccessibilityFinding` is one rule result tagged with its
//! category and a snapshot of the resource it was found in.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::resource::{ClarifiedType, Resource};

/// Result category reported by the audit engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Violations,
    Passes,
    Incomplete,
    Inapplicable,
}

impl FindingCategory {
    pub const ALL: [FindingCategory; 4] = [
        FindingCategory::Violations,
        FindingCategory::Passes,
        FindingCategory::Incomplete,
        FindingCategory::Inapplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::Violations => "violations",
            FindingCategory::Passes => "passes",
            FindingCategory::Incomplete => "incomplete",
            FindingCategory::Inapplicable => "inapplicable",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a failed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

/// Snapshot of one element affected by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNode {
    /// Serialized markup of the element
    pub html: String,

    /// CSS-style selector path to the element
    #[serde(default)]
    pub target: Vec<String>,
}

/// One rule evaluated by the audit engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRuleResult {
    /// Rule id, e.g. `image-alt`
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub help: String,

    #[serde(default)]
    pub help_url: String,

    #[serde(default)]
    pub impact: Option<Impact>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub nodes: Vec<AuditNode>,
}

impl AuditRuleResult {
    /// Create a rule result with no affected nodes.
    pub fn new(id: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            help: help.into(),
            help_url: String::new(),
            impact: None,
            tags: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn with_help_url(mut self, url: impl Into<String>) -> Self {
        self.help_url = url.into();
        self
    }

    pub fn with_node(mut self, html: impl Into<String>, target: impl Into<String>) -> Self {
        self.nodes.push(AuditNode {
            html: html.into(),
            target: vec![target.into()],
        });
        self
    }
}

/// Categorized results for one audited fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub violations: Vec<AuditRuleResult>,
    #[serde(default)]
    pub passes: Vec<AuditRuleResult>,
    #[serde(default)]
    pub incomplete: Vec<AuditRuleResult>,
    #[serde(default)]
    pub inapplicable: Vec<AuditRuleResult>,
}

impl AuditReport {
    /// Parse a report from engine JSON output (extra fields are ignored).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn category(&self, category: FindingCategory) -> &[AuditRuleResult] {
        match category {
            FindingCategory::Violations => &self.violations,
            FindingCategory::Passes => &self.passes,
            FindingCategory::Incomplete => &self.incomplete,
            FindingCategory::Inapplicable => &self.inapplicable,
        }
    }

    pub fn len(&self) -> usize {
        FindingCategory::ALL
            .iter()
            .map(|c| self.category(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resource metadata captured at audit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub identifier: String,
    pub title: String,
    pub clarified_type: ClarifiedType,
    pub published: bool,
    pub module_title: Option<String>,
}

impl From<&Resource> for ResourceSnapshot {
    fn from(resource: &Resource) -> Self {
        Self {
            identifier: resource.identifier.clone(),
            title: resource.title.clone(),
            clarified_type: resource.clarified_type,
            published: resource.published,
            module_title: resource.module_title.clone(),
        }
    }
}

/// One audit rule result attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityFinding {
    #[serde(rename = "type")]
    pub category: FindingCategory,

    pub parent: ResourceSnapshot,

    pub result: AuditRuleResult,

    /// Markup of every affected node, in engine order
    pub nodes_html: Vec<String>,
}

impl AccessibilityFinding {
    pub fn new(category: FindingCategory, parent: ResourceSnapshot, result: AuditRuleResult) -> Self {
        let nodes_html = result.nodes.iter().map(|n| n.html.clone()).collect();
        Self {
            category,
            parent,
            result,
            nodes_html,
        }
    }

    pub fn parent_resource_identifier(&self) -> &str {
        &self.parent.identifier
    }
}
