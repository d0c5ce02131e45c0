//! Audit engine trait for accessibility scanning.
//!
//! The engine itself is external. The pipeline hands it the body markup of
//! one resource at a time, together with the configured rule-set profile.

use async_trait::async_trait;

use crate::error::AuditResult;
use crate::types::{config::RuleSetProfile, finding::AuditReport};

/// Accessibility audit engine.
///
/// Implementations wrap a concrete scanner (a headless browser running
/// axe-core, a remote service, etc.) and translate its output into an
/// [`AuditReport`].
#[async_trait]
pub trait AuditEngine: Send + Sync {
    /// Audit one document fragment.
    ///
    /// `fragment` is serialized body markup. An error fails only the
    /// current resource; the pipeline logs it and moves on.
    async fn audit(&self, fragment: &str, profile: &RuleSetProfile) -> AuditResult<AuditReport>;

    /// Get the engine name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
