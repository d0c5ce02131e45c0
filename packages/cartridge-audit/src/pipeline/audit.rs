//! Accessibility audit orchestration.
//!
//! Resources are audited one at a time against the serialized bodies
//! recorded during extraction, so no parsed document is held across the
//! await and no fragment is parsed a second time.

use tracing::{debug, info, warn};

use crate::pipeline::content::AuditBodies;
use crate::traits::audit::AuditEngine;
use crate::types::{
    config::RuleSetProfile,
    finding::{AccessibilityFinding, AuditReport, FindingCategory, ResourceSnapshot},
    resource::Resource,
};

/// Outcome counts of an audit pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSummary {
    /// Resources whose findings were attached
    pub audited: usize,

    /// Resources with no target, a missing file, or an empty body
    pub skipped: usize,

    /// Resources whose engine call failed
    pub failed: usize,

    /// Findings attached across all resources
    pub findings: usize,
}

/// Audit every resource with a recorded body.
///
/// An engine failure is logged and leaves that resource's results unset;
/// it never aborts the pass.
pub async fn audit_resources(
    resources: &mut [Resource],
    bodies: &AuditBodies,
    engine: &dyn AuditEngine,
    profile: &RuleSetProfile,
) -> AuditSummary {
    let mut summary = AuditSummary::default();

    for resource in resources.iter_mut() {
        let Some(body) = bodies.get(&resource.identifier) else {
            summary.skipped += 1;
            continue;
        };

        match engine.audit(body, profile).await {
            Ok(report) => {
                let findings = flatten_report(report, &ResourceSnapshot::from(&*resource));
                debug!(
                    identifier = %resource.identifier,
                    findings = findings.len(),
                    "Audited resource"
                );
                summary.audited += 1;
                summary.findings += findings.len();
                resource.accessibility_results = Some(findings);
            }
            Err(e) => {
                warn!(
                    identifier = %resource.identifier,
                    engine = engine.name(),
                    error = %e,
                    "Audit failed, skipping resource"
                );
                summary.failed += 1;
            }
        }
    }

    info!(
        audited = summary.audited,
        skipped = summary.skipped,
        failed = summary.failed,
        findings = summary.findings,
        "Accessibility audit complete"
    );

    summary
}

/// Flatten a report into findings, violations first, in engine order.
pub fn flatten_report(report: AuditReport, parent: &ResourceSnapshot) -> Vec<AccessibilityFinding> {
    let AuditReport {
        violations,
        passes,
        incomplete,
        inapplicable,
    } = report;

    [
        (FindingCategory::Violations, violations),
        (FindingCategory::Passes, passes),
        (FindingCategory::Incomplete, incomplete),
        (FindingCategory::Inapplicable, inapplicable),
    ]
    .into_iter()
    .flat_map(|(category, results)| {
        results
            .into_iter()
            .map(move |result| AccessibilityFinding::new(category, parent.clone(), result))
    })
    .collect()
}
