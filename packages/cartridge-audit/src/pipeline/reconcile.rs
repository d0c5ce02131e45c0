//! Reconciliation - cross-link module items and manifest resources.
//!
//! Resources are an arena indexed by identifier; module items refer into it
//! by `identifier_ref`. Reconciliation mutates both sides in place:
//! - a matched item takes the resource's clarified type
//! - the matched resource takes the item's module title
//!
//! This is the only place `Resource::module_title` is written.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::types::{
    module::{ItemType, Module},
    resource::Resource,
};

/// Outcome counts of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Items whose reference resolved to a resource
    pub matched: usize,

    /// Items with a reference that resolved to nothing
    pub unresolved: usize,

    /// Items without a reference (headers, external URLs)
    pub unreferenced: usize,
}

/// Reconcile modules against resources, in place.
///
/// Matching is exact identifier equality. When several items reference the
/// same resource, the last one in outline order sets its module title.
pub fn reconcile(modules: &mut [Module], resources: &mut [Resource]) -> ReconcileReport {
    let index: HashMap<String, usize> = resources
        .iter()
        .enumerate()
        .map(|(position, r)| (r.identifier.clone(), position))
        .collect();

    let mut report = ReconcileReport::default();

    for module in modules.iter_mut() {
        for item in module.items.iter_mut() {
            let Some(reference) = item.identifier_ref.as_deref() else {
                report.unreferenced += 1;
                continue;
            };

            match index.get(reference) {
                Some(&position) => {
                    let resource = &mut resources[position];
                    item.clarified_type = ItemType::Classified(resource.clarified_type);
                    resource.module_title = Some(item.module_title.clone());
                    report.matched += 1;
                }
                None => {
                    debug!(item = %item.identifier, reference = %reference, "Module item reference unresolved");
                    report.unresolved += 1;
                }
            }
        }
    }

    info!(
        matched = report.matched,
        unresolved = report.unresolved,
        unreferenced = report.unreferenced,
        "Reconciliation complete"
    );

    report
}
