//! Analysis pipeline - the core of the library.
//!
//! The pipeline runs strictly in order:
//! - Manifest scan and classification into `Resource`s
//! - Module metadata scan into `Module`s
//! - Reconciliation of module items against resources
//! - Content object extraction (links, attachments, videos)
//! - Accessibility audit through an external engine

pub mod analyzer;
pub mod audit;
pub mod classify;
pub mod content;
pub mod extract;
pub mod manifest;
pub mod markup;
pub mod modules;
pub mod reconcile;

pub use analyzer::CourseAnalyzer;
pub use audit::{audit_resources, flatten_report, AuditSummary};
pub use classify::{classify, exclusion, ClassificationRule, ContentStrategy, Exclusion, RULES};
pub use content::{resolve_fragment, AuditBodies};
pub use extract::{
    classify_link, extract_content_objects, find_attachments, find_links, find_videos,
    scan_document, video_platform, ContentObjects,
};
pub use manifest::{build_manifest_inventory, scan_manifest, ManifestScan, SupportingResources};
pub use modules::build_module_inventory;
pub use reconcile::{reconcile, ReconcileReport};
