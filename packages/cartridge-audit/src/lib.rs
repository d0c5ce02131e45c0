//! Course Package Inventory and Audit Library
//!
//! Reads an exported course package (a zip archive with an XML manifest,
//! module metadata, and per-item content files) and produces a normalized
//! inventory of resources and modules, enriched with links, videos, file
//! attachments, and accessibility findings for review tooling.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cartridge_audit::{AnalysisConfig, CourseAnalyzer, ZipArchiveReader};
//!
//! let config = AnalysisConfig::from_env()?;
//! let analyzer = CourseAnalyzer::new(ZipArchiveReader::new()).with_config(config);
//!
//! let inventory = analyzer.analyze(std::fs::read("course.imscc")?).await?;
//! for link in inventory.links() {
//!     println!("{} -> {}", link.parent_resource_identifier, link.url);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (ArchiveReader, AuditEngine)
//! - [`types`] - Resources, modules, content objects, findings
//! - [`pipeline`] - Manifest/module scans, reconciliation, extraction, audit
//! - [`readers`] - Archive reader implementations (ZipArchiveReader)
//! - [`testing`] - Mock implementations and package fixtures

pub mod error;
pub mod pipeline;
pub mod readers;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AnalysisError, ArchiveError, AuditError};
pub use pipeline::CourseAnalyzer;
pub use readers::ZipArchiveReader;
pub use traits::{archive::ArchiveReader, audit::AuditEngine};
pub use types::{
    config::{AnalysisConfig, RuleSetProfile},
    finding::{
        AccessibilityFinding, AuditNode, AuditReport, AuditRuleResult, FindingCategory, Impact,
        ResourceSnapshot,
    },
    inventory::{CourseInventory, InventorySummary},
    module::{ItemType, Module, ModuleItem},
    objects::{FileObject, LinkObject, LinkType, VideoKind, VideoObject, VideoPlatform},
    package::PackageFiles,
    resource::{AnalysisTarget, ClarifiedType, Resource},
};
