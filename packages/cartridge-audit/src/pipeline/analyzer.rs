//! End-to-end package analysis.

use tracing::info;

use crate::error::Result;
use crate::pipeline::{
    audit::audit_resources, extract::extract_content_objects, manifest::build_manifest_inventory,
    modules::build_module_inventory, reconcile::reconcile,
};
use crate::traits::{archive::ArchiveReader, audit::AuditEngine};
use crate::types::{config::AnalysisConfig, inventory::CourseInventory, package::PackageFiles};

/// Runs the full pipeline over one package.
///
/// read → manifest → modules → reconcile → extract → audit.
/// The audit stage runs only when an engine is attached.
pub struct CourseAnalyzer<R: ArchiveReader> {
    reader: R,
    engine: Option<Box<dyn AuditEngine>>,
    config: AnalysisConfig,
}

impl<R: ArchiveReader> CourseAnalyzer<R> {
    /// Create an analyzer with default configuration and no audit engine.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            engine: None,
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_audit_engine(mut self, engine: impl AuditEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a compressed package.
    pub async fn analyze(&self, bytes: Vec<u8>) -> Result<CourseInventory> {
        info!(
            reader = self.reader.name(),
            bytes = bytes.len(),
            "Analyzing course package"
        );

        let files = self
            .reader
            .read_package(bytes, &self.config.asset_prefix)
            .await?;

        self.analyze_files(&files).await
    }

    /// Analyze already-decompressed package contents.
    pub async fn analyze_files(&self, files: &PackageFiles) -> Result<CourseInventory> {
        let mut resources = build_manifest_inventory(files, &self.config)?;
        let mut modules = build_module_inventory(files, &self.config)?;

        reconcile(&mut modules, &mut resources);
        let bodies = extract_content_objects(&mut resources, files, &self.config);

        if let Some(engine) = &self.engine {
            audit_resources(&mut resources, &bodies, engine.as_ref(), &self.config.audit_profile)
                .await;
        }

        let inventory = CourseInventory::new(resources, modules);
        let summary = inventory.summary();
        info!(
            resources = summary.resources,
            modules = summary.modules,
            links = summary.links(),
            videos = summary.videos,
            attachments = summary.attachments,
            findings = summary.findings(),
            "Course analysis complete"
        );

        Ok(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::testing::{MockArchiveReader, MockAuditEngine, PackageBuilder};
    use crate::types::module::ItemType;
    use crate::types::resource::ClarifiedType;

    fn course() -> PackageBuilder {
        PackageBuilder::new()
            .page(
                "p1",
                "wiki_content/intro.html",
                "Intro",
                "active",
                r#"<p><a href="https://example.com">Example</a></p>"#,
            )
            .module("m1", "Week 1", true)
            .item("i1", "Intro", Some("p1"), "WikiPage")
            .item("i2", "Readings", None, "ContextModuleSubHeader")
    }

    #[tokio::test]
    async fn test_analyze_without_engine() {
        let analyzer = CourseAnalyzer::new(MockArchiveReader::new(course().files()));
        let inventory = analyzer.analyze(vec![1, 2, 3]).await.unwrap();

        let page = inventory.resource("p1").unwrap();
        assert_eq!(page.module_title.as_deref(), Some("Week 1"));
        assert_eq!(page.links.len(), 1);
        assert!(page.accessibility_results.is_none());
        assert_eq!(
            inventory.modules[0].items[0].clarified_type,
            ItemType::Classified(ClarifiedType::Page)
        );
    }

    #[tokio::test]
    async fn test_analyze_with_engine() {
        let analyzer = CourseAnalyzer::new(MockArchiveReader::new(course().files()))
            .with_audit_engine(MockAuditEngine::new());
        let inventory = analyzer.analyze(vec![]).await.unwrap();

        assert_eq!(
            inventory.resource("p1").unwrap().accessibility_results,
            Some(vec![])
        );
    }

    #[tokio::test]
    async fn test_archive_failure_is_fatal() {
        let analyzer = CourseAnalyzer::new(MockArchiveReader::failing());
        let err = analyzer.analyze(vec![]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Archive(_)));
    }
}
