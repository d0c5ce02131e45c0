//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the analysis library
//! without a real archive on disk or a real audit engine.

use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::sync::{Arc, RwLock};

use crate::error::{ArchiveError, ArchiveResult, AuditError, AuditResult};
use crate::pipeline::classify::{
    DISCUSSION_MARKER, LEARNING_APPLICATION_MARKER, QTI_ASSESSMENT_MARKER, WEB_CONTENT_TYPE,
    WEB_LINK_TYPE,
};
use crate::traits::{
    archive::{is_text_entry, ArchiveReader},
    audit::AuditEngine,
};
use crate::types::{config::RuleSetProfile, finding::AuditReport, package::PackageFiles};

/// A mock archive reader for testing.
///
/// Returns canned package contents regardless of the bytes it is handed,
/// applying the same asset-prefix filter as a real reader.
#[derive(Default)]
pub struct MockArchiveReader {
    files: PackageFiles,

    /// Fail every read
    fail: bool,

    /// Byte lengths of every read, for assertions
    calls: Arc<RwLock<Vec<usize>>>,
}

impl MockArchiveReader {
    /// Create a mock that returns the given contents.
    pub fn new(files: PackageFiles) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    /// Create a mock whose reads always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Get the byte lengths of all reads made.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveReader for MockArchiveReader {
    async fn read_package(
        &self,
        bytes: Vec<u8>,
        asset_prefix: &str,
    ) -> ArchiveResult<PackageFiles> {
        self.calls.write().unwrap().push(bytes.len());

        if self.fail {
            return Err(ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Mock corrupt archive",
            )));
        }

        Ok(self
            .files
            .paths()
            .filter(|path| is_text_entry(path, false, asset_prefix))
            .filter_map(|path| {
                self.files
                    .get(path)
                    .map(|content| (path.to_string(), content.to_string()))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock audit engine for testing.
///
/// Reports are chosen by the first registered marker that occurs in the
/// audited fragment, falling back to a default report.
#[derive(Default)]
pub struct MockAuditEngine {
    /// Canned reports keyed by fragment marker
    reports: Arc<RwLock<Vec<(String, AuditReport)>>>,

    /// Report for fragments no marker matches
    default_report: Arc<RwLock<AuditReport>>,

    /// Fragments containing any of these fail
    fail_markers: Arc<RwLock<Vec<String>>>,

    /// Every fragment audited, for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockAuditEngine {
    /// Create a mock that reports nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `report` for fragments containing `marker`.
    pub fn with_report(self, marker: impl Into<String>, report: AuditReport) -> Self {
        self.reports.write().unwrap().push((marker.into(), report));
        self
    }

    /// Return `report` for fragments no marker matches.
    pub fn with_default_report(self, report: AuditReport) -> Self {
        *self.default_report.write().unwrap() = report;
        self
    }

    /// Fail on fragments containing `marker`.
    pub fn failing_on(self, marker: impl Into<String>) -> Self {
        self.fail_markers.write().unwrap().push(marker.into());
        self
    }

    /// Get all fragments audited so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl AuditEngine for MockAuditEngine {
    async fn audit(&self, fragment: &str, profile: &RuleSetProfile) -> AuditResult<AuditReport> {
        self.calls.write().unwrap().push(fragment.to_string());

        if profile.tags.is_empty() {
            return Err(AuditError::Unsupported("empty rule-set profile".to_string()));
        }

        if self
            .fail_markers
            .read()
            .unwrap()
            .iter()
            .any(|marker| fragment.contains(marker.as_str()))
        {
            return Err(AuditError::Engine(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Mock engine failure",
            ))));
        }

        let report = self
            .reports
            .read()
            .unwrap()
            .iter()
            .find(|(marker, _)| fragment.contains(marker.as_str()))
            .map(|(_, report)| report.clone());

        Ok(report.unwrap_or_else(|| self.default_report.read().unwrap().clone()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Builder for course package fixtures.
///
/// Assembles a manifest, module metadata, and the content files each
/// resource kind needs, in the layout an LMS export uses.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    resources: Vec<String>,
    modules: Vec<FixtureModule>,
    files: Vec<(String, String)>,
    include_manifest: bool,
    include_module_meta: bool,
}

#[derive(Debug, Clone)]
struct FixtureModule {
    identifier: String,
    title: String,
    published: bool,
    items: Vec<String>,
}

impl PackageBuilder {
    /// Create an empty package with a manifest and module metadata.
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            modules: Vec::new(),
            files: Vec::new(),
            include_manifest: true,
            include_module_meta: true,
        }
    }

    /// Leave the manifest out of the package.
    pub fn without_manifest(mut self) -> Self {
        self.include_manifest = false;
        self
    }

    /// Leave the module metadata out of the package.
    pub fn without_module_meta(mut self) -> Self {
        self.include_module_meta = false;
        self
    }

    /// Add a raw content file.
    pub fn file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Declare a manifest resource. `href` is also listed as its file.
    pub fn resource(
        self,
        identifier: &str,
        content_type: &str,
        href: Option<&str>,
        dependency: Option<&str>,
    ) -> Self {
        self.declare(identifier, content_type, href, href, dependency)
    }

    /// A wiki page with a `workflow_state` meta tag.
    pub fn page(self, identifier: &str, href: &str, title: &str, workflow_state: &str, body: &str) -> Self {
        self.resource(identifier, WEB_CONTENT_TYPE, Some(href), None)
            .file(href, html_page(title, Some(workflow_state), body))
    }

    /// The course syllabus.
    pub fn syllabus(self, body: &str) -> Self {
        let href = "course_settings/syllabus.html";
        self.resource("course_syllabus", LEARNING_APPLICATION_MARKER, Some(href), None)
            .file(href, html_page("Syllabus", None, body))
    }

    /// An assignment with its settings file and HTML body.
    pub fn assignment(self, identifier: &str, title: &str, workflow_state: &str, body: &str) -> Self {
        let href = format!("{identifier}/{}.html", slug(title));
        let settings = format!(
            "<assignment identifier=\"{identifier}\"><title>{}</title><workflow_state>{workflow_state}</workflow_state></assignment>",
            escape(title)
        );
        self.resource(identifier, LEARNING_APPLICATION_MARKER, Some(&href), None)
            .file(&href, html_page(title, None, body))
            .file(format!("{identifier}/assignment_settings.xml"), settings)
    }

    /// A quiz or survey with its metadata dependency.
    pub fn quiz(
        self,
        identifier: &str,
        meta_identifier: &str,
        title: &str,
        quiz_type: &str,
        available: bool,
        body: &str,
    ) -> Self {
        let meta_href = format!("{identifier}/assessment_meta.xml");
        let meta = format!(
            "<quiz identifier=\"{identifier}\"><title>{}</title><description>{}</description><quiz_type>{quiz_type}</quiz_type><available>{available}</available></quiz>",
            escape(title),
            escape(body)
        );
        self.declare(identifier, QTI_ASSESSMENT_MARKER, None, None, Some(meta_identifier))
            .resource(meta_identifier, LEARNING_APPLICATION_MARKER, Some(&meta_href), None)
            .file(&meta_href, meta)
    }

    /// A discussion topic or announcement with its settings dependency.
    pub fn discussion(
        self,
        identifier: &str,
        settings_identifier: &str,
        title: &str,
        kind: &str,
        workflow_state: &str,
        body: &str,
    ) -> Self {
        let topic_href = format!("{identifier}.xml");
        let settings_href = format!("{settings_identifier}.xml");
        let topic = format!(
            "<topic identifier=\"{identifier}\"><title>{}</title><text>{}</text></topic>",
            escape(title),
            escape(body)
        );
        let settings = format!(
            "<topicMeta identifier=\"{settings_identifier}\"><type>{kind}</type><workflow_state>{workflow_state}</workflow_state></topicMeta>"
        );
        self.declare(
            identifier,
            DISCUSSION_MARKER,
            None,
            Some(&topic_href),
            Some(settings_identifier),
        )
        .resource(settings_identifier, LEARNING_APPLICATION_MARKER, Some(&settings_href), None)
        .file(topic_href, topic)
        .file(settings_href, settings)
    }

    /// A module hyperlink entry.
    pub fn web_link(self, identifier: &str, title: &str, url: &str) -> Self {
        let href = format!("{identifier}.xml");
        let link = format!(
            "<webLink><title>{}</title><url href=\"{}\"/></webLink>",
            escape(title),
            escape(url)
        );
        self.declare(identifier, WEB_LINK_TYPE, None, Some(&href), None)
            .file(href, link)
    }

    /// Start a module; following `item` calls add to it.
    pub fn module(mut self, identifier: &str, title: &str, published: bool) -> Self {
        self.modules.push(FixtureModule {
            identifier: identifier.to_string(),
            title: title.to_string(),
            published,
            items: Vec::new(),
        });
        self
    }

    /// Add an item to the last module.
    pub fn item(
        mut self,
        identifier: &str,
        title: &str,
        identifier_ref: Option<&str>,
        content_type: &str,
    ) -> Self {
        let reference = identifier_ref
            .map(|r| format!("<identifierref>{r}</identifierref>"))
            .unwrap_or_default();
        let xml = format!(
            "<item identifier=\"{identifier}\"><content_type>{content_type}</content_type><workflow_state>active</workflow_state><title>{}</title>{reference}<indent>0</indent></item>",
            escape(title)
        );
        if let Some(module) = self.modules.last_mut() {
            module.items.push(xml);
        }
        self
    }

    /// Render the manifest document.
    pub fn manifest_xml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<manifest identifier=\"course\" xmlns=\"http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1\"><metadata/><organizations/><resources>{}</resources></manifest>",
            self.resources.concat()
        )
    }

    /// Render the module metadata document.
    pub fn module_meta_xml(&self) -> String {
        let modules: String = self
            .modules
            .iter()
            .map(|m| {
                format!(
                    "<module identifier=\"{}\"><title>{}</title><workflow_state>{}</workflow_state><items>{}</items></module>",
                    m.identifier,
                    escape(&m.title),
                    if m.published { "active" } else { "unpublished" },
                    m.items.concat()
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<modules xmlns=\"http://canvas.instructure.com/xsd/cccv1p0\">{modules}</modules>"
        )
    }

    /// Decoded package contents, as an archive reader would return them.
    pub fn files(&self) -> PackageFiles {
        self.entries().into_iter().collect()
    }

    /// Zip-compressed package, with an asset entry and directory entries
    /// a reader is expected to skip.
    pub fn to_zip(&self) -> Vec<u8> {
        let mut entries = self.entries();
        entries.push(("web_resources/".to_string(), String::new()));
        entries.push(("web_resources/logo.png".to_string(), "\u{89}PNG".to_string()));
        let borrowed: Vec<(&str, &str)> = entries
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
            .collect();
        zip_bytes(&borrowed)
    }

    fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        if self.include_manifest {
            entries.push(("imsmanifest.xml".to_string(), self.manifest_xml()));
        }
        if self.include_module_meta {
            entries.push((
                "course_settings/module_meta.xml".to_string(),
                self.module_meta_xml(),
            ));
        }
        entries.extend(self.files.iter().cloned());
        entries
    }

    fn declare(
        mut self,
        identifier: &str,
        content_type: &str,
        href: Option<&str>,
        file: Option<&str>,
        dependency: Option<&str>,
    ) -> Self {
        let href_attr = href
            .map(|h| format!(" href=\"{}\"", escape(h)))
            .unwrap_or_default();
        let file = file
            .map(|f| format!("<file href=\"{}\"/>", escape(f)))
            .unwrap_or_default();
        let dependency = dependency
            .map(|d| format!("<dependency identifierref=\"{d}\"/>"))
            .unwrap_or_default();
        self.resources.push(format!(
            "<resource identifier=\"{identifier}\" type=\"{content_type}\"{href_attr}>{file}{dependency}</resource>"
        ));
        self
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a zip archive from `(path, content)` pairs.
///
/// Paths ending in `/` become directory entries.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    for (path, content) in entries {
        if path.ends_with('/') {
            writer.add_directory(*path, options).expect("add directory");
        } else {
            writer.start_file(*path, options).expect("start file");
            writer.write_all(content.as_bytes()).expect("write entry");
        }
    }

    writer.finish().expect("finish archive").into_inner()
}

fn html_page(title: &str, workflow_state: Option<&str>, body: &str) -> String {
    let meta = workflow_state
        .map(|s| format!("<meta name=\"workflow_state\" content=\"{s}\">"))
        .unwrap_or_default();
    format!(
        "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\"><title>{}</title>{meta}</head><body>{body}</body></html>",
        escape(title)
    )
}

fn slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::ZipArchiveReader;

    #[tokio::test]
    async fn test_mock_archive_reader_filters_assets() {
        let files = PackageFiles::new()
            .with_entry("imsmanifest.xml", "<manifest/>")
            .with_entry("web_resources/a.png", "png");
        let reader = MockArchiveReader::new(files);

        let read = reader.read_package(vec![0; 4], "web_resources/").await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(reader.calls(), vec![4]);

        let failing = MockArchiveReader::failing();
        assert!(failing.read_package(vec![], "").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_audit_engine_markers() {
        let flagged = AuditReport {
            violations: vec![crate::types::finding::AuditRuleResult::new("image-alt", "Alt text")],
            ..Default::default()
        };
        let engine = MockAuditEngine::new()
            .with_report("<img", flagged.clone())
            .failing_on("explode");
        let profile = RuleSetProfile::default();

        assert_eq!(engine.audit("<img src=x>", &profile).await.unwrap(), flagged);
        assert!(engine.audit("<p>plain</p>", &profile).await.unwrap().is_empty());
        assert!(engine.audit("<p>explode</p>", &profile).await.is_err());
        assert!(engine
            .audit("<p>x</p>", &RuleSetProfile::from_tags(Vec::<String>::new()))
            .await
            .is_err());
        assert_eq!(engine.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_package_builder_round_trips_through_zip() {
        let builder = PackageBuilder::new()
            .page("p1", "wiki_content/intro.html", "Intro", "active", "<p>Hi</p>")
            .module("m1", "Week 1", true)
            .item("i1", "Intro", Some("p1"), "WikiPage");

        let files = ZipArchiveReader::new()
            .read_package(builder.to_zip(), "web_resources/")
            .await
            .unwrap();

        assert_eq!(files, builder.files());
        assert!(files.get("imsmanifest.xml").unwrap().contains("identifier=\"p1\""));
        assert!(files
            .get("course_settings/module_meta.xml")
            .unwrap()
            .contains("<identifierref>p1</identifierref>"));
    }
}
