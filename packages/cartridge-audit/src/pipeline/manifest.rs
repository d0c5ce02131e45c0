//! Manifest inventory - classify manifest resources into typed `Resource`s.
//!
//! The scan runs in two passes over the manifest's `<resource>`
//! declarations:
//!
//! 1. Collect supporting resources: the dependency targets of quiz and
//!    discussion wrappers whose file is present in the package.
//! 2. Classify every remaining declaration through the rule table and read
//!    its title, status and analysis target.
//!
//! Collecting first makes the skip list independent of declaration order.

use roxmltree::Document;
use scraper::Html;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};
use crate::pipeline::classify::{classify, exclusion, ContentStrategy, ManifestEntry};
use crate::pipeline::markup::{
    first_text, first_text_is, html_meta, html_title, parse_xml, title_or,
};
use crate::types::{
    config::AnalysisConfig,
    package::PackageFiles,
    resource::{AnalysisTarget, ClarifiedType, Resource, UNTITLED},
};

const ACTIVE: &str = "active";

/// Identifiers of resources that only hold metadata for another resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportingResources {
    identifiers: HashSet<String>,
}

impl SupportingResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        self.identifiers.insert(identifier.into())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }
}

/// Output of a manifest scan.
#[derive(Debug, Clone, Default)]
pub struct ManifestScan {
    /// Classified resources, in manifest order
    pub resources: Vec<Resource>,

    /// Resources consumed as metadata holders
    pub supporting: SupportingResources,
}

/// Build the classified resource inventory from the package manifest.
pub fn build_manifest_inventory(
    files: &PackageFiles,
    config: &AnalysisConfig,
) -> Result<Vec<Resource>> {
    scan_manifest(files, config).map(|scan| scan.resources)
}

/// Scan the manifest, returning resources and the supporting-resource set.
pub fn scan_manifest(files: &PackageFiles, config: &AnalysisConfig) -> Result<ManifestScan> {
    let path = config.manifest_path.as_str();
    let text = files.get(path).ok_or_else(|| AnalysisError::ManifestMissing {
        path: path.to_string(),
    })?;

    let document = parse_xml(text).map_err(|source| AnalysisError::MalformedXml {
        path: path.to_string(),
        source,
    })?;

    let entries = manifest_entries(&document);
    let index = ManifestIndex::new(&entries);
    let supporting = collect_supporting(&index, files, config)?;

    let mut resources = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in &entries {
        if supporting.contains(entry.identifier) {
            debug!(identifier = %entry.identifier, "Skipping supporting resource");
            continue;
        }

        if let Some(reason) = exclusion(entry, &config.asset_prefix) {
            debug!(identifier = %entry.identifier, reason = ?reason, "Excluding resource");
            continue;
        }

        if !seen.insert(entry.identifier) {
            warn!(identifier = %entry.identifier, "Duplicate resource identifier in manifest");
            continue;
        }

        let Some(rule) = classify(entry) else {
            debug!(
                identifier = %entry.identifier,
                content_type = %entry.content_type,
                "No classification rule matched"
            );
            continue;
        };

        match read_resource(entry, rule.strategy, &index, files)? {
            Some(resource) => {
                debug!(
                    identifier = %resource.identifier,
                    clarified_type = %resource.clarified_type,
                    published = resource.published,
                    "Classified resource"
                );
                resources.push(resource);
            }
            None => {
                debug!(
                    identifier = %entry.identifier,
                    rule = rule.name,
                    "Resource has no readable metadata"
                );
            }
        }
    }

    info!(
        declared = entries.len(),
        classified = resources.len(),
        supporting = supporting.len(),
        "Manifest inventory complete"
    );

    Ok(ManifestScan {
        resources,
        supporting,
    })
}

fn manifest_entries<'a>(document: &'a Document<'_>) -> Vec<ManifestEntry<'a>> {
    document
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "resource")
        .filter_map(|node| {
            let entry = ManifestEntry::from_node(node);
            if entry.is_none() {
                debug!("Ignoring resource declaration without identifier");
            }
            entry
        })
        .collect()
}

/// Manifest declarations indexed by identifier (first declaration wins).
struct ManifestIndex<'e, 'a> {
    entries: &'e [ManifestEntry<'a>],
    by_identifier: HashMap<&'a str, usize>,
}

impl<'e, 'a> ManifestIndex<'e, 'a> {
    fn new(entries: &'e [ManifestEntry<'a>]) -> Self {
        let mut by_identifier = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            by_identifier.entry(entry.identifier).or_insert(position);
        }
        Self {
            entries,
            by_identifier,
        }
    }

    fn get(&self, identifier: &str) -> Option<&ManifestEntry<'a>> {
        self.by_identifier
            .get(identifier)
            .map(|&position| &self.entries[position])
    }

    /// Resolve an entry's dependency to its declaration and file path.
    ///
    /// `Ok(None)` when the entry declares no dependency. A declared
    /// dependency that is missing or has no href is a manifest logic error.
    fn dependency_of(
        &self,
        entry: &ManifestEntry<'a>,
    ) -> Result<Option<(&ManifestEntry<'a>, &'a str)>> {
        let Some(dependency) = entry.dependency else {
            return Ok(None);
        };

        let target = self
            .get(dependency)
            .ok_or_else(|| AnalysisError::UnresolvedDependency {
                resource: entry.identifier.to_string(),
                dependency: dependency.to_string(),
            })?;

        let href = target
            .href
            .ok_or_else(|| AnalysisError::DependencyWithoutHref {
                resource: entry.identifier.to_string(),
                dependency: dependency.to_string(),
            })?;

        Ok(Some((target, href)))
    }
}

fn collect_supporting(
    index: &ManifestIndex<'_, '_>,
    files: &PackageFiles,
    config: &AnalysisConfig,
) -> Result<SupportingResources> {
    let mut supporting = SupportingResources::new();

    for entry in index.entries {
        if !entry.kind.has_supporting_resource()
            || exclusion(entry, &config.asset_prefix).is_some()
        {
            continue;
        }

        if let Some((target, href)) = index.dependency_of(entry)? {
            if files.contains(href) {
                supporting.insert(target.identifier);
            } else {
                debug!(
                    identifier = %entry.identifier,
                    dependency = %target.identifier,
                    href = %href,
                    "Dependency file missing from package"
                );
            }
        }
    }

    Ok(supporting)
}

/// Read title, status and analysis target for one classified entry.
///
/// Returns `Ok(None)` when the strategy cannot determine a clarified type.
fn read_resource<'a>(
    entry: &ManifestEntry<'a>,
    strategy: ContentStrategy,
    index: &ManifestIndex<'_, 'a>,
    files: &PackageFiles,
) -> Result<Option<Resource>> {
    let resource = Resource::new(entry.identifier, strategy.default_type(), entry.content_type);

    let resource = match strategy {
        ContentStrategy::ModuleLink => Some(read_module_link(entry, resource, files)),
        ContentStrategy::Syllabus => Some(read_syllabus(entry, resource, files)),
        ContentStrategy::Page => Some(read_page(entry, resource, files)),
        ContentStrategy::Assignment => Some(read_assignment(entry, resource, files)),
        ContentStrategy::Assessment => read_assessment(entry, resource, index, files)?,
        ContentStrategy::Discussion => read_discussion(entry, resource, index, files)?,
    };

    Ok(resource)
}

fn read_module_link(entry: &ManifestEntry<'_>, resource: Resource, files: &PackageFiles) -> Resource {
    let Some(href) = entry.file_href else {
        return resource;
    };

    let title = files
        .get(href)
        .and_then(|text| xml_or_warn(text, href))
        .and_then(|doc| first_text(doc.root_element(), "title"));

    resource
        .with_title(title_or(title, UNTITLED))
        .with_analysis(AnalysisTarget::Html {
            href: href.to_string(),
        })
}

fn read_syllabus(entry: &ManifestEntry<'_>, resource: Resource, files: &PackageFiles) -> Resource {
    let Some(href) = entry.primary_href() else {
        return resource;
    };

    let title = files
        .get(href)
        .and_then(|text| html_title(&Html::parse_document(text)));

    // No structured status exists for the syllabus.
    resource
        .with_title(title_or(title, UNTITLED))
        .with_published(true)
        .with_analysis(AnalysisTarget::Html {
            href: href.to_string(),
        })
}

fn read_page(entry: &ManifestEntry<'_>, resource: Resource, files: &PackageFiles) -> Resource {
    let Some(href) = entry.primary_href() else {
        return resource;
    };

    let (title, published) = match files.get(href) {
        Some(text) => {
            let document = Html::parse_document(text);
            let published = html_meta(&document, "workflow_state") == Some(ACTIVE);
            (html_title(&document), published)
        }
        None => (None, false),
    };

    resource
        .with_title(title_or(title, UNTITLED))
        .with_published(published)
        .with_analysis(AnalysisTarget::Html {
            href: href.to_string(),
        })
}

fn read_assignment(entry: &ManifestEntry<'_>, resource: Resource, files: &PackageFiles) -> Resource {
    let folder = format!("{}/", entry.identifier);
    let settings_href =
        files.find_path(|p| p.starts_with(&folder) && p.ends_with("assignment_settings.xml"));
    let body_href = files.find_path(|p| p.starts_with(&folder) && p.ends_with(".html"));

    let Some(settings_href) = settings_href else {
        return resource;
    };

    let mut resource = resource;
    if let Some(document) = files
        .get(settings_href)
        .and_then(|text| xml_or_warn(text, settings_href))
    {
        let root = document.root_element();
        resource = resource
            .with_title(title_or(first_text(root, "title"), UNTITLED))
            .with_published(first_text_is(root, "workflow_state", ACTIVE));
    }

    match body_href {
        Some(href) => resource.with_analysis(AnalysisTarget::Html {
            href: href.to_string(),
        }),
        None => resource,
    }
}

fn read_assessment<'a>(
    entry: &ManifestEntry<'a>,
    resource: Resource,
    index: &ManifestIndex<'_, 'a>,
    files: &PackageFiles,
) -> Result<Option<Resource>> {
    let Some((target, href)) = index.dependency_of(entry)? else {
        return Ok(None);
    };
    let Some(text) = files.get(href) else {
        return Ok(None);
    };

    let mut resource = resource.with_identifier_ref(target.identifier);
    if let Some(document) = xml_or_warn(text, href) {
        let root = document.root_element();
        resource = resource
            .with_title(title_or(first_text(root, "title"), UNTITLED))
            .with_published(first_text_is(root, "available", "true"));
        if first_text_is(root, "quiz_type", "survey") {
            resource.clarified_type = ClarifiedType::Survey;
        }
    }

    Ok(Some(resource.with_analysis(AnalysisTarget::XmlWrapped {
        href: href.to_string(),
    })))
}

fn read_discussion<'a>(
    entry: &ManifestEntry<'a>,
    resource: Resource,
    index: &ManifestIndex<'_, 'a>,
    files: &PackageFiles,
) -> Result<Option<Resource>> {
    let Some((target, settings_href)) = index.dependency_of(entry)? else {
        return Ok(None);
    };
    if !files.contains(settings_href) {
        return Ok(None);
    }

    let topic_href = format!("{}.xml", entry.identifier);
    let Some(topic) = files.get(&topic_href) else {
        return Ok(None);
    };

    let mut resource = resource.with_identifier_ref(target.identifier);
    if let Some(document) = xml_or_warn(topic, &topic_href) {
        resource = resource.with_title(title_or(first_text(document.root_element(), "title"), UNTITLED));
    }

    if let Some(settings) = files
        .get(settings_href)
        .and_then(|text| xml_or_warn(text, settings_href))
    {
        let root = settings.root_element();
        resource = resource.with_published(first_text_is(root, "workflow_state", ACTIVE));
        if first_text_is(root, "type", "announcement") {
            resource.clarified_type = ClarifiedType::Announcement;
        }
    }

    Ok(Some(
        resource.with_analysis(AnalysisTarget::DiscussionXml { href: topic_href }),
    ))
}

/// Parse a sub-document, logging and discarding parse failures.
fn xml_or_warn<'t>(text: &'t str, path: &str) -> Option<Document<'t>> {
    match parse_xml(text) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!(path = %path, error = %e, "Malformed XML sub-document, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PackageBuilder;
    use crate::pipeline::classify::{
        DISCUSSION_MARKER, LEARNING_APPLICATION_MARKER, QTI_ASSESSMENT_MARKER, WEB_CONTENT_TYPE,
    };

    fn scan(builder: PackageBuilder) -> ManifestScan {
        scan_manifest(&builder.files(), &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let files = PackageFiles::new().with_entry("wiki_content/a.html", "<p>x</p>");
        let err = build_manifest_inventory(&files, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::ManifestMissing { .. }));
    }

    #[test]
    fn test_malformed_manifest_is_fatal() {
        let files = PackageFiles::new().with_entry("imsmanifest.xml", "<manifest><resources>");
        let err = build_manifest_inventory(&files, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedXml { .. }));
    }

    #[test]
    fn test_page_published_from_meta() {
        let scan = scan(
            PackageBuilder::new()
                .page("p1", "wiki_content/intro.html", "Intro", "active", "<p>Hello</p>")
                .page("p2", "wiki_content/draft.html", "Draft", "unpublished", "<p>WIP</p>"),
        );

        assert_eq!(scan.resources.len(), 2);
        let intro = &scan.resources[0];
        assert_eq!(intro.clarified_type, ClarifiedType::Page);
        assert_eq!(intro.title, "Intro");
        assert!(intro.published);
        assert_eq!(intro.analysis_href(), Some("wiki_content/intro.html"));
        assert_eq!(intro.analysis_type(), Some("html"));
        assert!(!scan.resources[1].published);
    }

    #[test]
    fn test_page_with_missing_file_keeps_defaults() {
        let scan = scan(PackageBuilder::new().resource(
            "p1",
            WEB_CONTENT_TYPE,
            Some("wiki_content/gone.html"),
            None,
        ));

        assert_eq!(scan.resources.len(), 1);
        assert_eq!(scan.resources[0].title, UNTITLED);
        assert!(!scan.resources[0].published);
        assert_eq!(scan.resources[0].analysis_href(), Some("wiki_content/gone.html"));
    }

    #[test]
    fn test_survey_detected_and_dependency_excluded() {
        let scan = scan(PackageBuilder::new().quiz(
            "q1",
            "q1_meta",
            "Course Survey",
            "survey",
            true,
            "<p>Tell us</p>",
        ));

        assert_eq!(scan.resources.len(), 1);
        let survey = &scan.resources[0];
        assert_eq!(survey.clarified_type, ClarifiedType::Survey);
        assert_eq!(survey.title, "Course Survey");
        assert!(survey.published);
        assert_eq!(survey.identifier_ref.as_deref(), Some("q1_meta"));
        assert_eq!(survey.analysis_type(), Some("xml"));
        assert!(scan.supporting.contains("q1_meta"));
        assert!(scan.resources.iter().all(|r| r.identifier != "q1_meta"));
    }

    #[test]
    fn test_dependency_declared_before_referencer_is_still_skipped() {
        let builder = PackageBuilder::new()
            .resource("q1_meta", LEARNING_APPLICATION_MARKER, Some("q1/assessment_meta.html"), None)
            .resource("q1", QTI_ASSESSMENT_MARKER, None, Some("q1_meta"))
            .file(
                "q1/assessment_meta.html",
                "<quiz><title>Quiz</title><quiz_type>assignment</quiz_type></quiz>",
            );

        let scan = scan(builder);
        let ids: Vec<_> = scan.resources.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["q1"]);
        assert_eq!(scan.resources[0].clarified_type, ClarifiedType::Quiz);
    }

    #[test]
    fn test_unresolved_dependency_is_fatal() {
        let builder =
            PackageBuilder::new().resource("q1", QTI_ASSESSMENT_MARKER, None, Some("missing"));
        let err = scan_manifest(&builder.files(), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnresolvedDependency { .. }));
    }

    #[test]
    fn test_dependency_without_href_is_fatal() {
        let builder = PackageBuilder::new()
            .resource("d1", DISCUSSION_MARKER, None, Some("d1_settings"))
            .resource("d1_settings", LEARNING_APPLICATION_MARKER, None, None);
        let err = scan_manifest(&builder.files(), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::DependencyWithoutHref { .. }));
    }

    #[test]
    fn test_announcement_from_settings_type() {
        let scan = scan(
            PackageBuilder::new()
                .discussion("d1", "d1_settings", "Welcome", "announcement", "active", "<p>Hi</p>")
                .discussion("d2", "d2_settings", "Week 1 Forum", "topic", "unpublished", "<p>Post</p>"),
        );

        assert_eq!(scan.resources.len(), 2);
        assert_eq!(scan.resources[0].clarified_type, ClarifiedType::Announcement);
        assert!(scan.resources[0].published);
        assert_eq!(scan.resources[0].analysis_href(), Some("d1.xml"));
        assert_eq!(scan.resources[0].analysis_type(), Some("discussion_xml"));
        assert_eq!(scan.resources[1].clarified_type, ClarifiedType::Discussion);
        assert!(!scan.resources[1].published);
        assert!(scan.supporting.contains("d1_settings"));
        assert!(scan.supporting.contains("d2_settings"));
    }

    #[test]
    fn test_discussion_without_topic_file_is_dropped() {
        let builder = PackageBuilder::new()
            .resource("d1", DISCUSSION_MARKER, None, Some("d1_settings"))
            .resource("d1_settings", LEARNING_APPLICATION_MARKER, Some("d1_settings.xml"), None)
            .file("d1_settings.xml", "<topicMeta><type>topic</type></topicMeta>");

        let scan = scan(builder);
        assert!(scan.resources.is_empty());
        assert!(scan.supporting.contains("d1_settings"));
    }

    #[test]
    fn test_assignment_reads_sibling_files() {
        let scan = scan(PackageBuilder::new().assignment(
            "a1",
            "Essay 1",
            "active",
            "<p>Write an essay</p>",
        ));

        assert_eq!(scan.resources.len(), 1);
        let assignment = &scan.resources[0];
        assert_eq!(assignment.clarified_type, ClarifiedType::Assignment);
        assert_eq!(assignment.title, "Essay 1");
        assert!(assignment.published);
        assert_eq!(assignment.analysis_href(), Some("a1/essay-1.html"));
    }

    #[test]
    fn test_syllabus_always_published() {
        let scan = scan(PackageBuilder::new().syllabus("<p>Grading policy</p>"));
        assert_eq!(scan.resources.len(), 1);
        assert_eq!(scan.resources[0].clarified_type, ClarifiedType::Syllabus);
        assert!(scan.resources[0].published);
    }

    #[test]
    fn test_module_link_title_from_xml() {
        let scan = scan(PackageBuilder::new().web_link("l1", "Library", "https://library.example.edu"));
        assert_eq!(scan.resources.len(), 1);
        assert_eq!(scan.resources[0].clarified_type, ClarifiedType::ModuleLink);
        assert_eq!(scan.resources[0].title, "Library");
        assert_eq!(scan.resources[0].analysis_href(), Some("l1.xml"));
    }

    #[test]
    fn test_excluded_and_unclassified_resources_dropped() {
        let scan = scan(
            PackageBuilder::new()
                .resource("lti1", "imsbasiclti_xmlv1p3", None, None)
                .resource("bank1", LEARNING_APPLICATION_MARKER, Some("non_cc_assessments/b.xml.qti"), None)
                .resource("settings", LEARNING_APPLICATION_MARKER, Some("course_settings/canvas_export.txt"), None)
                .resource("img", WEB_CONTENT_TYPE, Some("web_resources/logo.png"), None)
                .resource("pdf", WEB_CONTENT_TYPE, Some("files/notes.pdf"), None),
        );
        assert!(scan.resources.is_empty());
    }

    #[test]
    fn test_duplicate_identifiers_kept_once() {
        let scan = scan(
            PackageBuilder::new()
                .page("p1", "wiki_content/a.html", "A", "active", "<p>A</p>")
                .page("p1", "wiki_content/b.html", "B", "active", "<p>B</p>"),
        );
        assert_eq!(scan.resources.len(), 1);
        assert_eq!(scan.resources[0].title, "A");
    }
}
