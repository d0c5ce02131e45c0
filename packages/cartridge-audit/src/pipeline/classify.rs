//! Resource classification table.
//!
//! Every manifest `<resource>` is reduced to a [`ManifestEntry`] and run
//! through [`RULES`] in order. The first rule whose predicate holds decides
//! the clarified type and how the resource's content is read.
//!
//! Rules never overlap: each raw `type` string maps to exactly one
//! [`ManifestResourceKind`], every rule except the syllabus rule is keyed
//! on a distinct kind, and the syllabus rule is excluded from the kinds and
//! identifiers the other rules claim.

use roxmltree::Node;

use crate::pipeline::markup::{child_element, first_element};
use crate::types::resource::ClarifiedType;

pub const WEB_LINK_TYPE: &str = "imswl_xmlv1p1";
pub const WEB_CONTENT_TYPE: &str = "webcontent";
pub const BASIC_LTI_TYPE: &str = "imsbasiclti_xmlv1p3";
pub const LEARNING_APPLICATION_MARKER: &str =
    "associatedcontent/imscc_xmlv1p1/learning-application-resource";
pub const QTI_ASSESSMENT_MARKER: &str = "imsqti_xmlv1p2/imscc_xmlv1p1/assessment";
pub const DISCUSSION_MARKER: &str = "imsdt_xmlv1p1";

pub const WIKI_CONTENT_PREFIX: &str = "wiki_content/";
pub const COURSE_SETTINGS_PREFIX: &str = "course_settings/";
pub const QUESTION_BANK_MARKER: &str = "non_cc_assessments";
pub const COURSE_SETTINGS_SENTINEL: &str = "canvas_export.txt";
pub const SYLLABUS_SUFFIX: &str = "_syllabus";

/// Coarse kind of a raw manifest `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestResourceKind {
    WebLink,
    WebContent,
    BasicLti,
    LearningApplication,
    QtiAssessment,
    DiscussionTopic,
    Other,
}

impl ManifestResourceKind {
    pub fn from_type(raw: &str) -> Self {
        if raw == WEB_LINK_TYPE {
            Self::WebLink
        } else if raw == WEB_CONTENT_TYPE {
            Self::WebContent
        } else if raw == BASIC_LTI_TYPE {
            Self::BasicLti
        } else if raw.contains(LEARNING_APPLICATION_MARKER) {
            Self::LearningApplication
        } else if raw.contains(QTI_ASSESSMENT_MARKER) {
            Self::QtiAssessment
        } else if raw.contains(DISCUSSION_MARKER) {
            Self::DiscussionTopic
        } else {
            Self::Other
        }
    }

    /// Whether resources of this kind keep their metadata in a dependency.
    pub fn has_supporting_resource(&self) -> bool {
        matches!(self, Self::QtiAssessment | Self::DiscussionTopic)
    }
}

/// Borrowed view of one manifest `<resource>` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestEntry<'a> {
    pub identifier: &'a str,
    pub content_type: &'a str,
    pub kind: ManifestResourceKind,
    pub href: Option<&'a str>,
    /// `href` of the first `<file>` child
    pub file_href: Option<&'a str>,
    /// `identifierref` of the first `<dependency>` child
    pub dependency: Option<&'a str>,
}

impl<'a> ManifestEntry<'a> {
    /// Build from a `<resource>` element. Returns `None` without an identifier.
    pub fn from_node(node: Node<'a, '_>) -> Option<Self> {
        let identifier = node.attribute("identifier").filter(|id| !id.is_empty())?;
        let content_type = node.attribute("type").unwrap_or_default();

        Some(Self {
            identifier,
            content_type,
            kind: ManifestResourceKind::from_type(content_type),
            href: node.attribute("href").filter(|h| !h.is_empty()),
            file_href: child_element(node, "file")
                .or_else(|| first_element(node, "file"))
                .and_then(|f| f.attribute("href"))
                .filter(|h| !h.is_empty()),
            dependency: child_element(node, "dependency")
                .and_then(|d| d.attribute("identifierref"))
                .filter(|d| !d.is_empty()),
        })
    }

    /// Test/fixture constructor.
    pub fn new(identifier: &'a str, content_type: &'a str) -> Self {
        Self {
            identifier,
            content_type,
            kind: ManifestResourceKind::from_type(content_type),
            href: None,
            file_href: None,
            dependency: None,
        }
    }

    pub fn with_href(mut self, href: &'a str) -> Self {
        self.href = Some(href);
        self
    }

    pub fn with_file_href(mut self, href: &'a str) -> Self {
        self.file_href = Some(href);
        self
    }

    pub fn with_dependency(mut self, identifier: &'a str) -> Self {
        self.dependency = Some(identifier);
        self
    }

    /// The file holding this resource's own content.
    pub fn primary_href(&self) -> Option<&'a str> {
        self.file_href.or(self.href)
    }

    fn href_starts_with(&self, prefix: &str) -> bool {
        self.href.is_some_and(|h| h.starts_with(prefix))
    }

    fn href_contains(&self, marker: &str) -> bool {
        self.href.is_some_and(|h| h.contains(marker))
    }

    fn has_syllabus_identifier(&self) -> bool {
        self.identifier.ends_with(SYLLABUS_SUFFIX)
    }
}

/// Why a resource is left out of the inventory before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    ExternalTool,
    QuestionBank,
    CourseSettings,
    Asset,
}

/// Check the outright exclusion rules.
pub fn exclusion(entry: &ManifestEntry<'_>, asset_prefix: &str) -> Option<Exclusion> {
    if entry.kind == ManifestResourceKind::BasicLti {
        Some(Exclusion::ExternalTool)
    } else if entry.href_contains(QUESTION_BANK_MARKER) {
        Some(Exclusion::QuestionBank)
    } else if entry.href_contains(COURSE_SETTINGS_SENTINEL) {
        Some(Exclusion::CourseSettings)
    } else if entry.kind == ManifestResourceKind::WebContent
        && !asset_prefix.is_empty()
        && entry.href_starts_with(asset_prefix)
    {
        Some(Exclusion::Asset)
    } else {
        None
    }
}

/// How a classified resource's title, status and analysis target are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStrategy {
    /// Own XML file: title only, links in `<url href>`
    ModuleLink,
    /// Own HTML file, always published
    Syllabus,
    /// Own HTML file, status from a `workflow_state` meta tag
    Page,
    /// Sibling `assignment_settings.xml` plus sibling `.html` body
    Assignment,
    /// Dependency's XML metadata, body in `<description>`
    Assessment,
    /// `{identifier}.xml` topic plus dependency settings, body in `<text>`
    Discussion,
}

impl ContentStrategy {
    /// Tag assigned before any sub-document is consulted.
    pub fn default_type(&self) -> ClarifiedType {
        match self {
            ContentStrategy::ModuleLink => ClarifiedType::ModuleLink,
            ContentStrategy::Syllabus => ClarifiedType::Syllabus,
            ContentStrategy::Page => ClarifiedType::Page,
            ContentStrategy::Assignment => ClarifiedType::Assignment,
            ContentStrategy::Assessment => ClarifiedType::Quiz,
            ContentStrategy::Discussion => ClarifiedType::Discussion,
        }
    }
}

/// One row of the classification table.
pub struct ClassificationRule {
    pub name: &'static str,
    pub predicate: fn(&ManifestEntry<'_>) -> bool,
    pub strategy: ContentStrategy,
}

fn is_module_link(e: &ManifestEntry<'_>) -> bool {
    e.kind == ManifestResourceKind::WebLink && e.file_href.is_some()
}

fn is_syllabus(e: &ManifestEntry<'_>) -> bool {
    e.has_syllabus_identifier()
        && e.href.is_some()
        && !matches!(
            e.kind,
            ManifestResourceKind::WebLink
                | ManifestResourceKind::QtiAssessment
                | ManifestResourceKind::DiscussionTopic
        )
}

fn is_page(e: &ManifestEntry<'_>) -> bool {
    e.kind == ManifestResourceKind::WebContent
        && e.href_starts_with(WIKI_CONTENT_PREFIX)
        && !e.has_syllabus_identifier()
}

fn is_assignment(e: &ManifestEntry<'_>) -> bool {
    e.kind == ManifestResourceKind::LearningApplication
        && e.href.is_some_and(|h| h.ends_with("html"))
        && !e.href_starts_with(COURSE_SETTINGS_PREFIX)
        && !e.has_syllabus_identifier()
}

fn is_assessment(e: &ManifestEntry<'_>) -> bool {
    e.kind == ManifestResourceKind::QtiAssessment
}

fn is_discussion(e: &ManifestEntry<'_>) -> bool {
    e.kind == ManifestResourceKind::DiscussionTopic
}

/// The classification table, in priority order.
pub static RULES: [ClassificationRule; 6] = [
    ClassificationRule {
        name: "module-link",
        predicate: is_module_link,
        strategy: ContentStrategy::ModuleLink,
    },
    ClassificationRule {
        name: "syllabus",
        predicate: is_syllabus,
        strategy: ContentStrategy::Syllabus,
    },
    ClassificationRule {
        name: "page",
        predicate: is_page,
        strategy: ContentStrategy::Page,
    },
    ClassificationRule {
        name: "assignment",
        predicate: is_assignment,
        strategy: ContentStrategy::Assignment,
    },
    ClassificationRule {
        name: "assessment",
        predicate: is_assessment,
        strategy: ContentStrategy::Assessment,
    },
    ClassificationRule {
        name: "discussion",
        predicate: is_discussion,
        strategy: ContentStrategy::Discussion,
    },
];

/// Find the rule that applies to an entry, if any.
pub fn classify(entry: &ManifestEntry<'_>) -> Option<&'static ClassificationRule> {
    let mut matching = RULES.iter().filter(|rule| (rule.predicate)(entry));
    let rule = matching.next()?;
    debug_assert!(
        matching.next().is_none(),
        "overlapping classification rules for {}",
        entry.identifier
    );
    Some(rule)
}
