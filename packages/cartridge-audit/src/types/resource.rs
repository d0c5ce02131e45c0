//! Resource types - classified manifest entries and their analysis targets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::finding::AccessibilityFinding;
use crate::types::objects::{FileObject, LinkObject, VideoObject};

/// Literal title used when a resource or module carries none.
pub const UNTITLED: &str = "untitled";

/// Normalized content category of a resource.
///
/// This is a closed set: a manifest resource that maps to none of these
/// is dropped during the inventory scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClarifiedType {
    ModuleLink,
    Syllabus,
    Page,
    Assignment,
    Quiz,
    Survey,
    Discussion,
    Announcement,
}

impl ClarifiedType {
    /// All clarified types, in classification-table order.
    pub const ALL: [ClarifiedType; 8] = [
        ClarifiedType::ModuleLink,
        ClarifiedType::Syllabus,
        ClarifiedType::Page,
        ClarifiedType::Assignment,
        ClarifiedType::Quiz,
        ClarifiedType::Survey,
        ClarifiedType::Discussion,
        ClarifiedType::Announcement,
    ];

    /// Stable tag, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClarifiedType::ModuleLink => "module-link",
            ClarifiedType::Syllabus => "syllabus",
            ClarifiedType::Page => "page",
            ClarifiedType::Assignment => "assignment",
            ClarifiedType::Quiz => "quiz",
            ClarifiedType::Survey => "survey",
            ClarifiedType::Discussion => "discussion",
            ClarifiedType::Announcement => "announcement",
        }
    }

    /// Reviewer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            ClarifiedType::ModuleLink => "link",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ClarifiedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which file holds a resource's rich content, and how to unwrap it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisTarget {
    /// The file is an HTML document (pages, syllabus, assignment bodies,
    /// module-link entries).
    Html { href: String },

    /// Quiz metadata: HTML escaped inside a `<description>` element.
    XmlWrapped { href: String },

    /// Discussion topic: HTML escaped inside a `<text>` element.
    DiscussionXml { href: String },
}

impl AnalysisTarget {
    pub fn href(&self) -> &str {
        match self {
            AnalysisTarget::Html { href }
            | AnalysisTarget::XmlWrapped { href }
            | AnalysisTarget::DiscussionXml { href } => href,
        }
    }

    /// Name of the XML element whose text is the embedded HTML, if any.
    pub fn wrapper_element(&self) -> Option<&'static str> {
        match self {
            AnalysisTarget::Html { .. } => None,
            AnalysisTarget::XmlWrapped { .. } => Some("description"),
            AnalysisTarget::DiscussionXml { .. } => Some("text"),
        }
    }

    /// Short name of the parse mode.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisTarget::Html { .. } => "html",
            AnalysisTarget::XmlWrapped { .. } => "xml",
            AnalysisTarget::DiscussionXml { .. } => "discussion_xml",
        }
    }
}

/// A classified manifest resource.
///
/// Created once by the manifest scan. After that only the reconciler
/// (`module_title`) and the extractor/auditor (object lists, findings)
/// write to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Manifest identifier, unique within an inventory
    pub identifier: String,

    pub title: String,

    /// Dependency pointer declared by quiz/discussion wrappers
    pub identifier_ref: Option<String>,

    pub published: bool,

    pub clarified_type: ClarifiedType,

    /// Raw manifest `type` attribute
    pub content_type: String,

    /// Rich-content source for extraction and auditing
    pub analysis: Option<AnalysisTarget>,

    /// Title of the module that links to this resource (set by reconciliation)
    pub module_title: Option<String>,

    #[serde(default)]
    pub links: Vec<LinkObject>,

    #[serde(default)]
    pub videos: Vec<VideoObject>,

    #[serde(default)]
    pub attachments: Vec<FileObject>,

    /// `None` until an audit has run successfully on this resource
    pub accessibility_results: Option<Vec<AccessibilityFinding>>,
}

impl Resource {
    /// Create a new resource with an empty content inventory.
    pub fn new(
        identifier: impl Into<String>,
        clarified_type: ClarifiedType,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: UNTITLED.to_string(),
            identifier_ref: None,
            published: false,
            clarified_type,
            content_type: content_type.into(),
            analysis: None,
            module_title: None,
            links: Vec::new(),
            videos: Vec::new(),
            attachments: Vec::new(),
            accessibility_results: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn with_identifier_ref(mut self, identifier_ref: impl Into<String>) -> Self {
        self.identifier_ref = Some(identifier_ref.into());
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisTarget) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Path of the analysis document, if one was designated.
    pub fn analysis_href(&self) -> Option<&str> {
        self.analysis.as_ref().map(|a| a.href())
    }

    /// Parse mode of the analysis document, if one was designated.
    pub fn analysis_type(&self) -> Option<&'static str> {
        self.analysis.as_ref().map(|a| a.kind())
    }

    /// Total number of content objects found in this resource.
    pub fn object_count(&self) -> usize {
        self.links.len() + self.videos.len() + self.attachments.len()
    }
}
