//! Content objects extracted from resource documents.
//!
//! Every object carries `parent_resource_identifier`, a back-reference to
//! the resource it was found in. Objects never own their resource.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Internal reference through a package placeholder token
    Course,
    /// Host under one of the configured institution domains
    Institution,
    External,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Course => "course",
            LinkType::Institution => "institution",
            LinkType::External => "external",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound link found in a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkObject {
    pub url: String,

    /// Trimmed visible text of the carrier element
    pub text: String,

    #[serde(rename = "type")]
    pub link_type: LinkType,

    pub parent_resource_identifier: String,
}

/// Placeholder anchor text for attachments with no visible text.
pub const PHANTOM_LINK_TEXT: &str = "(REMEDIATE: Phantom Link)";

/// A file attachment linked from a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub href: String,

    /// Visible anchor text, or [`PHANTOM_LINK_TEXT`]
    pub parent_anchor_text: String,

    /// Extension including the leading dot (e.g. `.pdf`)
    pub extension: Option<String>,

    pub parent_resource_identifier: String,
}

impl FileObject {
    /// Whether the anchor had no visible text.
    pub fn is_phantom(&self) -> bool {
        self.parent_anchor_text == PHANTOM_LINK_TEXT
    }

    /// Reviewer-facing name for the file kind, when the extension is common.
    pub fn extension_label(&self) -> Option<&'static str> {
        let ext = self.extension.as_deref()?.to_ascii_lowercase();
        let label = match ext.as_str() {
            ".ppt" => "PowerPoint (ppt)",
            ".pptx" => "PowerPoint (pptx)",
            ".doc" => "Word (doc)",
            ".docx" => "Word (docx)",
            ".xls" => "Excel (xls)",
            ".xlsx" => "Excel (xlsx)",
            ".csv" => "CSV (csv)",
            ".jpg" => "Image (jpg)",
            ".jpeg" => "Image (jpeg)",
            ".png" => "Image (png)",
            ".gif" => "Image (gif)",
            ".mp4" => "Video (mp4)",
            ".mp3" => "Audio (mp3)",
            ".pdf" => "PDF",
            ".txt" => "Text File",
            ".zip" => "ZIP Archive",
            ".rar" => "RAR Archive",
            _ => return None,
        };
        Some(label)
    }
}

/// Known video hosting platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoPlatform {
    Youtube,
    Vimeo,
    Mediasite,
    Echo360,
    Panopto,
    Instructure,
    ExternalTools,
}

impl VideoPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoPlatform::Youtube => "youtube",
            VideoPlatform::Vimeo => "vimeo",
            VideoPlatform::Mediasite => "mediasite",
            VideoPlatform::Echo360 => "echo360",
            VideoPlatform::Panopto => "panopto",
            VideoPlatform::Instructure => "instructure",
            VideoPlatform::ExternalTools => "external_tools",
        }
    }
}

impl fmt::Display for VideoPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a video reaches the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    /// `<video>` or `<iframe>`
    Embed,
    /// Plain anchor to a video page
    Link,
}

/// Placeholder title for videos whose carrier has none.
pub const UNTITLED_VIDEO: &str = "(REMEDIATE: Title Not Found)";

/// A video found in a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoObject {
    pub title: String,
    pub platform: VideoPlatform,
    pub kind: VideoKind,
    pub src: String,

    /// Whether adjacent markup mentions a transcript or captions.
    ///
    /// Heuristic only: a mention is not proof the material exists.
    pub transcript_or_caption_mentioned: bool,

    pub parent_resource_identifier: String,
}
