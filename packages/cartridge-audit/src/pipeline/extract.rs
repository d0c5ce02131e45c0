//! Content object extraction - links, attachments and videos.
//!
//! Each scan is a pure function of the parsed fragment and the owning
//! resource's identifier. Running extraction twice over unchanged package
//! contents yields identical object lists.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::pipeline::content::{resolve_fragment, AuditBodies};
use crate::types::{
    config::AnalysisConfig,
    objects::{
        FileObject, LinkObject, LinkType, VideoKind, VideoObject, VideoPlatform,
        PHANTOM_LINK_TEXT, UNTITLED_VIDEO,
    },
    package::PackageFiles,
    resource::Resource,
};

/// CSS classes the LMS puts on anchors to uploaded files.
pub const FILE_LINK_CLASSES: [&str; 2] = ["instructure_file_link", "instructure_scribd_file"];

/// Placeholder tokens marking a reference to another part of the package.
const COURSE_LINK_PREFIX: &str = "$CANVAS";
const WIKI_REFERENCE_TOKEN: &str = "$WIKI_REFERENCE$";

/// Provider URL fragments, matched against the lowercased source.
///
/// Scanned top to bottom; a later match overrides an earlier one, so the
/// more specific LMS-hosted entries sit at the end.
const VIDEO_PLATFORMS: &[(VideoPlatform, &[&str])] = &[
    (
        VideoPlatform::Youtube,
        &["youtube.com/embed/", "youtube.com/watch", "youtu.be"],
    ),
    (VideoPlatform::Vimeo, &["player.vimeo.com", "vimeo.com"]),
    (
        VideoPlatform::Mediasite,
        &["/mediasite/lti/home/coverplay", "/mediasite/play"],
    ),
    (VideoPlatform::Echo360, &["echo360.com/media"]),
    (VideoPlatform::Panopto, &["hosted.panopto.com"]),
    (
        VideoPlatform::Instructure,
        &["instructuremedia.com", "media_attachments_iframe"],
    ),
    (VideoPlatform::ExternalTools, &["external_tools"]),
];

lazy_static! {
    static ref ANCHOR_SELECTOR: Selector = Selector::parse("a[href]").unwrap();
    static ref URL_SELECTOR: Selector = Selector::parse("url[href]").unwrap();
    static ref FILE_LINK_SELECTOR: Selector =
        Selector::parse("a.instructure_file_link, a.instructure_scribd_file").unwrap();
    static ref VIDEO_SELECTOR: Selector = Selector::parse("video").unwrap();
    static ref SOURCE_SELECTOR: Selector = Selector::parse("source").unwrap();
    static ref IFRAME_SELECTOR: Selector = Selector::parse("iframe").unwrap();
    static ref ALL_ANCHORS_SELECTOR: Selector = Selector::parse("a").unwrap();
    static ref EXTENSION_PATTERN: Regex = Regex::new(r"\.[A-Za-z0-9]+$").unwrap();
    static ref TRANSCRIPT_PATTERN: Regex = Regex::new(r"(?i)transcript|caption").unwrap();
}

/// Objects found in one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentObjects {
    pub links: Vec<LinkObject>,
    pub attachments: Vec<FileObject>,
    pub videos: Vec<VideoObject>,
}

/// Populate links, attachments and videos on every resource with a
/// resolvable analysis target.
///
/// Resources without a target, or whose target file is missing, are left
/// untouched. Object lists are replaced, never appended to. Each parsed
/// fragment's body is recorded for the audit stage.
pub fn extract_content_objects(
    resources: &mut [Resource],
    files: &PackageFiles,
    config: &AnalysisConfig,
) -> AuditBodies {
    let mut scanned = 0usize;
    let mut bodies = AuditBodies::new();

    for resource in resources.iter_mut() {
        let Some(target) = resource.analysis.as_ref() else {
            continue;
        };
        let Some(document) = resolve_fragment(target, files) else {
            continue;
        };

        let objects = scan_document(&document, &resource.identifier, config);
        debug!(
            identifier = %resource.identifier,
            links = objects.links.len(),
            attachments = objects.attachments.len(),
            videos = objects.videos.len(),
            "Extracted content objects"
        );

        resource.links = objects.links;
        resource.attachments = objects.attachments;
        resource.videos = objects.videos;
        bodies.record(&resource.identifier, &document);
        scanned += 1;
    }

    info!(
        resources = resources.len(),
        scanned,
        auditable = bodies.len(),
        "Content object extraction complete"
    );

    bodies
}

/// Run all three scans over one document.
pub fn scan_document(document: &Html, parent: &str, config: &AnalysisConfig) -> ContentObjects {
    ContentObjects {
        links: find_links(document, parent, config),
        attachments: find_attachments(document, parent),
        videos: find_videos(document, parent),
    }
}

/// Outbound links: anchors first, then module-link `<url>` entries.
pub fn find_links(document: &Html, parent: &str, config: &AnalysisConfig) -> Vec<LinkObject> {
    document
        .select(&ANCHOR_SELECTOR)
        .chain(document.select(&URL_SELECTOR))
        .filter(|el| !is_file_link(el))
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            if !is_followable(href) {
                return None;
            }
            Some(LinkObject {
                url: href.to_string(),
                text: visible_text(&el),
                link_type: classify_link(href, config),
                parent_resource_identifier: parent.to_string(),
            })
        })
        .collect()
}

/// Whether an href points somewhere other than the same page or a mail client.
pub fn is_followable(href: &str) -> bool {
    !href.is_empty() && !href.starts_with('#') && !href.starts_with("mailto")
}

/// Classify a link target.
pub fn classify_link(href: &str, config: &AnalysisConfig) -> LinkType {
    if href.starts_with(COURSE_LINK_PREFIX) || href.contains(WIKI_REFERENCE_TOKEN) {
        return LinkType::Course;
    }

    let institutional = parse_absolute(href)
        .ok()
        .and_then(|url| url.host_str().map(|host| config.is_institution_host(host)))
        .unwrap_or(false);

    if institutional {
        LinkType::Institution
    } else {
        LinkType::External
    }
}

/// Parse an absolute or protocol-relative URL.
fn parse_absolute(href: &str) -> Result<Url, url::ParseError> {
    match href.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")),
        None => Url::parse(href),
    }
}

/// File attachments: anchors carrying an LMS file-link class.
pub fn find_attachments(document: &Html, parent: &str) -> Vec<FileObject> {
    document
        .select(&FILE_LINK_SELECTOR)
        .map(|el| {
            let href = el.value().attr("href").unwrap_or_default();
            let text = visible_text(&el);

            FileObject {
                href: href.to_string(),
                parent_anchor_text: if text.is_empty() {
                    PHANTOM_LINK_TEXT.to_string()
                } else {
                    text
                },
                extension: file_extension(href),
                parent_resource_identifier: parent.to_string(),
            }
        })
        .collect()
}

/// Last dot-suffix of the path, ignoring any query or fragment.
pub fn file_extension(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    EXTENSION_PATTERN.find(path).map(|m| m.as_str().to_string())
}

/// Videos: native `<video>`, then iframes, then anchors.
pub fn find_videos(document: &Html, parent: &str) -> Vec<VideoObject> {
    let natives = document.select(&VIDEO_SELECTOR).map(|el| {
        let src = el
            .select(&SOURCE_SELECTOR)
            .next()
            .and_then(|source| source.value().attr("src"))
            .unwrap_or_default();
        let platform = video_platform(src).unwrap_or(VideoPlatform::Instructure);
        (el, src, title_attr(&el), VideoKind::Embed, Some(platform))
    });

    let iframes = document.select(&IFRAME_SELECTOR).map(|el| {
        let src = el.value().attr("src").unwrap_or_default();
        (el, src, title_attr(&el), VideoKind::Embed, video_platform(src))
    });

    let anchors = document.select(&ALL_ANCHORS_SELECTOR).map(|el| {
        let src = el.value().attr("href").unwrap_or_default();
        (el, src, visible_text(&el), VideoKind::Link, video_platform(src))
    });

    natives
        .chain(iframes)
        .chain(anchors)
        .filter_map(|(el, src, title, kind, platform)| {
            Some(VideoObject {
                title: if title.is_empty() {
                    UNTITLED_VIDEO.to_string()
                } else {
                    title
                },
                platform: platform?,
                kind,
                src: src.to_string(),
                transcript_or_caption_mentioned: mentions_transcript(&el),
                parent_resource_identifier: parent.to_string(),
            })
        })
        .collect()
}

/// Match a source against the provider table.
pub fn video_platform(src: &str) -> Option<VideoPlatform> {
    let src = src.to_lowercase();
    VIDEO_PLATFORMS
        .iter()
        .filter(|(_, fragments)| fragments.iter().any(|f| src.contains(f)))
        .map(|(platform, _)| *platform)
        .last()
}

/// Whether markup next to a carrier mentions a transcript or captions.
///
/// Looks at the carrier's enclosing `<p>` (or the carrier itself when it
/// has none): one element sibling back, two forward.
fn mentions_transcript(carrier: &ElementRef<'_>) -> bool {
    let root = carrier
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|parent| parent.value().name() == "p")
        .unwrap_or(*carrier);

    let previous = root.prev_siblings().find_map(ElementRef::wrap);
    let following = root.next_siblings().filter_map(ElementRef::wrap).take(2);

    previous
        .into_iter()
        .chain(following)
        .any(|sibling| TRANSCRIPT_PATTERN.is_match(&sibling.inner_html()))
}

fn is_file_link(el: &ElementRef<'_>) -> bool {
    el.value()
        .classes()
        .any(|class| FILE_LINK_CLASSES.contains(&class))
}

fn visible_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn title_attr(el: &ElementRef<'_>) -> String {
    el.value().attr("title").unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default().with_institution_domains(["institution.edu"])
    }

    fn fragment(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn test_link_classification() {
        let doc = fragment(
            r##"<p>
                <a href="https://sub.institution.edu/x">Portal</a>
                <a href="//canvas.institution.edu/courses/1">Canvas</a>
                <a href="https://institution.edu.evil.com/">Lookalike</a>
                <a href="$CANVAS_OBJECT_REFERENCE$/quizzes/q1">Quiz</a>
                <a href="$WIKI_REFERENCE$/pages/intro">Intro</a>
                <a href="https://example.com/"> Example </a>
                <a href="#top">Top</a>
                <a href="mailto:prof@institution.edu">Mail</a>
                <a href="">Empty</a>
                <a class="instructure_file_link" href="$IMS-CC-FILEBASE$/notes.pdf">Notes</a>
                <a href="//cdn.example.com/lib.js">Script</a>
            </p>"##,
        );

        let links = find_links(&doc, "p1", &config());
        let summary: Vec<_> = links.iter().map(|l| (l.text.as_str(), l.link_type)).collect();
        assert_eq!(
            summary,
            vec![
                ("Portal", LinkType::Institution),
                ("Canvas", LinkType::Institution),
                ("Lookalike", LinkType::External),
                ("Quiz", LinkType::Course),
                ("Intro", LinkType::Course),
                ("Example", LinkType::External),
                ("Script", LinkType::External),
            ]
        );
        assert!(links.iter().all(|l| l.parent_resource_identifier == "p1"));
    }

    #[test]
    fn test_module_link_url_elements() {
        let doc = Html::parse_document(
            r#"<webLink><title>Library</title><url href="https://library.institution.edu/"/></webLink>"#,
        );
        let links = find_links(&doc, "l1", &config());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://library.institution.edu/");
        assert_eq!(links[0].link_type, LinkType::Institution);
    }

    #[test]
    fn test_attachments() {
        let doc = fragment(
            r#"<a class="instructure_file_link" href="$IMS-CC-FILEBASE$/Week%201/slides.pptx?canvas_download=1">Slides</a>
               <a class="instructure_scribd_file other" href="$IMS-CC-FILEBASE$/reading.PDF"></a>
               <a class="instructure_file_link" href="$IMS-CC-FILEBASE$/README">Readme</a>
               <a href="https://example.com/doc.pdf">Not an attachment</a>"#,
        );

        let files = find_attachments(&doc, "a1");
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].extension.as_deref(), Some(".pptx"));
        assert_eq!(files[0].parent_anchor_text, "Slides");
        assert_eq!(files[0].extension_label(), Some("PowerPoint (pptx)"));
        assert_eq!(files[1].extension.as_deref(), Some(".PDF"));
        assert!(files[1].is_phantom());
        assert_eq!(files[2].extension, None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a/b.docx").as_deref(), Some(".docx"));
        assert_eq!(file_extension("a/b.tar.gz#frag").as_deref(), Some(".gz"));
        assert_eq!(file_extension("a.b/c").as_deref(), None);
        assert_eq!(file_extension("").as_deref(), None);
    }

    #[test]
    fn test_video_platform_table() {
        assert_eq!(
            video_platform("https://www.youtube.com/embed/abc"),
            Some(VideoPlatform::Youtube)
        );
        assert_eq!(video_platform("https://youtu.be/abc"), Some(VideoPlatform::Youtube));
        assert_eq!(
            video_platform("https://player.vimeo.com/video/1"),
            Some(VideoPlatform::Vimeo)
        );
        assert_eq!(
            video_platform("https://mediasite.example.edu/Mediasite/Play/abc"),
            Some(VideoPlatform::Mediasite)
        );
        assert_eq!(
            video_platform("https://x.hosted.panopto.com/Panopto/Pages/Embed.aspx"),
            Some(VideoPlatform::Panopto)
        );
        assert_eq!(
            video_platform("/courses/1/external_tools/retrieve?url=https://youtu.be/x"),
            Some(VideoPlatform::ExternalTools)
        );
        assert_eq!(video_platform("https://example.com/video"), None);
    }

    #[test]
    fn test_iframe_with_transcript_sibling() {
        let doc = fragment(
            r#"<h2>Lecture</h2>
               <p><iframe title="Week 1 Lecture" src="https://www.youtube.com/embed/abc"></iframe></p>
               <p>Read the <a href="transcript.html">Transcript</a></p>"#,
        );

        let videos = find_videos(&doc, "p1");
        assert_eq!(videos.len(), 1);
        let video = &videos[0];
        assert_eq!(video.platform, VideoPlatform::Youtube);
        assert_eq!(video.kind, VideoKind::Embed);
        assert_eq!(video.title, "Week 1 Lecture");
        assert!(video.transcript_or_caption_mentioned);
        assert_eq!(video.parent_resource_identifier, "p1");
    }

    #[test]
    fn test_transcript_window() {
        let far = fragment(
            r#"<p><iframe src="https://player.vimeo.com/video/1"></iframe></p>
               <p>one</p><p>two</p><p>Captions are available</p>"#,
        );
        let videos = find_videos(&far, "p1");
        assert_eq!(videos.len(), 1);
        assert!(!videos[0].transcript_or_caption_mentioned);
        assert_eq!(videos[0].title, UNTITLED_VIDEO);

        let before = fragment(
            r#"<div>Closed CAPTIONS below</div>
               <iframe src="https://player.vimeo.com/video/1"></iframe>"#,
        );
        assert!(find_videos(&before, "p1")[0].transcript_or_caption_mentioned);
    }

    #[test]
    fn test_native_video_and_links() {
        let doc = fragment(
            r#"<video title="Demo"><source src="/media/demo.mp4"></video>
               <a href="https://vimeo.com/123">Watch on Vimeo</a>
               <a href="https://example.com/">Not a video</a>"#,
        );

        let videos = find_videos(&doc, "p1");
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].platform, VideoPlatform::Instructure);
        assert_eq!(videos[0].src, "/media/demo.mp4");
        assert_eq!(videos[0].title, "Demo");
        assert_eq!(videos[1].platform, VideoPlatform::Vimeo);
        assert_eq!(videos[1].kind, VideoKind::Link);
        assert_eq!(videos[1].title, "Watch on Vimeo");
    }

    #[test]
    fn test_extract_content_objects_is_idempotent() {
        use crate::types::resource::{AnalysisTarget, ClarifiedType};

        let files = PackageFiles::new().with_entry(
            "wiki_content/a.html",
            r#"<html><body><a href="https://example.com">x</a><iframe src="https://youtu.be/a"></iframe></body></html>"#,
        );
        let mut resources = vec![
            Resource::new("p1", ClarifiedType::Page, "webcontent").with_analysis(
                AnalysisTarget::Html {
                    href: "wiki_content/a.html".into(),
                },
            ),
            Resource::new("p2", ClarifiedType::Page, "webcontent").with_analysis(
                AnalysisTarget::Html {
                    href: "wiki_content/missing.html".into(),
                },
            ),
        ];

        let bodies = extract_content_objects(&mut resources, &files, &config());
        let first = resources.clone();
        extract_content_objects(&mut resources, &files, &config());

        assert_eq!(resources, first);
        assert_eq!(resources[0].links.len(), 1);
        assert_eq!(resources[0].videos.len(), 1);
        assert_eq!(resources[1].object_count(), 0);

        // Bodies come from the documents parsed for extraction
        assert_eq!(bodies, AuditBodies::from_package(&resources, &files));
        assert_eq!(bodies.len(), 1);
        assert!(bodies.get("p1").unwrap().contains("youtu.be/a"));
        assert_eq!(bodies.get("p2"), None);
    }
}
