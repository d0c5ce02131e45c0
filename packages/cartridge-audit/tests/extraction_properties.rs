//! Property tests for content object extraction.

use proptest::prelude::*;
use scraper::Html;

use cartridge_audit::{
    pipeline::{extract_content_objects, find_links},
    testing::{MockArchiveReader, PackageBuilder},
    AnalysisConfig, AnalysisTarget, ClarifiedType, CourseAnalyzer, LinkType, PackageFiles,
    Resource,
};

fn config() -> AnalysisConfig {
    AnalysisConfig::default().with_institution_domains(["institution.edu"])
}

fn href() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("#section-2".to_string()),
        Just("mailto:help@institution.edu".to_string()),
        Just(String::new()),
        "[a-z]{1,8}".prop_map(|p| format!("$CANVAS_OBJECT_REFERENCE$/pages/{p}")),
        "[a-z]{1,8}".prop_map(|p| format!("$WIKI_REFERENCE$/pages/{p}")),
        "[a-z]{1,8}".prop_map(|h| format!("https://{h}.institution.edu/")),
        "[a-z]{1,8}".prop_map(|h| format!("https://{h}.example.com/watch")),
        "[a-z]{1,8}".prop_map(|h| format!("https://www.youtube.com/embed/{h}")),
    ]
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        href().prop_map(|h| format!(r#"<p><a href="{h}">link</a></p>"#)),
        href().prop_map(|h| format!(r#"<a class="instructure_file_link" href="{h}.pdf"></a>"#)),
        href().prop_map(|h| format!(r#"<iframe src="{h}"></iframe>"#)),
        Just("<p>Transcript available</p>".to_string()),
        Just("<video><source src=\"/media/a.mp4\"></video>".to_string()),
        Just("<h2>Heading</h2>".to_string()),
    ]
}

proptest! {
    #[test]
    fn links_never_include_fragments_or_mail(hrefs in prop::collection::vec(href(), 0..12)) {
        let body: String = hrefs
            .iter()
            .map(|h| format!(r#"<a href="{h}">x</a>"#))
            .collect();
        let document = Html::parse_document(&format!("<html><body>{body}</body></html>"));

        let links = find_links(&document, "r1", &config());
        let expected = hrefs
            .iter()
            .filter(|h| !h.is_empty() && !h.starts_with('#') && !h.starts_with("mailto"))
            .count();

        prop_assert_eq!(links.len(), expected);
        for link in &links {
            let course = link.url.starts_with("$CANVAS") || link.url.contains("$WIKI_REFERENCE$");
            prop_assert_eq!(link.link_type == LinkType::Course, course);
            prop_assert_eq!(
                link.link_type == LinkType::Institution,
                link.url.contains(".institution.edu/")
            );
        }
    }

    #[test]
    fn extraction_is_idempotent(parts in prop::collection::vec(fragment(), 0..10)) {
        let body: String = parts.concat();
        let files = PackageFiles::new()
            .with_entry("wiki_content/p.html", format!("<html><body>{body}</body></html>"));
        let mut resources = vec![Resource::new("p1", ClarifiedType::Page, "webcontent")
            .with_analysis(AnalysisTarget::Html { href: "wiki_content/p.html".into() })];

        extract_content_objects(&mut resources, &files, &config());
        let first = resources.clone();
        extract_content_objects(&mut resources, &files, &config());

        prop_assert_eq!(resources, first);
    }

    #[test]
    fn analysis_is_deterministic(parts in prop::collection::vec(fragment(), 0..6)) {
        let builder = PackageBuilder::new()
            .page("p1", "wiki_content/p.html", "Page", "active", &parts.concat())
            .module("m1", "Week 1", true)
            .item("i1", "Page", Some("p1"), "WikiPage");

        let analyzer = CourseAnalyzer::new(MockArchiveReader::new(builder.files()))
            .with_config(config());
        let first = tokio_test::block_on(analyzer.analyze(vec![])).unwrap();
        let second = tokio_test::block_on(analyzer.analyze(vec![])).unwrap();

        prop_assert_eq!(first, second);
    }
}
