//! Inventory Report - analyze a course package from disk
//!
//! Reads a zipped course export, runs the inventory pipeline without an
//! audit engine, and prints per-type counts plus every external link and
//! video that lacks a transcript mention.
//!
//! Configuration comes from the environment (or a `.env` file):
//! - `CARTRIDGE_INSTITUTION_DOMAINS` - e.g. `institution.edu`
//! - `CARTRIDGE_AUDIT_TAGS`
//! - `CARTRIDGE_ASSET_PREFIX`
//!
//! ```bash
//! cargo run --example inventory_report -- course_export.imscc
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartridge_audit::{AnalysisConfig, CourseAnalyzer, LinkType, ZipArchiveReader};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cartridge_audit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: inventory_report <package.imscc>")?;
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {path}"))?;

    let config = AnalysisConfig::from_env().context("Failed to load configuration")?;
    let analyzer = CourseAnalyzer::new(ZipArchiveReader::new()).with_config(config);
    let inventory = analyzer
        .analyze(bytes)
        .await
        .context("Course analysis failed")?;

    let summary = inventory.summary();
    println!("Resources: {} ({} published)", summary.resources, summary.published_resources);
    for (clarified_type, count) in &summary.resources_by_type {
        println!("  {clarified_type}: {count}");
    }
    println!("Modules: {} ({} items)", summary.modules, summary.module_items);
    println!("Links: {}", summary.links());
    for (link_type, count) in &summary.links_by_type {
        println!("  {link_type}: {count}");
    }
    println!("Videos: {}", summary.videos);
    println!("Attachments: {}", summary.attachments);

    println!("\nExternal links:");
    for link in inventory.links().filter(|l| l.link_type == LinkType::External) {
        println!("  [{}] {} ({})", link.parent_resource_identifier, link.url, link.text);
    }

    println!("\nVideos without a transcript mention:");
    for video in inventory.videos().filter(|v| !v.transcript_or_caption_mentioned) {
        println!(
            "  [{}] {} {} - {}",
            video.parent_resource_identifier, video.platform, video.src, video.title
        );
    }

    let phantom = inventory.attachments().filter(|a| a.is_phantom()).count();
    if phantom > 0 {
        println!("\n{phantom} attachment link(s) have no visible text");
    }

    Ok(())
}
