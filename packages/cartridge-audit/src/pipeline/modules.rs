//! Module inventory - read the course outline from module metadata.

use roxmltree::Node;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::pipeline::markup::{child_element, first_text, parse_xml, text_content, title_or};
use crate::types::{
    config::AnalysisConfig,
    module::{ItemType, Module, ModuleItem},
    package::PackageFiles,
    resource::UNTITLED,
};

const ACTIVE: &str = "active";

/// Build the module tree from the module metadata document.
///
/// Missing or malformed metadata aborts the analysis. Missing fields inside
/// a module or item fall back to defaults.
pub fn build_module_inventory(files: &PackageFiles, config: &AnalysisConfig) -> Result<Vec<Module>> {
    let path = config.module_meta_path.as_str();
    let text = files.get(path).ok_or_else(|| AnalysisError::ModuleMetaMissing {
        path: path.to_string(),
    })?;

    let document = parse_xml(text).map_err(|source| AnalysisError::MalformedXml {
        path: path.to_string(),
        source,
    })?;

    let modules: Vec<Module> = document
        .descendants()
        .filter(|n| is_element(n, "module"))
        .map(read_module)
        .collect();

    info!(
        modules = modules.len(),
        items = modules.iter().map(|m| m.items.len()).sum::<usize>(),
        "Module inventory complete"
    );

    Ok(modules)
}

fn read_module(node: Node<'_, '_>) -> Module {
    let title = title_or(child_text(node, "title"), UNTITLED);
    let published = child_text(node, "workflow_state").is_some_and(|s| s.trim() == ACTIVE);

    let items: Vec<ModuleItem> = node
        .descendants()
        .filter(|n| is_element(n, "item"))
        .map(|item| read_item(item, &title))
        .collect();

    debug!(module = %title, items = items.len(), published, "Read module");

    Module {
        identifier: node.attribute("identifier").unwrap_or_default().to_string(),
        title,
        published,
        items,
    }
}

fn read_item(node: Node<'_, '_>, module_title: &str) -> ModuleItem {
    ModuleItem {
        identifier: node.attribute("identifier").unwrap_or_default().to_string(),
        title: title_or(first_text(node, "title"), UNTITLED),
        identifier_ref: first_text(node, "identifierref")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
        module_title: module_title.to_string(),
        published: first_text(node, "workflow_state").is_some_and(|s| s.trim() == ACTIVE),
        indent: parse_indent(first_text(node, "indent").as_deref()),
        clarified_type: ItemType::Pending,
        content_type: first_text(node, "content_type")
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Non-negative nesting depth; anything unparseable is depth 0.
fn parse_indent(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Text of a direct child, so a module's own fields are not shadowed by
/// the fields of its items.
fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag).map(text_content)
}

fn is_element(node: &Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}
