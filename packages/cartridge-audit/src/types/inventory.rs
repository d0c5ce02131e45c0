//! The analyzed course: resources, modules, and flattened views over them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    finding::AccessibilityFinding,
    module::{Module, ModuleItem},
    objects::{FileObject, LinkObject, VideoObject},
    resource::Resource,
};

/// Enriched inventory handed to review tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseInventory {
    pub resources: Vec<Resource>,
    pub modules: Vec<Module>,
}

impl CourseInventory {
    pub fn new(resources: Vec<Resource>, modules: Vec<Module>) -> Self {
        Self { resources, modules }
    }

    /// Find a resource by identifier.
    pub fn resource(&self, identifier: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.identifier == identifier)
    }

    /// All module items, in outline order.
    pub fn items(&self) -> impl Iterator<Item = &ModuleItem> {
        self.modules.iter().flat_map(|m| m.items.iter())
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkObject> {
        self.resources.iter().flat_map(|r| r.links.iter())
    }

    pub fn videos(&self) -> impl Iterator<Item = &VideoObject> {
        self.resources.iter().flat_map(|r| r.videos.iter())
    }

    pub fn attachments(&self) -> impl Iterator<Item = &FileObject> {
        self.resources.iter().flat_map(|r| r.attachments.iter())
    }

    pub fn findings(&self) -> impl Iterator<Item = &AccessibilityFinding> {
        self.resources
            .iter()
            .filter_map(|r| r.accessibility_results.as_ref())
            .flat_map(|f| f.iter())
    }

    /// Aggregate counts for overview displays.
    pub fn summary(&self) -> InventorySummary {
        let mut summary = InventorySummary {
            resources: self.resources.len(),
            modules: self.modules.len(),
            module_items: self.items().count(),
            videos: self.videos().count(),
            attachments: self.attachments().count(),
            ..Default::default()
        };

        for resource in &self.resources {
            *summary
                .resources_by_type
                .entry(resource.clarified_type.as_str().to_string())
                .or_default() += 1;
            if resource.published {
                summary.published_resources += 1;
            }
        }
        for link in self.links() {
            *summary
                .links_by_type
                .entry(link.link_type.as_str().to_string())
                .or_default() += 1;
        }
        for finding in self.findings() {
            *summary
                .findings_by_category
                .entry(finding.category.as_str().to_string())
                .or_default() += 1;
        }

        summary
    }
}

/// Counts over a [`CourseInventory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub resources: usize,
    pub published_resources: usize,
    pub modules: usize,
    pub module_items: usize,
    pub videos: usize,
    pub attachments: usize,
    pub resources_by_type: BTreeMap<String, usize>,
    pub links_by_type: BTreeMap<String, usize>,
    pub findings_by_category: BTreeMap<String, usize>,
}

impl InventorySummary {
    pub fn links(&self) -> usize {
        self.links_by_type.values().sum()
    }

    pub fn findings(&self) -> usize {
        self.findings_by_category.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::objects::LinkType;
    use crate::types::resource::ClarifiedType;

    fn link(url: &str, link_type: LinkType, parent: &str) -> LinkObject {
        LinkObject {
            url: url.into(),
            text: String::new(),
            link_type,
            parent_resource_identifier: parent.into(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut page = Resource::new("p1", ClarifiedType::Page, "webcontent").with_published(true);
        page.links = vec![
            link("https://example.com", LinkType::External, "p1"),
            link("$WIKI_REFERENCE$/pages/x", LinkType::Course, "p1"),
        ];
        let mut quiz = Resource::new("q1", ClarifiedType::Quiz, "imsqti");
        quiz.links = vec![link("https://example.org", LinkType::External, "q1")];

        let inventory = CourseInventory::new(vec![page, quiz], vec![]);
        let summary = inventory.summary();

        assert_eq!(summary.resources, 2);
        assert_eq!(summary.published_resources, 1);
        assert_eq!(summary.resources_by_type["page"], 1);
        assert_eq!(summary.links_by_type["external"], 2);
        assert_eq!(summary.links(), 3);
        assert_eq!(summary.findings(), 0);
        assert!(inventory.resource("q1").is_some());
        assert!(inventory.resource("missing").is_none());
    }
}
