//! Module types - the course outline read from module metadata.

use serde::{Deserialize, Serialize};

use crate::types::resource::ClarifiedType;

/// Tag shown for module items that have not been reconciled yet.
pub const PENDING_TYPE: &str = "tbd";

/// Clarified type of a module item.
///
/// Items start out `Pending`; reconciliation upgrades those whose
/// reference resolves to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Pending,
    Classified(ClarifiedType),
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Pending => PENDING_TYPE,
            ItemType::Classified(t) => t.as_str(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ItemType::Pending)
    }
}

/// A structural module of the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub identifier: String,
    pub title: String,
    pub published: bool,
    pub items: Vec<ModuleItem>,
}

impl Module {
    /// Number of items with a resolved clarified type.
    pub fn classified_item_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !item.clarified_type.is_pending())
            .count()
    }
}

/// One entry in a module: a resource reference, header, or external link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleItem {
    pub identifier: String,
    pub title: String,

    /// Points at a `Resource::identifier`; headers have none
    pub identifier_ref: Option<String>,

    /// Title of the owning module
    pub module_title: String,

    pub published: bool,

    /// Nesting depth within the module
    pub indent: u32,

    pub clarified_type: ItemType,

    /// Raw `content_type` from module metadata
    pub content_type: String,
}

impl ModuleItem {
    /// Type shown to reviewers: the clarified type once reconciled,
    /// the raw content type until then.
    pub fn display_type(&self) -> &str {
        match &self.clarified_type {
            ItemType::Classified(t) => t.label(),
            ItemType::Pending => &self.content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content_type: &str) -> ModuleItem {
        ModuleItem {
            identifier: "i1".into(),
            title: "Item".into(),
            identifier_ref: None,
            module_title: "Week 1".into(),
            published: true,
            indent: 0,
            clarified_type: ItemType::Pending,
            content_type: content_type.into(),
        }
    }

    #[test]
    fn test_display_type_falls_back_to_content_type() {
        let mut header = item("ContextModuleSubHeader");
        assert_eq!(header.clarified_type.as_str(), "tbd");
        assert_eq!(header.display_type(), "ContextModuleSubHeader");

        header.clarified_type = ItemType::Classified(ClarifiedType::ModuleLink);
        assert_eq!(header.display_type(), "link");
    }

    #[test]
    fn test_classified_item_count() {
        let mut resolved = item("WikiPage");
        resolved.clarified_type = ItemType::Classified(ClarifiedType::Page);
        let module = Module {
            identifier: "m1".into(),
            title: "Week 1".into(),
            published: true,
            items: vec![resolved, item("ContextModuleSubHeader")],
        };
        assert_eq!(module.classified_item_count(), 1);
    }
}
