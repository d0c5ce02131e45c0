//! Analysis fragment resolution.
//!
//! Turns a resource's [`AnalysisTarget`] into a parsed HTML document: raw
//! HTML is parsed directly, XML wrappers are unwrapped and their named
//! element's text re-parsed as HTML.

use std::collections::HashMap;

use scraper::Html;
use tracing::{debug, warn};

use crate::pipeline::markup::{body_has_elements, body_html, first_text, parse_xml};
use crate::types::{
    package::PackageFiles,
    resource::{AnalysisTarget, Resource},
};

/// Resolve a target to an HTML document.
///
/// `None` when the target file is not in the package. A wrapper that is
/// malformed or lacks its element resolves to an empty document.
pub fn resolve_fragment(target: &AnalysisTarget, files: &PackageFiles) -> Option<Html> {
    let Some(text) = files.get(target.href()) else {
        debug!(href = %target.href(), "Analysis target missing from package");
        return None;
    };

    let document = match target.wrapper_element() {
        None => Html::parse_document(text),
        Some(element) => Html::parse_document(&unwrap_xml(text, element, target.href())),
    };

    Some(document)
}

/// Serialized `<body>` markup per resource identifier, ready for the
/// audit engine.
///
/// Extraction records each body from the document it already parsed, so a
/// fragment is parsed once per analysis. Resources whose fragment is
/// missing or has no elements have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditBodies {
    bodies: HashMap<String, String>,
}

impl AuditBodies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and serialize every resource's fragment straight from the
    /// package, for callers auditing without an extraction pass.
    pub fn from_package(resources: &[Resource], files: &PackageFiles) -> Self {
        let mut bodies = Self::new();
        for resource in resources {
            let Some(document) = resource
                .analysis
                .as_ref()
                .and_then(|target| resolve_fragment(target, files))
            else {
                continue;
            };
            bodies.record(&resource.identifier, &document);
        }
        bodies
    }

    /// Record the body of a parsed fragment. Returns whether there was
    /// anything to audit.
    pub fn record(&mut self, identifier: &str, document: &Html) -> bool {
        if !body_has_elements(document) {
            debug!(identifier = %identifier, "Empty body, nothing to audit");
            return false;
        }

        match body_html(document).filter(|body| !body.trim().is_empty()) {
            Some(body) => {
                self.bodies.insert(identifier.to_string(), body);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.bodies.get(identifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Text of the first `element` in an XML wrapper, or empty.
fn unwrap_xml(text: &str, element: &str, href: &str) -> String {
    match parse_xml(text) {
        Ok(document) => first_text(document.root_element(), element).unwrap_or_default(),
        Err(e) => {
            warn!(href = %href, error = %e, "Malformed wrapper document, treating as empty");
            String::new()
        }
    }
}
