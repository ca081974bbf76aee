// Shared helpers for integration tests
//
// Generated documents are parsed with roxmltree, which rejects anything that
// is not well-formed XML 1.0 (including characters outside the `Char`
// production). Adjacent CDATA sections come back as one joined text.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }
}

/// Parse a document into its elements (document order, root first).
pub fn parse_elements(doc: &str) -> Result<Vec<Element>, String> {
    let parsed = roxmltree::Document::parse(doc).map_err(|e| e.to_string())?;

    Ok(parsed
        .descendants()
        .filter(|node| node.is_element())
        .map(|node| Element {
            name: node.tag_name().name().to_string(),
            attrs: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            text: node
                .children()
                .filter(|child| child.is_text())
                .filter_map(|child| child.text())
                .collect(),
        })
        .collect())
}

pub fn elements_named<'a>(elements: &'a [Element], name: &str) -> Vec<&'a Element> {
    elements.iter().filter(|e| e.name == name).collect()
}

/// Text of a CDATA block as the writer framed it (`\n{content}\n`)
pub fn block_content(element: &Element) -> &str {
    element
        .text
        .strip_prefix('\n')
        .and_then(|t| t.strip_suffix('\n'))
        .unwrap_or(&element.text)
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
